pub mod reference;
pub mod sample;
pub mod telemetry;
