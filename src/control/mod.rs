pub mod environment;
pub mod launch_stages;
pub mod mission;
pub mod payload;
pub mod pitch_program;
pub mod rocket;
pub mod staging;
pub mod structure;
