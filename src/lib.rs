pub mod config;
pub mod constants;
pub mod control;
pub mod errors;
pub mod telemetry_system;
pub mod trajectory_system;
pub mod utils;

pub use config::SimulationConfig;
pub use constants::*;
pub use control::environment::{Atmosphere, Environment};
pub use control::launch_stages::Stage;
pub use control::mission::{CelestialBody, MissionFactory};
pub use control::payload::Payload;
pub use control::pitch_program::{PitchProgram, PitchScheduleEntry};
pub use control::rocket::{FlightEvent, FlightReport, Rocket, VehicleState};
pub use control::staging::{StagingEvent, StagingPolicy};
pub use control::structure::Structure;
pub use errors::SimulationError;

// Re-export commonly used items from trajectory_system
pub use trajectory_system::aerodynamics::Aerodynamics;
pub use trajectory_system::integrator::{AscentIntegrator, IntegrationSettings};
pub use trajectory_system::scripted::{ScriptedManeuver, ScriptedSegment};
pub use trajectory_system::termination::{FlightOutcome, TerminationCriteria};

// Re-export commonly used items from telemetry_system
pub use telemetry_system::reference::{Channel, ReferenceTrace, TraceComparison};
pub use telemetry_system::sample::Sample;
pub use telemetry_system::telemetry::{FlightSummary, Telemetry, TimeSeries};

// Re-export commonly used utilities
pub use utils::vector2d::Vector2D;

/// Validates `config` and flies it to orbit or timeout.
pub fn simulate(config: SimulationConfig) -> Result<FlightReport, SimulationError> {
    Ok(Rocket::new(config)?.fly())
}
