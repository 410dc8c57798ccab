use log::{info, warn};
use serde::Serialize;

use crate::{
    config::SimulationConfig,
    constants::TELEMETRY_PREALLOCATION,
    control::{
        environment::Environment,
        staging::{StagingEvent, StagingPolicy},
        structure::Structure,
    },
    errors::SimulationError,
    telemetry_system::telemetry::Telemetry,
    trajectory_system::{
        integrator::AscentIntegrator,
        scripted::ScriptedManeuver,
        termination::{FlightOutcome, TerminationCriteria},
    },
    utils::vector2d::Vector2D,
};

/// The one live vehicle state of a run.
///
/// Clock fields are derived from step counters so they advance by exactly
/// one fixed step per iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    pub elapsed_time: f64,
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub total_mass: f64,
    pub remaining_propellant: f64,
    pub active_stage_index: usize,
    pub stage_elapsed_time: f64,
    pub engine_on: bool,
    steps: u64,
    stage_steps: u64,
}

impl VehicleState {
    /// Fully fuelled stack sitting on the pad.
    pub fn at_liftoff(structure: &Structure) -> Self {
        VehicleState {
            elapsed_time: 0.0,
            position: Vector2D::ZERO,
            velocity: Vector2D::ZERO,
            total_mass: structure.liftoff_mass(),
            remaining_propellant: structure
                .stage(0)
                .map_or(0.0, |stage| stage.propellant_mass),
            active_stage_index: 0,
            stage_elapsed_time: 0.0,
            engine_on: false,
            steps: 0,
            stage_steps: 0,
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }

    pub fn altitude(&self) -> f64 {
        self.position.y
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Drops every stage below `next_stage` and loads its propellant. Whatever
    /// the spent stage still carried goes with it.
    pub fn separate_to(&mut self, next_stage: usize, structure: &Structure) {
        self.active_stage_index = next_stage;
        self.stage_steps = 0;
        self.stage_elapsed_time = 0.0;
        self.total_mass = structure.mass_from_stage(next_stage);
        self.remaining_propellant = structure
            .stage(next_stage)
            .map_or(0.0, |stage| stage.propellant_mass);
        self.engine_on = false;
    }

    pub fn advance_clock(&mut self, time_step: f64) {
        self.steps += 1;
        self.stage_steps += 1;
        self.elapsed_time = self.steps as f64 * time_step;
        self.stage_elapsed_time = self.stage_steps as f64 * time_step;
    }
}

/// Something worth reporting that happened during the flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FlightEvent {
    Separation {
        time: f64,
        spent_stage: usize,
        next_stage: usize,
    },
    FinalBurnout {
        time: f64,
        stage: usize,
    },
    OrbitAchieved {
        time: f64,
        altitude: f64,
        speed: f64,
    },
    Timeout {
        time: f64,
    },
}

impl FlightEvent {
    pub fn time(&self) -> f64 {
        match *self {
            FlightEvent::Separation { time, .. }
            | FlightEvent::FinalBurnout { time, .. }
            | FlightEvent::OrbitAchieved { time, .. }
            | FlightEvent::Timeout { time } => time,
        }
    }

    fn log(&self, structure: &Structure) {
        let stage_name = |index: usize| {
            structure
                .stage(index)
                .map_or("<unknown>", |stage| stage.name.as_str())
        };

        match *self {
            FlightEvent::Separation {
                time,
                spent_stage,
                next_stage,
            } => info!(
                "T+{:.1}s: `{}` separated, `{}` active",
                time,
                stage_name(spent_stage),
                stage_name(next_stage)
            ),
            FlightEvent::FinalBurnout { time, stage } => {
                info!("T+{:.1}s: `{}` burnout, coasting", time, stage_name(stage))
            }
            FlightEvent::OrbitAchieved {
                time,
                altitude,
                speed,
            } => info!(
                "T+{:.1}s: orbit achieved at {:.1} km, {:.1} m/s",
                time,
                altitude / 1000.0,
                speed
            ),
            FlightEvent::Timeout { time } => {
                info!("T+{:.1}s: mission timeout without orbit", time)
            }
        }
    }
}

/// Everything a finished run hands to the presentation layer.
#[derive(Debug, Clone)]
pub struct FlightReport {
    pub outcome: FlightOutcome,
    pub telemetry: Telemetry,
    pub events: Vec<FlightEvent>,
    pub final_state: VehicleState,
    /// Kinematic playback started from `final_state`, when scripted.
    pub maneuver: Option<Telemetry>,
}

impl FlightReport {
    pub fn separation_times(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter(|event| matches!(event, FlightEvent::Separation { .. }))
            .map(FlightEvent::time)
            .collect()
    }
}

/// Loop driver: owns the live state, the staging policy and the sample
/// sequence of one run.
pub struct Rocket {
    integrator: AscentIntegrator,
    staging: StagingPolicy,
    termination: TerminationCriteria,
    state: VehicleState,
    telemetry: Telemetry,
    events: Vec<FlightEvent>,
    outcome: Option<FlightOutcome>,
    maneuver: Option<ScriptedManeuver>,
}

impl Rocket {
    /// Validates `config` and puts the vehicle on the pad. Nothing is
    /// integrated yet.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let maneuver = config.scripted_maneuver()?;

        let liftoff_weight = config.vehicle.liftoff_mass() * config.body.surface_gravity;
        let first_thrust = config.vehicle.stages[0].thrust;
        if first_thrust <= liftoff_weight {
            warn!(
                "`{}`: liftoff thrust-to-weight {:.2} is not above 1, the vehicle will not leave the pad",
                config.name,
                first_thrust / liftoff_weight
            );
        }

        let SimulationConfig {
            body,
            atmosphere,
            aerodynamics,
            vehicle,
            pitch,
            integration,
            termination,
            ..
        } = config;

        let staging = StagingPolicy::new(&vehicle);
        let state = VehicleState::at_liftoff(&vehicle);
        // Float-to-int casts saturate; bound the step count before adding one.
        let expected_steps = (termination.timeout / integration.time_step)
            .ceil()
            .min(TELEMETRY_PREALLOCATION as f64) as usize;

        Ok(Rocket {
            integrator: AscentIntegrator::new(
                vehicle,
                pitch,
                Environment::new(body, atmosphere),
                aerodynamics,
                integration,
            ),
            staging,
            termination,
            state,
            telemetry: Telemetry::with_capacity(expected_steps.saturating_add(1)),
            events: Vec::new(),
            outcome: None,
            maneuver,
        })
    }

    /// One integration step. Returns the outcome once the flight has ended.
    pub fn step(&mut self) -> Option<FlightOutcome> {
        let result = self.integrator.step(&mut self.state, &mut self.staging);
        let sample = result.sample;

        match result.event {
            Some(StagingEvent::Separation {
                spent_stage,
                next_stage,
            }) => self.events.push(FlightEvent::Separation {
                time: sample.elapsed_time,
                spent_stage,
                next_stage,
            }),
            Some(StagingEvent::FinalBurnout { stage }) => {
                self.events.push(FlightEvent::FinalBurnout {
                    time: sample.elapsed_time,
                    stage,
                })
            }
            None => {}
        }
        self.telemetry.record(sample);

        if self.outcome.is_none() {
            self.outcome = self.termination.evaluate(
                &sample,
                self.state.elapsed_time,
                self.integrator.environment(),
            );
            match self.outcome {
                Some(FlightOutcome::OrbitAchieved) => self.events.push(FlightEvent::OrbitAchieved {
                    time: sample.elapsed_time,
                    altitude: sample.altitude(),
                    speed: sample.speed(),
                }),
                Some(FlightOutcome::Timeout) => self.events.push(FlightEvent::Timeout {
                    time: sample.elapsed_time,
                }),
                None => {}
            }
        }

        self.outcome
    }

    /// Runs to orbit or timeout. Event logging happens after the loop.
    pub fn fly(mut self) -> FlightReport {
        let outcome = loop {
            if let Some(outcome) = self.step() {
                break outcome;
            }
        };

        for event in &self.events {
            event.log(self.integrator.structure());
        }

        let maneuver = self.maneuver.as_ref().map(|m| {
            let playback = m.fly(&self.state);
            info!(
                "scripted maneuver: {} segments over {:.1}s",
                m.segments().len(),
                m.duration()
            );
            playback
        });

        FlightReport {
            outcome,
            telemetry: self.telemetry,
            events: self.events,
            final_state: self.state,
            maneuver,
        }
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn events(&self) -> &[FlightEvent] {
        &self.events
    }

    pub fn outcome(&self) -> Option<FlightOutcome> {
        self.outcome
    }

    pub fn integrator(&self) -> &AscentIntegrator {
        &self.integrator
    }

    pub fn termination(&self) -> &TerminationCriteria {
        &self.termination
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::launch_stages::Stage;
    use crate::control::mission::MissionFactory;
    use crate::control::payload::Payload;

    #[test]
    fn test_liftoff_state() {
        let structure = Structure::new(
            vec![
                Stage::new("Lower", 500.0, 1_000.0, 10.0, 50_000.0, 280.0),
                Stage::new("Upper", 200.0, 300.0, 20.0, 10_000.0, 340.0),
            ],
            Payload::new("Sat", 100.0),
        );
        let state = VehicleState::at_liftoff(&structure);

        assert_eq!(state.total_mass, 2_100.0);
        assert_eq!(state.remaining_propellant, 1_000.0);
        assert_eq!(state.active_stage_index, 0);
        assert_eq!(state.elapsed_time, 0.0);
        assert!(!state.engine_on);
    }

    #[test]
    fn test_advance_clock_resets_with_stage() {
        let structure = MissionFactory::kerbin_orbit().vehicle;
        let mut state = VehicleState::at_liftoff(&structure);

        for _ in 0..25 {
            state.advance_clock(0.1);
        }
        state.separate_to(1, &structure);
        state.advance_clock(0.1);

        assert_eq!(state.steps(), 26);
        assert_eq!(state.elapsed_time, 26.0 * 0.1);
        assert_eq!(state.stage_elapsed_time, 0.1);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = MissionFactory::kerbin_orbit();
        config.vehicle.stages.clear();
        assert!(matches!(
            Rocket::new(config),
            Err(SimulationError::EmptyStageList)
        ));
    }

    #[test]
    fn test_extreme_timing_keeps_preallocation_bounded() {
        let mut long_timeout = MissionFactory::kerbin_orbit();
        long_timeout.termination.timeout = 1.0e30;
        assert!(long_timeout.validate().is_ok());

        let mut tiny_step = MissionFactory::kerbin_orbit();
        tiny_step.integration.time_step = 1.0e-300;
        assert!(tiny_step.validate().is_ok());

        for config in [long_timeout, tiny_step] {
            let mut rocket = Rocket::new(config).unwrap();
            assert!(rocket.step().is_none());
            assert_eq!(rocket.telemetry().len(), 1);
        }
    }

    #[test]
    fn test_step_records_sample() {
        let mut rocket = Rocket::new(MissionFactory::kerbin_orbit()).unwrap();
        assert!(rocket.step().is_none());
        assert_eq!(rocket.telemetry().len(), 1);
        assert!(rocket.state().position.y > 0.0);
    }
}
