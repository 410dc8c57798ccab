use serde::{Deserialize, Serialize};

use super::aerodynamics::Aerodynamics;
use crate::constants::{DRAG_SPEED_EPSILON, MASS_FLOOR, TIME_STEP};
use crate::control::environment::Environment;
use crate::control::pitch_program::PitchProgram;
use crate::control::rocket::VehicleState;
use crate::control::staging::{StagingEvent, StagingPolicy};
use crate::control::structure::Structure;
use crate::errors::SimulationError;
use crate::telemetry_system::sample::Sample;
use crate::utils::vector2d::Vector2D;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrationSettings {
    #[serde(default = "default_time_step")]
    pub time_step: f64, // s
    #[serde(default = "default_mass_floor")]
    pub mass_floor: f64, // kg
    #[serde(default = "default_drag_speed_epsilon")]
    pub drag_speed_epsilon: f64, // m/s
}

fn default_time_step() -> f64 {
    TIME_STEP
}

fn default_mass_floor() -> f64 {
    MASS_FLOOR
}

fn default_drag_speed_epsilon() -> f64 {
    DRAG_SPEED_EPSILON
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        IntegrationSettings {
            time_step: TIME_STEP,
            mass_floor: MASS_FLOOR,
            drag_speed_epsilon: DRAG_SPEED_EPSILON,
        }
    }
}

impl IntegrationSettings {
    pub fn with_time_step(time_step: f64) -> Self {
        IntegrationSettings {
            time_step,
            ..IntegrationSettings::default()
        }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "time step must be positive, got {}",
                self.time_step
            )));
        }
        if !(self.mass_floor.is_finite() && self.mass_floor >= 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "mass floor must be non-negative, got {}",
                self.mass_floor
            )));
        }
        if !(self.drag_speed_epsilon.is_finite() && self.drag_speed_epsilon >= 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "drag speed epsilon must be non-negative, got {}",
                self.drag_speed_epsilon
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    pub sample: Sample,
    pub event: Option<StagingEvent>,
}

/// Fixed-step ascent physics: thrust along the commanded pitch, drag against
/// the velocity, gravity straight down, advanced with semi-implicit Euler.
#[derive(Debug, Clone)]
pub struct AscentIntegrator {
    structure: Structure,
    pitch_program: PitchProgram,
    environment: Environment,
    aerodynamics: Aerodynamics,
    settings: IntegrationSettings,
}

impl AscentIntegrator {
    pub fn new(
        structure: Structure,
        pitch_program: PitchProgram,
        environment: Environment,
        aerodynamics: Aerodynamics,
        settings: IntegrationSettings,
    ) -> Self {
        AscentIntegrator {
            structure,
            pitch_program,
            environment,
            aerodynamics,
            settings,
        }
    }

    /// Advances `state` by one step and returns the snapshot of that step.
    pub fn step(&self, state: &mut VehicleState, staging: &mut StagingPolicy) -> StepResult {
        let dt = self.settings.time_step;
        let pitch = self.pitch_program.pitch_at(state.elapsed_time);

        let decision = staging.evaluate(state, &self.structure);
        let thrust = match self.structure.stage(state.active_stage_index) {
            Some(stage) if decision.engine_on => {
                StagingPolicy::consume(state, &self.structure, dt);
                stage.thrust
            }
            _ => 0.0,
        };

        let altitude = state.position.y.max(0.0);
        let density = self.environment.density(altitude);
        let drag = self.aerodynamics.drag_magnitude(density, state.speed());
        let gravity = self.environment.gravity(altitude);

        let thrust_vector = if decision.engine_on {
            Vector2D::from_polar(thrust, pitch.to_radians())
        } else {
            Vector2D::ZERO
        };
        let drag_vector =
            self.aerodynamics
                .drag_vector(state.velocity, drag, self.settings.drag_speed_epsilon);
        // Flat-ground simplification: gravity only pulls along -y.
        let weight = Vector2D::new(0.0, -state.total_mass * gravity);
        let net_force = thrust_vector + drag_vector + weight;

        let acceleration = if state.total_mass > self.settings.mass_floor {
            net_force / state.total_mass
        } else {
            Vector2D::ZERO
        };

        let mut velocity = state.velocity + acceleration * dt;
        if state.position.y + velocity.y * dt < 0.0 && velocity.y < 0.0 {
            velocity = velocity.with_y(0.0);
        }
        // Position advances with the updated velocity.
        let position = state.position + velocity * dt;

        state.velocity = velocity;
        state.position = position;

        let sample = Sample {
            elapsed_time: state.elapsed_time,
            position,
            velocity,
            acceleration,
            total_mass: state.total_mass.max(self.settings.mass_floor),
            remaining_propellant: state.remaining_propellant.max(0.0),
            active_stage_index: state.active_stage_index,
            engine_on: decision.engine_on,
            pitch_angle: pitch,
            thrust,
            drag_force: drag,
            gravity,
            density,
        };

        state.advance_clock(dt);

        StepResult {
            sample,
            event: decision.event,
        }
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn pitch_program(&self) -> &PitchProgram {
        &self.pitch_program
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn aerodynamics(&self) -> &Aerodynamics {
        &self.aerodynamics
    }

    pub fn settings(&self) -> &IntegrationSettings {
        &self.settings
    }

    pub fn time_step(&self) -> f64 {
        self.settings.time_step
    }
}
