use serde::Serialize;

use crate::utils::vector2d::Vector2D;

/// Snapshot taken at the end of one integration step.
///
/// `elapsed_time` is the mission time at which the step started; the
/// kinematic fields hold the values after the step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub elapsed_time: f64,
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub acceleration: Vector2D,
    pub total_mass: f64,
    pub remaining_propellant: f64,
    pub active_stage_index: usize,
    pub engine_on: bool,
    pub pitch_angle: f64, // degrees
    pub thrust: f64,
    pub drag_force: f64,
    pub gravity: f64,
    pub density: f64,
}

impl Sample {
    pub fn altitude(&self) -> f64 {
        self.position.y
    }

    pub fn downrange(&self) -> f64 {
        self.position.x
    }

    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }

    pub fn acceleration_magnitude(&self) -> f64 {
        self.acceleration.magnitude()
    }

    pub fn dynamic_pressure(&self) -> f64 {
        0.5 * self.density * self.speed().powi(2)
    }
}

/// One CSV row; the writer needs a flat record.
#[derive(Debug, Serialize)]
pub(crate) struct SampleRecord {
    pub time: f64,
    pub x: f64,
    pub altitude: f64,
    pub vx: f64,
    pub vy: f64,
    pub speed: f64,
    pub ax: f64,
    pub ay: f64,
    pub acceleration: f64,
    pub mass: f64,
    pub propellant: f64,
    pub stage: usize,
    pub engine_on: bool,
    pub pitch: f64,
    pub thrust: f64,
    pub drag: f64,
    pub gravity: f64,
    pub density: f64,
}

impl From<&Sample> for SampleRecord {
    fn from(sample: &Sample) -> Self {
        SampleRecord {
            time: sample.elapsed_time,
            x: sample.position.x,
            altitude: sample.position.y,
            vx: sample.velocity.x,
            vy: sample.velocity.y,
            speed: sample.speed(),
            ax: sample.acceleration.x,
            ay: sample.acceleration.y,
            acceleration: sample.acceleration_magnitude(),
            mass: sample.total_mass,
            propellant: sample.remaining_propellant,
            stage: sample.active_stage_index,
            engine_on: sample.engine_on,
            pitch: sample.pitch_angle,
            thrust: sample.thrust,
            drag: sample.drag_force,
            gravity: sample.gravity,
            density: sample.density,
        }
    }
}
