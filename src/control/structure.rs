use serde::{Deserialize, Serialize};

use super::{launch_stages::Stage, payload::Payload};
use crate::errors::SimulationError;

/// The vehicle stack: stages in firing order plus the payload on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub payload: Payload,
}

impl Structure {
    pub fn new(stages: Vec<Stage>, payload: Payload) -> Self {
        Structure { stages, payload }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.stages.is_empty() {
            return Err(SimulationError::EmptyStageList);
        }
        for stage in &self.stages {
            stage.validate()?;
        }
        if !(self.payload.mass.is_finite() && self.payload.mass >= 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "payload mass must be non-negative, got {}",
                self.payload.mass
            )));
        }
        Ok(())
    }

    pub fn stage(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn is_last_stage(&self, index: usize) -> bool {
        index + 1 >= self.stages.len()
    }

    /// Fully fuelled mass of stage `index` and everything above it.
    pub fn mass_from_stage(&self, index: usize) -> f64 {
        let stages_mass: f64 = self
            .stages
            .iter()
            .skip(index)
            .map(Stage::total_mass)
            .sum();
        stages_mass + self.payload.get_mass()
    }

    pub fn liftoff_mass(&self) -> f64 {
        self.mass_from_stage(0)
    }

    /// Dry mass still attached while stage `index` is active.
    pub fn retained_dry_mass(&self, index: usize) -> f64 {
        let dry: f64 = self
            .stages
            .iter()
            .skip(index)
            .map(|stage| stage.dry_mass)
            .sum();
        dry + self.payload.get_mass()
    }

    pub fn get_total_fuel(&self) -> f64 {
        self.stages.iter().map(|stage| stage.propellant_mass).sum()
    }

    /// Ideal delta-v of each stage, firing order.
    pub fn stage_delta_v(&self, surface_gravity: f64) -> Vec<f64> {
        (0..self.stages.len())
            .map(|index| {
                let upper_mass = self.mass_from_stage(index + 1);
                self.stages[index].delta_v(upper_mass, surface_gravity)
            })
            .collect()
    }

    pub fn total_delta_v(&self, surface_gravity: f64) -> f64 {
        self.stage_delta_v(surface_gravity).iter().sum()
    }
}
