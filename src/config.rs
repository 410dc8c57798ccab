//! Scenario files: everything a run needs, loaded once before liftoff.

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::control::environment::{Atmosphere, Environment};
use crate::control::mission::CelestialBody;
use crate::control::pitch_program::PitchProgram;
use crate::control::structure::Structure;
use crate::errors::SimulationError;
use crate::trajectory_system::aerodynamics::Aerodynamics;
use crate::trajectory_system::integrator::IntegrationSettings;
use crate::trajectory_system::scripted::{ScriptedManeuver, ScriptedSegment};
use crate::trajectory_system::termination::TerminationCriteria;

/// Full description of one ascent scenario.
///
/// Only `vehicle` is required in a scenario file; every other table falls
/// back to the Kerbin reference values. `maneuver` segments, when present,
/// are played kinematically after the ascent ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "CelestialBody::kerbin")]
    pub body: CelestialBody,
    #[serde(default)]
    pub atmosphere: Atmosphere,
    #[serde(default)]
    pub aerodynamics: Aerodynamics,
    pub vehicle: Structure,
    #[serde(default)]
    pub pitch: PitchProgram,
    #[serde(default)]
    pub integration: IntegrationSettings,
    #[serde(default)]
    pub termination: TerminationCriteria,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maneuver: Vec<ScriptedSegment>,
}

fn default_name() -> String {
    "Unnamed ascent".to_string()
}

impl SimulationConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, SimulationError> {
        let config: SimulationConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SimulationError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = SimulationConfig::from_toml_str(&contents)?;
        debug!(
            "loaded scenario `{}` from {} ({} stages)",
            config.name,
            path.display(),
            config.vehicle.stage_count()
        );
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, SimulationError> {
        toml::to_string_pretty(self)
            .map_err(|e| SimulationError::ConfigurationError(e.to_string()))
    }

    /// Fails on anything that would make the first step meaningless.
    pub fn validate(&self) -> Result<(), SimulationError> {
        self.vehicle.validate()?;
        self.integration.validate()?;
        self.termination.validate()?;
        self.scripted_maneuver()?;

        if !(self.body.radius.is_finite() && self.body.radius > 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "body radius must be positive, got {}",
                self.body.radius
            )));
        }
        if !(self.body.surface_gravity.is_finite() && self.body.surface_gravity >= 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "surface gravity must be non-negative, got {}",
                self.body.surface_gravity
            )));
        }
        if !(self.atmosphere.scale_height.is_finite() && self.atmosphere.scale_height > 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "scale height must be positive, got {}",
                self.atmosphere.scale_height
            )));
        }
        if self.atmosphere.sea_level_density < 0.0 || self.atmosphere.sea_level_density.is_nan() {
            return Err(SimulationError::ConfigurationError(format!(
                "sea level density must be non-negative, got {}",
                self.atmosphere.sea_level_density
            )));
        }
        if self.aerodynamics.drag_coefficient < 0.0 || self.aerodynamics.reference_area < 0.0 {
            return Err(SimulationError::ConfigurationError(
                "drag coefficient and reference area must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// The post-ascent maneuver, if the scenario scripts one.
    pub fn scripted_maneuver(&self) -> Result<Option<ScriptedManeuver>, SimulationError> {
        if self.maneuver.is_empty() {
            return Ok(None);
        }
        ScriptedManeuver::new(self.maneuver.clone(), self.integration.time_step).map(Some)
    }

    pub fn environment(&self) -> Environment {
        Environment::new(self.body.clone(), self.atmosphere)
    }
}
