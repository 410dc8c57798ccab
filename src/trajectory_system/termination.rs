use serde::{Deserialize, Serialize};

use crate::constants::{
    MAX_SIMULATION_TIME, ORBITAL_SPEED_MARGIN, ORBIT_ALTITUDE_THRESHOLD, ORBIT_SPEED_THRESHOLD,
};
use crate::control::environment::Environment;
use crate::errors::SimulationError;
use crate::telemetry_system::sample::Sample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlightOutcome {
    OrbitAchieved,
    Timeout,
}

/// When a flight ends: orbital insertion inside the eligible band, or the
/// simulated-time cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerminationCriteria {
    #[serde(default = "default_orbit_altitude")]
    pub orbit_altitude: f64, // m
    #[serde(default = "default_orbit_min_speed")]
    pub orbit_min_speed: f64, // m/s
    #[serde(default = "default_orbital_speed_margin")]
    pub orbital_speed_margin: f64,
    #[serde(default = "default_timeout")]
    pub timeout: f64, // s
}

fn default_orbit_altitude() -> f64 {
    ORBIT_ALTITUDE_THRESHOLD
}

fn default_orbit_min_speed() -> f64 {
    ORBIT_SPEED_THRESHOLD
}

fn default_orbital_speed_margin() -> f64 {
    ORBITAL_SPEED_MARGIN
}

fn default_timeout() -> f64 {
    MAX_SIMULATION_TIME
}

impl Default for TerminationCriteria {
    fn default() -> Self {
        TerminationCriteria {
            orbit_altitude: ORBIT_ALTITUDE_THRESHOLD,
            orbit_min_speed: ORBIT_SPEED_THRESHOLD,
            orbital_speed_margin: ORBITAL_SPEED_MARGIN,
            timeout: MAX_SIMULATION_TIME,
        }
    }
}

impl TerminationCriteria {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.timeout.is_finite() && self.timeout > 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "timeout must be positive, got {}",
                self.timeout
            )));
        }
        if !(self.orbital_speed_margin.is_finite() && self.orbital_speed_margin > 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "orbital speed margin must be positive, got {}",
                self.orbital_speed_margin
            )));
        }
        if self.orbit_altitude.is_nan() || self.orbit_min_speed.is_nan() {
            return Err(SimulationError::ConfigurationError(
                "orbit thresholds must be numbers".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_orbit_eligible(&self, sample: &Sample) -> bool {
        sample.altitude() > self.orbit_altitude && sample.speed() > self.orbit_min_speed
    }

    /// Inside the band, fast enough for a circular orbit and not falling.
    pub fn orbit_achieved(&self, sample: &Sample, environment: &Environment) -> bool {
        if !self.is_orbit_eligible(sample) {
            return false;
        }
        let orbital_speed = environment.orbital_speed(sample.altitude());
        sample.speed() >= self.orbital_speed_margin * orbital_speed && sample.velocity.y >= 0.0
    }

    pub fn is_timed_out(&self, elapsed_time: f64) -> bool {
        elapsed_time > self.timeout
    }

    /// Checks the latest sample; `next_elapsed_time` is the clock after the
    /// step that produced it.
    pub fn evaluate(
        &self,
        sample: &Sample,
        next_elapsed_time: f64,
        environment: &Environment,
    ) -> Option<FlightOutcome> {
        if self.orbit_achieved(sample, environment) {
            Some(FlightOutcome::OrbitAchieved)
        } else if self.is_timed_out(next_elapsed_time) {
            Some(FlightOutcome::Timeout)
        } else {
            None
        }
    }
}
