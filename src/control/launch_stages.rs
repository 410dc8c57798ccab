use serde::{Deserialize, Serialize};

use crate::errors::SimulationError;

/// Static description of one stage. Never mutated during a flight; the live
/// propellant count lives in `VehicleState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub dry_mass: f64,         // kg
    pub propellant_mass: f64,  // kg
    pub burn_time: f64,        // s
    pub thrust: f64,           // N
    pub specific_impulse: f64, // s
}

impl Stage {
    pub fn new(
        name: impl Into<String>,
        dry_mass: f64,
        propellant_mass: f64,
        burn_time: f64,
        thrust: f64,
        specific_impulse: f64,
    ) -> Self {
        Stage {
            name: name.into(),
            dry_mass,
            propellant_mass,
            burn_time,
            thrust,
            specific_impulse,
        }
    }

    /// Constant propellant flow over the rated burn, kg/s.
    pub fn fuel_rate(&self) -> f64 {
        self.propellant_mass / self.burn_time
    }

    pub fn total_mass(&self) -> f64 {
        self.dry_mass + self.propellant_mass
    }

    pub fn exhaust_velocity(&self, surface_gravity: f64) -> f64 {
        self.specific_impulse * surface_gravity
    }

    /// Tsiolkovsky delta-v of this stage while pushing `upper_mass` (later
    /// stages plus payload).
    pub fn delta_v(&self, upper_mass: f64, surface_gravity: f64) -> f64 {
        let initial_mass = self.total_mass() + upper_mass;
        let final_mass = self.dry_mass + upper_mass;
        self.exhaust_velocity(surface_gravity) * (initial_mass / final_mass).ln()
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let positive = [
            ("dry_mass", self.dry_mass),
            ("burn_time", self.burn_time),
            ("specific_impulse", self.specific_impulse),
        ];
        let non_negative = [
            ("propellant_mass", self.propellant_mass),
            ("thrust", self.thrust),
        ];

        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(self.invalid(field, value));
            }
        }
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(self.invalid(field, value));
            }
        }
        Ok(())
    }

    fn invalid(&self, field: &'static str, value: f64) -> SimulationError {
        SimulationError::InvalidStage {
            stage: self.name.clone(),
            field,
            value,
        }
    }
}
