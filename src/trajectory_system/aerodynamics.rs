use serde::{Deserialize, Serialize};

use crate::constants::{ROCKET_CROSS_SECTIONAL_AREA, ROCKET_DRAG_COEFFICIENT};
use crate::control::environment::drag_force;
use crate::utils::vector2d::Vector2D;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aerodynamics {
    #[serde(default = "default_drag_coefficient")]
    pub drag_coefficient: f64,
    #[serde(default = "default_reference_area")]
    pub reference_area: f64, // m²
}

fn default_drag_coefficient() -> f64 {
    ROCKET_DRAG_COEFFICIENT
}

fn default_reference_area() -> f64 {
    ROCKET_CROSS_SECTIONAL_AREA
}

impl Default for Aerodynamics {
    fn default() -> Self {
        Aerodynamics::new(ROCKET_DRAG_COEFFICIENT, ROCKET_CROSS_SECTIONAL_AREA)
    }
}

impl Aerodynamics {
    pub fn new(drag_coefficient: f64, reference_area: f64) -> Self {
        Aerodynamics {
            drag_coefficient,
            reference_area,
        }
    }

    /// A body with no frontal area; drag is always zero.
    pub fn frictionless() -> Self {
        Aerodynamics::new(0.0, 0.0)
    }

    pub fn drag_magnitude(&self, density: f64, speed: f64) -> f64 {
        drag_force(density, speed, self.drag_coefficient, self.reference_area)
    }

    /// Drag of `magnitude` opposing `velocity`. Zero at or below
    /// `speed_epsilon`, where the direction is undefined.
    pub fn drag_vector(&self, velocity: Vector2D, magnitude: f64, speed_epsilon: f64) -> Vector2D {
        match velocity.direction(speed_epsilon) {
            Some(direction) => -direction * magnitude,
            None => Vector2D::ZERO,
        }
    }
}
