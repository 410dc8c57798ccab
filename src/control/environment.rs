use serde::{Deserialize, Serialize};

use crate::constants::{
    AIR_DENSITY_SEA_LEVEL, EARTH_ATMOSPHERE_HEIGHT, EARTH_SCALE_HEIGHT, KERBIN_ATMOSPHERE_HEIGHT,
    KERBIN_SCALE_HEIGHT,
};
use crate::control::mission::CelestialBody;

/// Exponential atmosphere: `ρ0 · exp(-h / H)` up to `cutoff_altitude`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Atmosphere {
    #[serde(default = "default_sea_level_density")]
    pub sea_level_density: f64, // kg/m³
    #[serde(default = "default_scale_height")]
    pub scale_height: f64, // m
    #[serde(default = "default_cutoff_altitude")]
    pub cutoff_altitude: f64, // m
}

fn default_sea_level_density() -> f64 {
    AIR_DENSITY_SEA_LEVEL
}

fn default_scale_height() -> f64 {
    KERBIN_SCALE_HEIGHT
}

fn default_cutoff_altitude() -> f64 {
    KERBIN_ATMOSPHERE_HEIGHT
}

impl Default for Atmosphere {
    fn default() -> Self {
        Atmosphere::kerbin()
    }
}

impl Atmosphere {
    pub fn new(sea_level_density: f64, scale_height: f64, cutoff_altitude: f64) -> Self {
        Atmosphere {
            sea_level_density,
            scale_height,
            cutoff_altitude,
        }
    }

    pub fn kerbin() -> Self {
        Atmosphere::new(
            AIR_DENSITY_SEA_LEVEL,
            KERBIN_SCALE_HEIGHT,
            KERBIN_ATMOSPHERE_HEIGHT,
        )
    }

    pub fn earth() -> Self {
        Atmosphere::new(
            AIR_DENSITY_SEA_LEVEL,
            EARTH_SCALE_HEIGHT,
            EARTH_ATMOSPHERE_HEIGHT,
        )
    }

    /// No atmosphere at all; every density query returns zero.
    pub fn vacuum() -> Self {
        Atmosphere::new(0.0, KERBIN_SCALE_HEIGHT, 0.0)
    }
}

/// Air density at `altitude` (assumed ≥ 0).
pub fn atmospheric_density(altitude: f64, atmosphere: &Atmosphere) -> f64 {
    if altitude < atmosphere.cutoff_altitude {
        atmosphere.sea_level_density * (-altitude / atmosphere.scale_height).exp()
    } else {
        0.0
    }
}

/// Drag magnitude `0.5 · ρ · v² · Cd · A`.
pub fn drag_force(density: f64, speed: f64, drag_coefficient: f64, reference_area: f64) -> f64 {
    0.5 * density * speed.powi(2) * drag_coefficient * reference_area
}

/// Inverse-square falloff of surface gravity `g0` over a body of radius `body_radius`.
pub fn gravitational_acceleration(altitude: f64, surface_gravity: f64, body_radius: f64) -> f64 {
    surface_gravity * (body_radius / (body_radius + altitude)).powi(2)
}

/// Speed of a circular orbit at `altitude`: `sqrt(g0 · R² / (R + h))`.
pub fn circular_orbit_speed(altitude: f64, surface_gravity: f64, body_radius: f64) -> f64 {
    (surface_gravity * body_radius.powi(2) / (body_radius + altitude)).sqrt()
}

/// The body and atmosphere a flight takes place in.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub body: CelestialBody,
    pub atmosphere: Atmosphere,
}

impl Environment {
    pub fn new(body: CelestialBody, atmosphere: Atmosphere) -> Self {
        Environment { body, atmosphere }
    }

    pub fn density(&self, altitude: f64) -> f64 {
        atmospheric_density(altitude.max(0.0), &self.atmosphere)
    }

    pub fn gravity(&self, altitude: f64) -> f64 {
        gravitational_acceleration(
            altitude.max(0.0),
            self.body.surface_gravity,
            self.body.radius,
        )
    }

    pub fn orbital_speed(&self, altitude: f64) -> f64 {
        circular_orbit_speed(
            altitude.max(0.0),
            self.body.surface_gravity,
            self.body.radius,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn kerbin_environment() -> Environment {
        Environment::new(CelestialBody::kerbin(), Atmosphere::kerbin())
    }

    #[test]
    fn test_density_sea_level() {
        let environment = kerbin_environment();
        assert_abs_diff_eq!(environment.density(0.0), 1.225, epsilon = 1e-12);
    }

    #[test]
    fn test_density_one_scale_height() {
        let environment = kerbin_environment();
        let expected = 1.225 * (-1.0_f64).exp();
        assert_abs_diff_eq!(environment.density(5_000.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_density_above_cutoff() {
        let environment = kerbin_environment();
        assert_eq!(environment.density(70_000.0), 0.0);
        assert_eq!(environment.density(250_000.0), 0.0);
        assert!(environment.density(69_999.0) > 0.0);
    }

    #[test]
    fn test_negative_altitude_is_clamped() {
        let environment = kerbin_environment();
        assert_eq!(environment.density(-50.0), environment.density(0.0));
        assert_eq!(environment.gravity(-50.0), environment.gravity(0.0));
    }

    #[test]
    fn test_drag_force() {
        // 0.5 * 1.225 * 100² * 0.57 * 13.56
        assert_abs_diff_eq!(
            drag_force(1.225, 100.0, 0.57, 13.56),
            47_341.35,
            epsilon = 1e-6
        );
        assert_eq!(drag_force(1.225, 100.0, 0.57, 0.0), 0.0);
    }

    #[test]
    fn test_gravity_inverse_square() {
        let environment = kerbin_environment();
        assert_abs_diff_eq!(environment.gravity(0.0), 9.81, epsilon = 1e-12);

        // One body radius up, gravity drops to a quarter.
        assert_abs_diff_eq!(environment.gravity(600_000.0), 9.81 / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_orbital_speed_kerbin() {
        let environment = kerbin_environment();
        let expected = (9.81_f64 * 600_000.0_f64.powi(2) / 670_000.0).sqrt();
        assert_abs_diff_eq!(environment.orbital_speed(70_000.0), expected, epsilon = 1e-9);
        assert_abs_diff_eq!(environment.orbital_speed(70_000.0), 2_295.9, epsilon = 0.1);
    }

    #[test]
    fn test_vacuum() {
        let environment = Environment::new(CelestialBody::kerbin(), Atmosphere::vacuum());
        assert_eq!(environment.density(0.0), 0.0);
    }
}
