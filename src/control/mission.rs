use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::constants::{EARTH_RADIUS, GRAVITY, KERBIN_RADIUS};
use crate::control::environment::Atmosphere;
use crate::control::launch_stages::Stage;
use crate::control::payload::Payload;
use crate::control::pitch_program::PitchProgram;
use crate::control::structure::Structure;
use crate::trajectory_system::aerodynamics::Aerodynamics;
use crate::trajectory_system::integrator::IntegrationSettings;
use crate::trajectory_system::termination::TerminationCriteria;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CelestialBody {
    pub name: String,
    pub radius: f64,          // m
    pub surface_gravity: f64, // m/s²
}

impl CelestialBody {
    pub fn new(name: impl Into<String>, radius: f64, surface_gravity: f64) -> Self {
        CelestialBody {
            name: name.into(),
            radius,
            surface_gravity,
        }
    }

    pub fn kerbin() -> Self {
        CelestialBody::new("Kerbin", KERBIN_RADIUS, GRAVITY)
    }

    pub fn earth() -> Self {
        CelestialBody::new("Earth", EARTH_RADIUS, GRAVITY)
    }

    /// Standard gravitational parameter implied by `g0 · R²`.
    pub fn gravitational_parameter(&self) -> f64 {
        self.surface_gravity * self.radius.powi(2)
    }
}

/// Gravity-turn schedule flown by the Kerbin two-stage vehicle: vertical at
/// liftoff, horizontal by T+150 s.
const KERBIN_PITCH_SCHEDULE: [(f64, f64); 17] = [
    (0.0, 90.0),
    (10.0, 89.0),
    (20.0, 88.0),
    (30.0, 86.0),
    (40.0, 83.0),
    (50.0, 79.0),
    (60.0, 74.0),
    (70.0, 68.0),
    (80.0, 60.0),
    (90.0, 50.0),
    (100.0, 40.0),
    (110.0, 30.0),
    (120.0, 20.0),
    (130.0, 10.0),
    (140.0, 5.0),
    (150.0, 0.0),
    (300.0, 0.0),
];

const EARTH_PITCH_SCHEDULE: [(f64, f64); 9] = [
    (0.0, 90.0),
    (15.0, 85.0),
    (40.0, 72.0),
    (70.0, 60.0),
    (100.0, 48.0),
    (140.0, 38.0),
    (180.0, 30.0),
    (240.0, 20.0),
    (320.0, 15.0),
];

pub struct MissionFactory;

impl MissionFactory {
    pub const PRESETS: [&'static str; 3] = ["kerbin", "earth", "vertical"];

    pub fn preset(name: &str) -> Option<SimulationConfig> {
        match name.to_ascii_lowercase().as_str() {
            "kerbin" => Some(Self::kerbin_orbit()),
            "earth" => Some(Self::earth_orbit()),
            "vertical" => Some(Self::vertical_test_flight()),
            _ => None,
        }
    }

    /// Two-stage ascent from Kerbin to low orbit.
    pub fn kerbin_orbit() -> SimulationConfig {
        let stages = vec![
            Stage::new("First stage", 47_554.0, 108_389.0, 100.0, 2_664_700.0, 290.0),
            Stage::new("Second stage", 14_769.0, 18_633.0, 117.0, 510_630.0, 345.0),
        ];

        SimulationConfig {
            name: "Kerbin orbit".to_string(),
            body: CelestialBody::kerbin(),
            atmosphere: Atmosphere::kerbin(),
            aerodynamics: Aerodynamics::new(0.57, 13.56),
            vehicle: Structure::new(stages, Payload::none()),
            pitch: Self::schedule(&KERBIN_PITCH_SCHEDULE),
            integration: IntegrationSettings::default(),
            termination: TerminationCriteria::default(),
            maneuver: Vec::new(),
        }
    }

    /// Two-stage medium lift vehicle against Earth constants.
    pub fn earth_orbit() -> SimulationConfig {
        let stages = vec![
            Stage::new("Booster", 25_600.0, 395_700.0, 162.0, 7_607_000.0, 282.0),
            Stage::new("Upper stage", 3_900.0, 92_670.0, 397.0, 934_000.0, 348.0),
        ];

        SimulationConfig {
            name: "Earth orbit".to_string(),
            body: CelestialBody::earth(),
            atmosphere: Atmosphere::earth(),
            aerodynamics: Aerodynamics::new(0.3, 10.5),
            vehicle: Structure::new(stages, Payload::new("Satellite", 15_000.0)),
            pitch: Self::schedule(&EARTH_PITCH_SCHEDULE),
            integration: IntegrationSettings::default(),
            termination: TerminationCriteria {
                orbit_altitude: 80_000.0,
                timeout: 600.0,
                ..TerminationCriteria::default()
            },
            maneuver: Vec::new(),
        }
    }

    /// Single stage held vertical with no drag; a check flight for the
    /// integrator rather than an orbital attempt.
    pub fn vertical_test_flight() -> SimulationConfig {
        SimulationConfig {
            name: "Vertical test flight".to_string(),
            body: CelestialBody::kerbin(),
            atmosphere: Atmosphere::kerbin(),
            aerodynamics: Aerodynamics::frictionless(),
            vehicle: Structure::new(
                vec![Stage::new("Test stage", 1_000.0, 9_000.0, 100.0, 150_000.0, 300.0)],
                Payload::none(),
            ),
            pitch: PitchProgram::fixed(90.0),
            integration: IntegrationSettings::default(),
            termination: TerminationCriteria::default(),
            maneuver: Vec::new(),
        }
    }

    fn schedule(pairs: &[(f64, f64)]) -> PitchProgram {
        // Constant tables above are strictly increasing.
        PitchProgram::from_pairs(pairs).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_presets_validate() {
        for name in MissionFactory::PRESETS {
            let config = MissionFactory::preset(name).unwrap();
            assert!(config.validate().is_ok(), "preset {} should validate", name);
        }
        assert!(MissionFactory::preset("duna").is_none());
    }

    #[test]
    fn test_kerbin_orbit_vehicle() {
        let config = MissionFactory::kerbin_orbit();

        assert_eq!(config.body.name, "Kerbin");
        assert_eq!(config.vehicle.stage_count(), 2);
        assert_abs_diff_eq!(config.vehicle.liftoff_mass(), 189_345.0, epsilon = 1e-9);
        assert_eq!(config.pitch.entries().len(), 17);
        assert_eq!(config.pitch.pitch_at(105.0), 40.0);
        assert_eq!(config.pitch.pitch_at(200.0), 0.0);
    }

    #[test]
    fn test_kerbin_delta_v_budget() {
        let config = MissionFactory::kerbin_orbit();
        let budget = config.vehicle.stage_delta_v(config.body.surface_gravity);

        let first = 290.0 * 9.81 * (189_345.0_f64 / 80_956.0).ln();
        let second = 345.0 * 9.81 * (33_402.0_f64 / 14_769.0).ln();
        assert_abs_diff_eq!(budget[0], first, epsilon = 1e-6);
        assert_abs_diff_eq!(budget[1], second, epsilon = 1e-6);
    }

    #[test]
    fn test_gravitational_parameter() {
        let kerbin = CelestialBody::kerbin();
        assert_abs_diff_eq!(kerbin.gravitational_parameter(), 3.5316e12, epsilon = 1e6);
    }
}
