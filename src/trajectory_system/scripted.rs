use serde::{Deserialize, Serialize};

use crate::constants::MAX_SCRIPTED_STEPS;
use crate::control::rocket::VehicleState;
use crate::errors::SimulationError;
use crate::telemetry_system::{sample::Sample, telemetry::Telemetry};
use crate::utils::vector2d::Vector2D;

/// One leg of a pre-baked maneuver: speed ramps linearly from
/// `start_velocity` to `end_velocity` along a fixed pitch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptedSegment {
    pub duration: f64,       // s
    pub start_velocity: f64, // m/s
    pub end_velocity: f64,   // m/s
    pub pitch: f64,          // degrees
    #[serde(default)]
    pub engine_on: bool,
}

impl ScriptedSegment {
    pub fn new(duration: f64, start_velocity: f64, end_velocity: f64, pitch: f64, engine_on: bool) -> Self {
        ScriptedSegment {
            duration,
            start_velocity,
            end_velocity,
            pitch,
            engine_on,
        }
    }

    pub fn slope(&self) -> f64 {
        (self.end_velocity - self.start_velocity) / self.duration
    }

    /// Whole steps of `time_step` the segment is played over; at least one.
    pub fn step_count(&self, time_step: f64) -> u64 {
        (self.duration / time_step)
            .round()
            .clamp(1.0, MAX_SCRIPTED_STEPS as f64) as u64
    }

    fn validate(&self, index: usize, time_step: f64) -> Result<(), SimulationError> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "scripted segment {} needs a positive duration, got {}",
                index + 1,
                self.duration
            )));
        }
        if (self.duration / time_step).round() > MAX_SCRIPTED_STEPS as f64 {
            return Err(SimulationError::ConfigurationError(format!(
                "scripted segment {} spans more than {} steps of {} s",
                index + 1,
                MAX_SCRIPTED_STEPS,
                time_step
            )));
        }
        if ![self.start_velocity, self.end_velocity, self.pitch]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(SimulationError::ConfigurationError(format!(
                "scripted segment {} has a non-finite velocity or pitch",
                index + 1
            )));
        }
        Ok(())
    }
}

/// Kinematic playback of velocity ramps. No forces are evaluated, so mass
/// never changes and the force channels of every sample are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedManeuver {
    segments: Vec<ScriptedSegment>,
    time_step: f64,
}

impl ScriptedManeuver {
    pub fn new(segments: Vec<ScriptedSegment>, time_step: f64) -> Result<Self, SimulationError> {
        if !(time_step.is_finite() && time_step > 0.0) {
            return Err(SimulationError::ConfigurationError(format!(
                "time step must be positive, got {}",
                time_step
            )));
        }
        for (index, segment) in segments.iter().enumerate() {
            segment.validate(index, time_step)?;
        }
        Ok(ScriptedManeuver {
            segments,
            time_step,
        })
    }

    pub fn segments(&self) -> &[ScriptedSegment] {
        &self.segments
    }

    pub fn duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }

    /// Plays the maneuver from `initial`. Each segment is split into a whole
    /// number of steps and reaches its end velocity on its last step.
    pub fn fly(&self, initial: &VehicleState) -> Telemetry {
        let dt = self.time_step;
        let mut telemetry = Telemetry::new();
        let mut position = initial.position;
        let mut steps: u64 = 0;

        for segment in &self.segments {
            let n = segment.step_count(dt);
            let direction = Vector2D::from_polar(1.0, segment.pitch.to_radians());
            let acceleration = direction * segment.slope();

            for k in 1..=n {
                let fraction = k as f64 / n as f64;
                let speed = segment.start_velocity
                    + (segment.end_velocity - segment.start_velocity) * fraction;
                let velocity = direction * speed;
                position = position + velocity * dt;

                telemetry.record(Sample {
                    elapsed_time: initial.elapsed_time + steps as f64 * dt,
                    position,
                    velocity,
                    acceleration,
                    total_mass: initial.total_mass,
                    remaining_propellant: initial.remaining_propellant,
                    active_stage_index: initial.active_stage_index,
                    engine_on: segment.engine_on,
                    pitch_angle: segment.pitch,
                    thrust: 0.0,
                    drag_force: 0.0,
                    gravity: 0.0,
                    density: 0.0,
                });
                steps += 1;
            }
        }

        telemetry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::mission::MissionFactory;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn initial() -> VehicleState {
        VehicleState::at_liftoff(&MissionFactory::vertical_test_flight().vehicle)
    }

    #[test]
    fn test_linear_ramp() {
        let maneuver =
            ScriptedManeuver::new(vec![ScriptedSegment::new(10.0, 0.0, 100.0, 90.0, true)], 0.1)
                .unwrap();
        let telemetry = maneuver.fly(&initial());
        let samples = telemetry.samples();

        assert_eq!(samples.len(), 100);
        assert_eq!(samples[0].elapsed_time, 0.0);
        assert_relative_eq!(samples[99].elapsed_time, 9.9, epsilon = 1e-12);

        let last = samples[99];
        assert_abs_diff_eq!(last.velocity.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(last.velocity.y, 100.0, epsilon = 1e-12);
        assert_relative_eq!(last.acceleration.y, 10.0, epsilon = 1e-12);
        // dt · (1 + 2 + ... + 100)
        assert_relative_eq!(last.position.y, 505.0, epsilon = 1e-9);
    }

    #[test]
    fn test_segments_chain() {
        let maneuver = ScriptedManeuver::new(
            vec![
                ScriptedSegment::new(5.0, 200.0, 100.0, 0.0, true),
                ScriptedSegment::new(2.0, 100.0, 100.0, 0.0, false),
            ],
            0.5,
        )
        .unwrap();
        let telemetry = maneuver.fly(&initial());
        let samples = telemetry.samples();

        assert_eq!(maneuver.duration(), 7.0);
        assert_eq!(samples.len(), 14);
        assert_relative_eq!(samples[0].acceleration.x, -20.0, epsilon = 1e-12);
        assert!(samples[9].engine_on);
        assert!(!samples[10].engine_on);
        assert_eq!(samples[10].acceleration, Vector2D::ZERO);
        assert_eq!(samples[13].elapsed_time, 6.5);

        for sample in samples {
            assert_eq!(sample.total_mass, 10_000.0);
            assert_eq!(sample.thrust, 0.0);
            assert_eq!(sample.drag_force, 0.0);
        }
    }

    #[test]
    fn test_rejects_zero_duration() {
        let result = ScriptedManeuver::new(vec![ScriptedSegment::new(0.0, 0.0, 1.0, 0.0, true)], 0.1);
        assert!(matches!(result, Err(SimulationError::ConfigurationError(_))));
        assert!(ScriptedManeuver::new(Vec::new(), -1.0).is_err());
    }

    #[test]
    fn test_rejects_segment_with_too_many_steps() {
        let long = ScriptedSegment::new(1.0e12, 0.0, 1.0, 0.0, false);
        assert!(matches!(
            ScriptedManeuver::new(vec![long], 0.1),
            Err(SimulationError::ConfigurationError(_))
        ));

        let fine_step = ScriptedSegment::new(1.0, 0.0, 1.0, 0.0, false);
        assert!(ScriptedManeuver::new(vec![fine_step], 1.0e-300).is_err());

        let at_limit = ScriptedSegment::new(MAX_SCRIPTED_STEPS as f64, 0.0, 1.0, 0.0, false);
        assert!(ScriptedManeuver::new(vec![at_limit], 1.0).is_ok());
        assert_eq!(at_limit.step_count(1.0), MAX_SCRIPTED_STEPS);
        assert_eq!(fine_step.step_count(10.0), 1);
    }
}
