use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PITCH;
use crate::errors::SimulationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchScheduleEntry {
    #[serde(alias = "time")]
    pub time_threshold: f64, // s
    #[serde(alias = "pitch")]
    pub pitch_angle_degrees: f64, // degrees from local horizontal
}

impl PitchScheduleEntry {
    pub fn new(time_threshold: f64, pitch_angle_degrees: f64) -> Self {
        PitchScheduleEntry {
            time_threshold,
            pitch_angle_degrees,
        }
    }
}

impl From<(f64, f64)> for PitchScheduleEntry {
    fn from((time_threshold, pitch_angle_degrees): (f64, f64)) -> Self {
        PitchScheduleEntry::new(time_threshold, pitch_angle_degrees)
    }
}

/// Commanded attitude as a step function of mission time.
///
/// The angle in force at `t` is the one of the last entry whose threshold is
/// not after `t`; before the first threshold the default applies. There is
/// no blending between entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PitchSchedule")]
pub struct PitchProgram {
    default_pitch: f64,
    schedule: Vec<PitchScheduleEntry>,
}

/// Unchecked form of a pitch program as it appears in scenario files.
#[derive(Debug, Deserialize)]
struct PitchSchedule {
    #[serde(default = "default_pitch")]
    default_pitch: f64,
    #[serde(default)]
    schedule: Vec<PitchScheduleEntry>,
}

fn default_pitch() -> f64 {
    DEFAULT_PITCH
}

impl TryFrom<PitchSchedule> for PitchProgram {
    type Error = SimulationError;

    fn try_from(raw: PitchSchedule) -> Result<Self, Self::Error> {
        PitchProgram::new(raw.schedule, raw.default_pitch)
    }
}

impl Default for PitchProgram {
    fn default() -> Self {
        PitchProgram::fixed(DEFAULT_PITCH)
    }
}

impl PitchProgram {
    pub fn new(
        schedule: Vec<PitchScheduleEntry>,
        default_pitch: f64,
    ) -> Result<Self, SimulationError> {
        if !default_pitch.is_finite() {
            return Err(SimulationError::ConfigurationError(format!(
                "default pitch must be finite, got {}",
                default_pitch
            )));
        }

        for (index, entry) in schedule.iter().enumerate() {
            if !entry.time_threshold.is_finite() {
                return Err(SimulationError::PitchScheduleError {
                    index,
                    threshold: entry.time_threshold,
                });
            }
            if !entry.pitch_angle_degrees.is_finite() {
                return Err(SimulationError::ConfigurationError(format!(
                    "pitch angle of schedule entry {} must be finite",
                    index
                )));
            }
        }

        if let Some(index) = schedule
            .windows(2)
            .position(|pair| pair[1].time_threshold <= pair[0].time_threshold)
        {
            return Err(SimulationError::PitchScheduleError {
                index: index + 1,
                threshold: schedule[index + 1].time_threshold,
            });
        }

        Ok(PitchProgram {
            default_pitch,
            schedule,
        })
    }

    /// Builds a program from `(time, pitch)` pairs with a vertical default.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, SimulationError> {
        let schedule = pairs.iter().copied().map(PitchScheduleEntry::from).collect();
        PitchProgram::new(schedule, DEFAULT_PITCH)
    }

    /// Holds `pitch_angle_degrees` for the whole flight.
    pub fn fixed(pitch_angle_degrees: f64) -> Self {
        PitchProgram {
            default_pitch: pitch_angle_degrees,
            schedule: Vec::new(),
        }
    }

    pub fn pitch_at(&self, elapsed_time: f64) -> f64 {
        // Thresholds are strictly increasing, so the entries not after
        // `elapsed_time` form a prefix.
        let applicable = self
            .schedule
            .partition_point(|entry| entry.time_threshold <= elapsed_time);

        match applicable {
            0 => self.default_pitch,
            n => self.schedule[n - 1].pitch_angle_degrees,
        }
    }

    pub fn pitch_radians_at(&self, elapsed_time: f64) -> f64 {
        self.pitch_at(elapsed_time).to_radians()
    }

    pub fn default_pitch(&self) -> f64 {
        self.default_pitch
    }

    pub fn entries(&self) -> &[PitchScheduleEntry] {
        &self.schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_latest_applicable_entry_wins() {
        let program = PitchProgram::from_pairs(&[(0.0, 90.0), (10.0, 89.0), (100.0, 40.0)]).unwrap();

        assert_eq!(program.pitch_at(5.0), 90.0);
        assert_eq!(program.pitch_at(10.0), 89.0);
        assert_eq!(program.pitch_at(99.0), 89.0);
        assert_eq!(program.pitch_at(100.0), 40.0);
        assert_eq!(program.pitch_at(1000.0), 40.0);
    }

    #[test]
    fn test_default_before_first_threshold() {
        let program = PitchProgram::new(vec![PitchScheduleEntry::new(5.0, 80.0)], 87.5).unwrap();

        assert_eq!(program.pitch_at(0.0), 87.5);
        assert_eq!(program.pitch_at(4.999), 87.5);
        assert_eq!(program.pitch_at(5.0), 80.0);
    }

    #[test]
    fn test_no_interpolation_between_entries() {
        let program = PitchProgram::from_pairs(&[(0.0, 90.0), (10.0, 0.0)]).unwrap();
        assert_eq!(program.pitch_at(9.99), 90.0);
    }

    #[test]
    fn test_fixed_program() {
        let program = PitchProgram::fixed(45.0);
        assert_eq!(program.pitch_at(0.0), 45.0);
        assert_eq!(program.pitch_at(1.0e6), 45.0);
        assert_relative_eq!(
            program.pitch_radians_at(12.0),
            std::f64::consts::FRAC_PI_4,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_rejects_repeated_threshold() {
        let result = PitchProgram::from_pairs(&[(0.0, 90.0), (10.0, 89.0), (10.0, 80.0)]);
        assert!(matches!(
            result,
            Err(SimulationError::PitchScheduleError { index: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_decreasing_threshold() {
        let result = PitchProgram::from_pairs(&[(20.0, 90.0), (10.0, 89.0)]);
        assert!(matches!(
            result,
            Err(SimulationError::PitchScheduleError { index: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_nan_threshold() {
        let result = PitchProgram::from_pairs(&[(0.0, 90.0), (f64::NAN, 89.0)]);
        assert!(result.is_err());
    }
}
