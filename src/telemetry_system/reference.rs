//! Recorded flight traces and how far a simulated run strays from them.
//!
//! Traces come as a JSON array of records, each holding parallel arrays.
//! Only the first record is read.

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::telemetry::TimeSeries;
use crate::errors::SimulationError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTrace {
    #[serde(rename = "pastime")]
    pub time: Vec<f64>,
    #[serde(rename = "height")]
    pub altitude: Vec<f64>,
    #[serde(rename = "velocity")]
    pub speed: Vec<f64>,
    #[serde(rename = "ox_velocity")]
    pub vx: Vec<f64>,
    #[serde(rename = "oy_velocity")]
    pub vy: Vec<f64>,
    #[serde(rename = "acc")]
    pub acceleration: Vec<f64>,
    #[serde(rename = "ox_ac")]
    pub ax: Vec<f64>,
    #[serde(rename = "oy_ac")]
    pub ay: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Channel {
    Altitude,
    Speed,
    HorizontalVelocity,
    VerticalVelocity,
    Acceleration,
    HorizontalAcceleration,
    VerticalAcceleration,
}

impl Channel {
    pub const ALL: [Channel; 7] = [
        Channel::Altitude,
        Channel::Speed,
        Channel::HorizontalVelocity,
        Channel::VerticalVelocity,
        Channel::Acceleration,
        Channel::HorizontalAcceleration,
        Channel::VerticalAcceleration,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Channel::Altitude => "altitude [m]",
            Channel::Speed => "speed [m/s]",
            Channel::HorizontalVelocity => "vx [m/s]",
            Channel::VerticalVelocity => "vy [m/s]",
            Channel::Acceleration => "acceleration [m/s²]",
            Channel::HorizontalAcceleration => "ax [m/s²]",
            Channel::VerticalAcceleration => "ay [m/s²]",
        }
    }

    fn of_reference(self, trace: &ReferenceTrace) -> &[f64] {
        match self {
            Channel::Altitude => &trace.altitude,
            Channel::Speed => &trace.speed,
            Channel::HorizontalVelocity => &trace.vx,
            Channel::VerticalVelocity => &trace.vy,
            Channel::Acceleration => &trace.acceleration,
            Channel::HorizontalAcceleration => &trace.ax,
            Channel::VerticalAcceleration => &trace.ay,
        }
    }

    fn of_model(self, series: &TimeSeries) -> &[f64] {
        match self {
            Channel::Altitude => &series.altitude,
            Channel::Speed => &series.speed,
            Channel::HorizontalVelocity => &series.vx,
            Channel::VerticalVelocity => &series.vy,
            Channel::Acceleration => &series.acceleration,
            Channel::HorizontalAcceleration => &series.ax,
            Channel::VerticalAcceleration => &series.ay,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelDeviation {
    pub channel: Channel,
    pub rms: f64,
    pub max_abs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceComparison {
    /// Reference points that fell inside the model's time span.
    pub matched_points: usize,
    pub channels: Vec<ChannelDeviation>,
}

impl TraceComparison {
    pub fn channel(&self, channel: Channel) -> Option<&ChannelDeviation> {
        self.channels.iter().find(|d| d.channel == channel)
    }
}

impl ReferenceTrace {
    pub fn from_json_str(contents: &str) -> Result<Self, SimulationError> {
        let records: Vec<ReferenceTrace> = serde_json::from_str(contents)?;
        let trace = records.into_iter().next().ok_or_else(|| {
            SimulationError::ReferenceError("trace file holds no records".to_string())
        })?;
        trace.validate()?;
        Ok(trace)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SimulationError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let trace = ReferenceTrace::from_json_str(&contents)?;
        debug!(
            "loaded reference trace from {} ({} points)",
            path.display(),
            trace.len()
        );
        Ok(trace)
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    fn validate(&self) -> Result<(), SimulationError> {
        let n = self.time.len();
        for channel in Channel::ALL {
            let len = channel.of_reference(self).len();
            if len != n {
                return Err(SimulationError::ReferenceError(format!(
                    "channel {} has {} points, time has {}",
                    channel.label(),
                    len,
                    n
                )));
            }
        }
        if self.time.windows(2).any(|w| w[1] < w[0]) {
            return Err(SimulationError::ReferenceError(
                "reference times must be non-decreasing".to_string(),
            ));
        }
        Ok(())
    }

    /// Deviation of this trace from `model`, sampled at the trace's own times.
    pub fn compare(&self, model: &TimeSeries) -> TraceComparison {
        let matched: Vec<(usize, f64)> = self
            .time
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, t)| within_span(&model.time, t))
            .collect();

        let channels = Channel::ALL
            .iter()
            .map(|&channel| {
                let reference = channel.of_reference(self);
                let values = channel.of_model(model);
                let (sum_sq, max_abs) =
                    matched
                        .iter()
                        .fold((0.0, 0.0_f64), |(sum_sq, max_abs), &(i, t)| {
                            let deviation = interpolate(&model.time, values, t)
                                .map_or(0.0, |value| reference[i] - value);
                            (sum_sq + deviation * deviation, max_abs.max(deviation.abs()))
                        });
                let rms = if matched.is_empty() {
                    0.0
                } else {
                    (sum_sq / matched.len() as f64).sqrt()
                };
                ChannelDeviation {
                    channel,
                    rms,
                    max_abs,
                }
            })
            .collect();

        TraceComparison {
            matched_points: matched.len(),
            channels,
        }
    }
}

fn within_span(times: &[f64], t: f64) -> bool {
    match (times.first(), times.last()) {
        (Some(&first), Some(&last)) => t >= first && t <= last,
        _ => false,
    }
}

/// Linear interpolation of `values` over the sorted `times` at `t`.
fn interpolate(times: &[f64], values: &[f64], t: f64) -> Option<f64> {
    if !within_span(times, t) || values.len() != times.len() {
        return None;
    }
    let upper = times.partition_point(|&time| time < t);
    if upper == 0 || times[upper] == t {
        return Some(values[upper]);
    }
    let (t0, t1) = (times[upper - 1], times[upper]);
    let (v0, v1) = (values[upper - 1], values[upper]);
    Some(v0 + (v1 - v0) * (t - t0) / (t1 - t0))
}
