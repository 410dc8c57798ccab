use std::io::Write;

use serde::Serialize;

use super::sample::{Sample, SampleRecord};
use crate::errors::SimulationError;

/// Ordered record of every step of a run.
#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    samples: Vec<Sample>,
}

/// Column view of a flight, one vector per channel, all the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    pub time: Vec<f64>,
    pub altitude: Vec<f64>,
    pub downrange: Vec<f64>,
    pub speed: Vec<f64>,
    pub vx: Vec<f64>,
    pub vy: Vec<f64>,
    pub acceleration: Vec<f64>,
    pub ax: Vec<f64>,
    pub ay: Vec<f64>,
    pub mass: Vec<f64>,
    pub thrust: Vec<f64>,
    pub pitch: Vec<f64>,
    pub drag: Vec<f64>,
    pub stage: Vec<usize>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlightSummary {
    pub duration: f64,
    pub max_altitude: f64,
    pub max_speed: f64,
    pub max_acceleration: f64,
    pub max_drag: f64,
    pub max_dynamic_pressure: f64,
    pub final_mass: f64,
}

impl Telemetry {
    pub fn new() -> Self {
        Telemetry {
            samples: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Telemetry {
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn series(&self) -> TimeSeries {
        let mut series = TimeSeries::default();
        for sample in &self.samples {
            series.time.push(sample.elapsed_time);
            series.altitude.push(sample.altitude());
            series.downrange.push(sample.downrange());
            series.speed.push(sample.speed());
            series.vx.push(sample.velocity.x);
            series.vy.push(sample.velocity.y);
            series.acceleration.push(sample.acceleration_magnitude());
            series.ax.push(sample.acceleration.x);
            series.ay.push(sample.acceleration.y);
            series.mass.push(sample.total_mass);
            series.thrust.push(sample.thrust);
            series.pitch.push(sample.pitch_angle);
            series.drag.push(sample.drag_force);
            series.stage.push(sample.active_stage_index);
        }
        series
    }

    /// Peak values over the whole run; `None` before the first step.
    pub fn summary(&self) -> Option<FlightSummary> {
        let last = self.samples.last()?;
        let peak = |f: fn(&Sample) -> f64| self.samples.iter().map(f).fold(f64::MIN, f64::max);

        Some(FlightSummary {
            duration: last.elapsed_time,
            max_altitude: peak(Sample::altitude),
            max_speed: peak(Sample::speed),
            max_acceleration: peak(Sample::acceleration_magnitude),
            max_drag: peak(|s| s.drag_force),
            max_dynamic_pressure: peak(Sample::dynamic_pressure),
            final_mass: last.total_mass,
        })
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), SimulationError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for sample in &self.samples {
            csv_writer.serialize(SampleRecord::from(sample))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn format_time(elapsed_time: f64) -> String {
        if elapsed_time >= 3600.0 {
            let hours = (elapsed_time / 3600.0).floor();
            let minutes = ((elapsed_time % 3600.0) / 60.0).floor();
            let seconds = elapsed_time % 60.0;
            format!("{:.0}h {:.0}m {:.2}s", hours, minutes, seconds)
        } else if elapsed_time >= 60.0 {
            let minutes = (elapsed_time / 60.0).floor();
            let seconds = elapsed_time % 60.0;
            format!("{:.0}m {:.2}s", minutes, seconds)
        } else {
            format!("{:.2}s", elapsed_time)
        }
    }

    pub fn format_altitude(altitude: f64) -> String {
        if altitude.abs() >= 1000.0 {
            format!("{:.2} km", altitude / 1000.0)
        } else {
            format!("{:.2} m", altitude)
        }
    }

    pub fn display_summary(&self) {
        let Some(summary) = self.summary() else {
            println!("No telemetry recorded.");
            return;
        };

        println!("--- Flight Summary ---");
        println!("Duration: {}", Self::format_time(summary.duration));
        println!("Max Altitude: {}", Self::format_altitude(summary.max_altitude));
        println!("Max Velocity: {:.2} m/s", summary.max_speed);
        println!("Max Acceleration: {:.2} m/s²", summary.max_acceleration);
        println!("Max Drag: {:.2} N", summary.max_drag);
        println!("Max Dynamic Pressure: {:.2} Pa", summary.max_dynamic_pressure);
        println!("Final Mass: {:.2} kg", summary.final_mass);

        if let Some(last) = self.last() {
            println!(
                "Final State: altitude {}, downrange {}, speed {:.2} m/s (vx {:.2}, vy {:.2})",
                Self::format_altitude(last.altitude()),
                Self::format_altitude(last.downrange()),
                last.speed(),
                last.velocity.x,
                last.velocity.y
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::vector2d::Vector2D;

    fn sample(time: f64, altitude: f64, speed: f64, drag: f64) -> Sample {
        Sample {
            elapsed_time: time,
            position: Vector2D::new(0.0, altitude),
            velocity: Vector2D::new(0.0, speed),
            acceleration: Vector2D::new(0.0, 5.0),
            total_mass: 1_000.0 - time,
            remaining_propellant: 500.0 - time,
            active_stage_index: 0,
            engine_on: true,
            pitch_angle: 90.0,
            thrust: 20_000.0,
            drag_force: drag,
            gravity: 9.81,
            density: 1.0,
        }
    }

    fn telemetry() -> Telemetry {
        let mut telemetry = Telemetry::new();
        telemetry.record(sample(0.0, 10.0, 20.0, 100.0));
        telemetry.record(sample(0.1, 30.0, 60.0, 400.0));
        telemetry.record(sample(0.2, 25.0, 40.0, 250.0));
        telemetry
    }

    #[test]
    fn test_empty_telemetry() {
        let telemetry = Telemetry::new();
        assert!(telemetry.is_empty());
        assert!(telemetry.summary().is_none());
        assert!(telemetry.series().is_empty());
    }

    #[test]
    fn test_series_columns() {
        let series = telemetry().series();

        assert_eq!(series.len(), 3);
        assert_eq!(series.time, vec![0.0, 0.1, 0.2]);
        assert_eq!(series.altitude, vec![10.0, 30.0, 25.0]);
        assert_eq!(series.vy, series.speed);
        assert_eq!(series.stage, vec![0, 0, 0]);
    }

    #[test]
    fn test_summary_peaks() {
        let summary = telemetry().summary().unwrap();

        assert_eq!(summary.duration, 0.2);
        assert_eq!(summary.max_altitude, 30.0);
        assert_eq!(summary.max_speed, 60.0);
        assert_eq!(summary.max_drag, 400.0);
        assert_eq!(summary.max_dynamic_pressure, 0.5 * 60.0 * 60.0);
        assert_eq!(summary.final_mass, 1_000.0 - 0.2);
    }

    #[test]
    fn test_csv_export() {
        let mut buffer = Vec::new();
        telemetry().write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("time,x,altitude,vx,vy,speed"));
        assert!(lines[2].starts_with("0.1,0.0,30.0"));
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(Telemetry::format_time(42.0), "42.00s");
        assert_eq!(Telemetry::format_time(125.5), "2m 5.50s");
        assert_eq!(Telemetry::format_altitude(950.0), "950.00 m");
        assert_eq!(Telemetry::format_altitude(72_500.0), "72.50 km");
    }
}
