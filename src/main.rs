use std::env::{set_var, var};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use ascent_simulation::*;
use clap::Parser;
use log::info;

const LOG_VAR: &str = "ASCENT_LOG";

#[derive(Parser)]
#[command(author, version, about = "Multi-stage rocket ascent simulator")]
struct Cli {
    /// Scenario file (TOML)
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Built-in scenario: kerbin, earth or vertical
    #[arg(long, default_value = "kerbin")]
    preset: String,

    /// Recorded trace (JSON) to compare the flight against
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Write every sample to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Skip the printed summary
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if var(LOG_VAR).is_err() {
        set_var(LOG_VAR, "INFO");
    }
    if pretty_env_logger::try_init_custom_env(LOG_VAR).is_err() {
        println!("could not init logger");
    }

    let config = match &cli.config {
        Some(path) => SimulationConfig::load(path)?,
        None => MissionFactory::preset(&cli.preset).ok_or_else(|| {
            SimulationError::ConfigurationError(format!(
                "unknown preset `{}`, expected one of {:?}",
                cli.preset,
                MissionFactory::PRESETS
            ))
        })?,
    };

    let g0 = config.body.surface_gravity;
    let budget = config.vehicle.stage_delta_v(g0);
    info!(
        "`{}`: {} stages, liftoff mass {:.0} kg, delta-v {:.0} m/s",
        config.name,
        config.vehicle.stage_count(),
        config.vehicle.liftoff_mass(),
        budget.iter().sum::<f64>()
    );

    let reference = cli.reference.as_ref().map(ReferenceTrace::load).transpose()?;

    let report = simulate(config)?;

    if let Some(path) = &cli.csv {
        let writer = BufWriter::new(File::create(path)?);
        report.telemetry.write_csv(writer)?;
        info!("wrote {} samples to {}", report.telemetry.len(), path.display());
    }

    if !cli.quiet {
        println!("--- Delta-v Budget ---");
        for (index, dv) in budget.iter().enumerate() {
            println!("Stage {}: {:.2} m/s", index + 1, dv);
        }
        println!();
        println!("Outcome: {:?}", report.outcome);
        for time in report.separation_times() {
            println!("Separation at: {}", Telemetry::format_time(time));
        }
        report.telemetry.display_summary();
        if let Some(maneuver) = &report.maneuver {
            println!("\n--- Scripted Maneuver ---");
            maneuver.display_summary();
        }
    }

    if let Some(trace) = reference {
        let comparison = trace.compare(&report.telemetry.series());
        println!("\n--- Reference Comparison ({} points) ---", comparison.matched_points);
        for deviation in &comparison.channels {
            println!(
                "{:<22} rms {:>12.3}  max {:>12.3}",
                deviation.channel.label(),
                deviation.rms,
                deviation.max_abs
            );
        }
    }

    Ok(())
}
