//! `slots` CLI — validate provider schedules and list bookable times.
//!
//! ## Usage
//!
//! ```sh
//! # Check a stored schedule before saving it
//! slots validate -i schedule.json
//!
//! # Working windows for a date, from a snapshot {schedule, service, bookings}
//! slots windows --date 2026-03-16 -i snapshot.json
//!
//! # Bookable start times, offered every 15 minutes
//! slots slots --date 2026-03-16 --step 15 -i snapshot.json
//!
//! # Engine defaults from a config file, written to a file
//! slots --config engine.json slots --date 2026-03-16 -i snapshot.json -o out.json
//!
//! # Print the default Monday-Friday business-hours schedule
//! slots default-schedule
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use slot_engine::{EngineConfig, ProviderSchedule, ScheduleRecord, Snapshot, WeeklyTemplate};

#[derive(Parser)]
#[command(name = "slots", version, about = "Provider availability and bookable slots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (JSON, e.g. {"defaultStepMinutes": 30})
    #[arg(long, global = true)]
    config: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a provider schedule (weekly template + exceptions)
    Validate {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Show the working windows for one date
    Windows {
        /// Calendar date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        /// Snapshot file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// List bookable start times for one date
    Slots {
        /// Calendar date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        /// Snapshot file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Minutes between offered start times, for services without their own step
        #[arg(long, env = "SLOTS_STEP_MINUTES")]
        step: Option<u32>,
    },
    /// Print the default business-hours schedule as JSON
    DefaultSchedule,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    debug!(?config, "engine configuration");

    match cli.command {
        Commands::Validate { input } => {
            let json = read_input(input.as_deref())?;
            let record: ScheduleRecord =
                serde_json::from_str(&json).context("Failed to parse schedule JSON")?;
            ProviderSchedule::try_from(record).context("Invalid schedule")?;
            println!("valid");
        }
        Commands::Windows { date, input } => {
            let snapshot = read_snapshot(input.as_deref())?;
            let windows = snapshot
                .windows(date)
                .with_context(|| format!("Failed to resolve windows for {}", date))?;
            println!("{}", serde_json::to_string_pretty(&windows)?);
        }
        Commands::Slots {
            date,
            input,
            output,
            step,
        } => {
            let mut config = config;
            if let Some(step) = step {
                config.default_step_minutes = step;
            }

            let snapshot = read_snapshot(input.as_deref())?;
            let slots = snapshot
                .slots(date, &config)
                .with_context(|| format!("Failed to compute slots for {}", date))?;
            info!(%date, count = slots.len(), "slots computed");

            write_output(output.as_deref(), &serde_json::to_string_pretty(&slots)?)?;
        }
        Commands::DefaultSchedule => {
            let schedule = ProviderSchedule::new(WeeklyTemplate::business_hours());
            println!("{}", serde_json::to_string_pretty(&schedule)?);
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays machine-readable.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{}': {}", s, e))
}

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            EngineConfig::from_json(&json)
                .with_context(|| format!("Failed to parse config file: {}", path))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn read_snapshot(path: Option<&str>) -> Result<Snapshot> {
    let json = read_input(path)?;
    Snapshot::from_json(&json).context("Failed to parse snapshot JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
