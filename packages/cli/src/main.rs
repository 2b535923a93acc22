#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `bikeshare`: clean yearly trip extracts and query the cleaned trips.
//!
//! Uses `indicatif-log-bridge` (via [`bikeshare_cli_utils::init_logger`]) so
//! that log lines and progress bars never fight for the terminal.

mod report;

use std::path::PathBuf;
use std::sync::Arc;

use bikeshare_analytics_models::{DayWindow, END_OF_DAY, MonthSelection};
use bikeshare_cli_utils::{IndicatifProgress, MultiProgress};
use bikeshare_ingest::{CityProfile, OutputFormat, paths};
use bikeshare_trip_models::TripRecord;
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bikeshare", about = "Bike-share trip cleaning and analytics")]
struct Cli {
    /// Directory holding the yearly extracts and geodata files
    #[arg(long, global = true, env = paths::DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Print query results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Which trips to load.
#[derive(Args)]
struct DatasetArgs {
    /// First year to load
    #[arg(long)]
    from: i32,
    /// Last year to load (inclusive)
    #[arg(long)]
    to: i32,
    /// City profile TOML (defaults to the built-in Munich profile)
    #[arg(long)]
    profile: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean the extracts and write the canonical trip table
    Clean {
        #[command(flatten)]
        dataset: DatasetArgs,
        /// Output file (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Output format: csv or json
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
    },
    /// Number of trips per day
    Daily {
        #[command(flatten)]
        dataset: DatasetArgs,
    },
    /// Summarize trips in selected years and months
    Months {
        #[command(flatten)]
        dataset: DatasetArgs,
        /// Comma-separated years, e.g. 2022,2023
        #[arg(long, value_delimiter = ',', required = true)]
        years: Vec<i32>,
        /// Comma-separated months, e.g. 6,7,8
        #[arg(long, value_delimiter = ',', required = true)]
        months: Vec<u32>,
    },
    /// Summarize trips within a window of fewer than seven days
    Days {
        #[command(flatten)]
        dataset: DatasetArgs,
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        first_day: NaiveDate,
        /// Last day (YYYY-MM-DD), inclusive
        #[arg(long)]
        last_day: NaiveDate,
        /// Earliest time of day (HH:MM)
        #[arg(long, value_parser = parse_time_of_day, default_value = "00:00")]
        from_time: NaiveTime,
        /// Latest time of day (HH:MM)
        #[arg(long, value_parser = parse_time_of_day)]
        to_time: Option<NaiveTime>,
    },
    /// Rentals and returns per station
    Stations {
        #[command(flatten)]
        dataset: DatasetArgs,
        /// Show only the busiest N stations
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn parse_time_of_day(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
}

/// Resolves the profile and data directory, then loads the cleaned trips
/// through the shared dataset cache.
fn load(
    multi: &MultiProgress,
    data_dir: &std::path::Path,
    dataset: &DatasetArgs,
) -> Result<Arc<[TripRecord]>, Box<dyn std::error::Error>> {
    let profile = CityProfile::load_or_default(dataset.profile.as_deref())?;
    let progress = IndicatifProgress::files_bar(multi, "Loading trip extracts");
    Ok(bikeshare_ingest::load_dataset(
        &profile,
        data_dir,
        dataset.from,
        dataset.to,
        &progress,
    )?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = bikeshare_cli_utils::init_logger();
    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(paths::data_dir);
    log::debug!("Using data directory {}", data_dir.display());

    match cli.command {
        Commands::Clean {
            dataset,
            output,
            format,
        } => {
            let profile = CityProfile::load_or_default(dataset.profile.as_deref())?;
            let progress = IndicatifProgress::files_bar(&multi, "Loading trip extracts");
            let report = bikeshare_ingest::clean_years(
                &profile,
                &data_dir,
                dataset.from,
                dataset.to,
                &progress,
            )?;

            if let Some(path) = output {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    paths::ensure_dir(parent)?;
                }
                bikeshare_ingest::write_trips_file(&path, format, &report.trips)?;
                report::print_stats(&report.stats);
            } else {
                let stdout = std::io::stdout().lock();
                match format {
                    OutputFormat::Csv => bikeshare_ingest::write_trips_csv(stdout, &report.trips)?,
                    OutputFormat::Json => {
                        bikeshare_ingest::write_trips_json(stdout, &report.trips)?;
                    }
                }
            }
        }
        Commands::Daily { dataset } => {
            let trips = load(&multi, &data_dir, &dataset)?;
            let counts = bikeshare_analytics::daily_counts(&trips);
            report::print_daily(&counts, cli.json)?;
        }
        Commands::Months {
            dataset,
            years,
            months,
        } => {
            let trips = load(&multi, &data_dir, &dataset)?;
            let selected =
                bikeshare_analytics::filter_months(&trips, &MonthSelection { years, months })?;
            report::print_summary(&bikeshare_analytics::summarize(&selected), cli.json)?;
        }
        Commands::Days {
            dataset,
            first_day,
            last_day,
            from_time,
            to_time,
        } => {
            let window = DayWindow {
                first_day,
                last_day,
                from: from_time,
                to: to_time.unwrap_or(END_OF_DAY),
            };
            bikeshare_analytics::filter::validate_window(&window)?;

            let trips = load(&multi, &data_dir, &dataset)?;
            let selected = bikeshare_analytics::filter_days(&trips, &window)?;
            report::print_summary(&bikeshare_analytics::summarize(&selected), cli.json)?;
        }
        Commands::Stations { dataset, limit } => {
            let trips = load(&multi, &data_dir, &dataset)?;
            let mut usage = bikeshare_analytics::station_usage(&trips);
            if let Some(limit) = limit {
                usage.truncate(limit);
            }
            report::print_stations(&usage, cli.json)?;
        }
    }

    Ok(())
}
