//! Terminal rendering of query results.

use bikeshare_analytics::describe_duration;
use bikeshare_analytics_models::{DailyCount, StationUsage, TripSummary};
use bikeshare_ingest::CleanStats;
use serde::Serialize;

type Result = std::result::Result<(), Box<dyn std::error::Error>>;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_stats(stats: &CleanStats) {
    println!("Input rows:           {}", stats.input_rows);
    println!("Bad time intervals:   {}", stats.invalid_interval_rows);
    println!("Incomplete rows:      {}", stats.incomplete_rows);
    println!("Inconsistent flags:   {}", stats.inconsistent_flags);
    println!("Output rows:          {}", stats.output_rows);
}

pub fn print_daily(counts: &[DailyCount], json: bool) -> Result {
    if json {
        return print_json(counts);
    }

    println!("{:<12} TRIPS", "DATE");
    println!("{}", "-".repeat(20));
    for count in counts {
        println!("{:<12} {}", count.date, count.trips);
    }
    Ok(())
}

pub fn print_summary(summary: &TripSummary, json: bool) -> Result {
    if json {
        return print_json(summary);
    }

    let or_dash = |value: Option<&str>| value.unwrap_or("-").to_owned();

    println!("Trips:                        {}", summary.trips);
    println!(
        "Median duration:              {}",
        summary
            .median_duration
            .map_or_else(|| "-".to_owned(), describe_duration)
    );
    println!(
        "Median distance:              {}",
        summary
            .median_distance_km
            .map_or_else(|| "-".to_owned(), |km| format!("{km:.1} km"))
    );
    println!(
        "Most popular start district:  {}",
        or_dash(summary.popular_start_district.as_deref())
    );
    println!(
        "Most popular end district:    {}",
        or_dash(summary.popular_end_district.as_deref())
    );
    println!(
        "Station rentals in/out city:  {} / {}",
        summary.station_rentals.inside, summary.station_rentals.outside
    );
    println!(
        "Station returns in/out city:  {} / {}",
        summary.station_returns.inside, summary.station_returns.outside
    );
    Ok(())
}

pub fn print_stations(usage: &[StationUsage], json: bool) -> Result {
    if json {
        return print_json(usage);
    }

    println!("{:<40} {:>8} {:>8} {:>8}", "STATION", "RENTALS", "RETURNS", "TOTAL");
    println!("{}", "-".repeat(67));
    for station in usage {
        println!(
            "{:<40} {:>8} {:>8} {:>8}",
            station.name,
            station.rentals,
            station.returns,
            station.total()
        );
    }
    Ok(())
}
