//! Pipeline orchestrator.

use bikeshare_spatial::{EndpointClass, classify_endpoints};
use bikeshare_trip_models::{Column, RawTable, TripRecord};

use crate::PipelineError;
use crate::config::PipelineConfig;
use crate::coordinates::validate_coordinates;
use crate::draft::{CompleteTrip, ResolvedDraft, check_required_columns, drafts_from_table};
use crate::normalize::normalize_text;
use crate::station_flag::{count_inconsistencies, normalize_flags, resolve_flags};
use crate::temporal::{compute_durations, retain_valid_intervals};

/// Row counts collected during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    /// Rows in the raw input.
    pub input_rows: usize,
    /// Rows removed for a missing or reversed time interval.
    pub invalid_interval_rows: usize,
    /// Rows removed by the null sweep.
    pub incomplete_rows: usize,
    /// Rows in the canonical output.
    pub output_rows: usize,
    /// Endpoints whose station flag disagrees with the station name.
    pub inconsistent_flags: usize,
}

/// Output of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanReport {
    /// Canonical trips, in input order.
    pub trips: Vec<TripRecord>,
    pub stats: CleanStats,
}

/// Runs the cleaning stages over a raw table.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Cleans `table` into canonical trip records.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingColumn`] if a required column is not
    /// present. No other condition aborts the run.
    pub fn run(&self, table: RawTable) -> Result<CleanReport, PipelineError> {
        check_required_columns(&table)?;

        let mut stats = CleanStats {
            input_rows: table.len(),
            ..CleanStats::default()
        };
        log::debug!("Cleaning {} raw trips", stats.input_rows);

        // 1. station names
        let table = table
            .map_column(Column::RentalStationName.as_ref(), normalize_text)
            .map_column(Column::ReturnStationName.as_ref(), normalize_text);

        // 2. administrative columns
        let table = table.drop_columns(&self.config.dropped_columns);
        log::debug!("Dropped columns {:?}", self.config.dropped_columns);

        // 3. coordinates
        let drafts = drafts_from_table(table)?;
        let drafts = validate_coordinates(drafts, &self.config.bounds);
        log::debug!("Validated coordinates of {} trips", drafts.len());

        // 4. station flags
        let drafts = normalize_flags(drafts);
        stats.inconsistent_flags = count_inconsistencies(&drafts);
        if stats.inconsistent_flags > 0 {
            log::debug!(
                "{} station flags disagree with their station name, keeping them as-is",
                stats.inconsistent_flags
            );
        }
        let drafts = resolve_flags(drafts);

        // 5. durations
        let drafts = compute_durations(drafts);

        // 6. time intervals
        let before = drafts.len();
        let drafts = retain_valid_intervals(drafts);
        stats.invalid_interval_rows = before - drafts.len();

        // 7. null sweep
        let before = drafts.len();
        let trips: Vec<CompleteTrip> = drafts
            .into_iter()
            .filter_map(ResolvedDraft::into_complete)
            .collect();
        stats.incomplete_rows = before - trips.len();
        log::debug!("Dropped {} incomplete trips", stats.incomplete_rows);

        // 8. spatial classification
        let trips = self.classify(trips);
        stats.output_rows = trips.len();

        log::info!(
            "Cleaned {} of {} trips ({} bad intervals, {} incomplete)",
            stats.output_rows,
            stats.input_rows,
            stats.invalid_interval_rows,
            stats.incomplete_rows,
        );

        Ok(CleanReport { trips, stats })
    }

    /// Assigns districts and city membership to both endpoints of each trip.
    fn classify(&self, trips: Vec<CompleteTrip>) -> Vec<TripRecord> {
        let points = trips.iter().flat_map(|trip| {
            [
                (Some(trip.start.lat), Some(trip.start.lon)),
                (Some(trip.end.lat), Some(trip.end.lon)),
            ]
        });
        let classes = classify_endpoints(&self.config.districts, &self.config.core_area, points);
        log::debug!("Classified {} trip endpoints", classes.len());

        let mut classes = classes.into_iter();
        trips
            .into_iter()
            .map(|trip| {
                let start = classes.next().unwrap_or_default();
                let end = classes.next().unwrap_or_default();
                into_record(trip, start, end)
            })
            .collect()
    }
}

fn into_record(trip: CompleteTrip, start: EndpointClass, end: EndpointClass) -> TripRecord {
    TripRecord {
        start_time: trip.start_time,
        end_time: trip.end_time,
        duration: trip.duration,
        start_lat: trip.start.lat,
        start_lon: trip.start.lon,
        end_lat: trip.end.lat,
        end_lon: trip.end.lon,
        rental_station_name: trip.start.station_name,
        return_station_name: trip.end.station_name,
        rental_is_station: trip.start.is_station,
        return_is_station: trip.end.is_station,
        rental_is_city: start.in_city,
        return_is_city: end.in_city,
        start_district: start.district,
        end_district: end.district,
    }
}

#[cfg(test)]
mod tests {
    use bikeshare_spatial::{DistrictIndex, ServiceArea};
    use bikeshare_trip_models::RawValue;
    use chrono::{NaiveDateTime, TimeDelta};

    use super::*;

    const HEADER: &[&str] = &[
        "Row",
        "STARTTIME",
        "ENDTIME",
        "STARTLAT",
        "STARTLON",
        "ENDLAT",
        "ENDLON",
        "RENTAL_STATION_NAME",
        "RETURN_STATION_NAME",
        "RENTAL_IS_STATION",
        "RETURN_IS_STATION",
    ];

    fn polygon(name: &str, min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> String {
        format!(
            r#"{{"type":"Feature","properties":{{"name":"{name}"}},"geometry":{{"type":"Polygon","coordinates":[[[{min_lon},{min_lat}],[{max_lon},{min_lat}],[{max_lon},{max_lat}],[{min_lon},{max_lat}],[{min_lon},{min_lat}]]]}}}}"#
        )
    }

    fn collection(features: &[String]) -> String {
        format!(
            r#"{{"type":"FeatureCollection","features":[{}]}}"#,
            features.join(",")
        )
    }

    fn pipeline() -> Pipeline {
        let districts = DistrictIndex::from_geojson_str(
            &collection(&[
                polygon("Altstadt", 11.45, 48.05, 11.55, 48.15),
                polygon("Maxvorstadt", 11.55, 48.05, 11.65, 48.25),
            ]),
            "name",
        )
        .unwrap();
        let core_area =
            ServiceArea::from_geojson_str(&collection(&[polygon("city", 11.45, 48.05, 11.58, 48.25)]))
                .unwrap();
        Pipeline::new(PipelineConfig::new(core_area, districts))
    }

    fn raw(rows: &[&[&str]]) -> RawTable {
        let mut table = RawTable::new(HEADER);
        for row in rows {
            table.push_row(row.iter().map(|c| RawValue::from(*c)).collect());
        }
        table
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    const TRIP_A: &[&str] = &[
        "0",
        "2023-01-01 08:00",
        "2023-01-01 08:20",
        "48,1",
        "11,5",
        "48,2",
        "11,6",
        "",
        "",
        "",
        "",
    ];

    const TRIP_B: &[&str] = &[
        "1",
        "2023-01-01 09:00",
        "2023-01-01 08:00",
        "48,1",
        "11,5",
        "48,2",
        "11,6",
        "",
        "",
        "",
        "",
    ];

    #[test]
    fn cleans_valid_trip_and_drops_reversed_one() {
        let report = pipeline().run(raw(&[TRIP_A, TRIP_B])).unwrap();

        assert_eq!(report.trips.len(), 1);
        let trip = &report.trips[0];
        assert_eq!(trip.start_time, ts("2023-01-01 08:00:00"));
        assert_eq!(trip.end_time, ts("2023-01-01 08:20:00"));
        assert_eq!(trip.duration, TimeDelta::minutes(20));
        assert!((trip.start_lat - 48.1).abs() < 1e-9);
        assert!((trip.end_lon - 11.6).abs() < 1e-9);
        assert!(!trip.rental_is_station);
        assert!(!trip.return_is_station);
        assert_eq!(trip.start_district.as_deref(), Some("Altstadt"));
        assert_eq!(trip.end_district.as_deref(), Some("Maxvorstadt"));
        assert!(trip.rental_is_city);
        assert!(!trip.return_is_city);

        assert_eq!(
            report.stats,
            CleanStats {
                input_rows: 2,
                invalid_interval_rows: 1,
                incomplete_rows: 0,
                output_rows: 1,
                inconsistent_flags: 0,
            }
        );
    }

    #[test]
    fn infers_missing_flags_from_station_names() {
        let row: &[&str] = &[
            "0",
            "2023-01-01 08:00",
            "2023-01-01 08:20",
            "48,1",
            "11,5",
            "48,2",
            "11,6",
            "  Marienplatz ",
            "",
            "",
            "",
        ];
        let report = pipeline().run(raw(&[row])).unwrap();
        let trip = &report.trips[0];
        assert_eq!(trip.rental_station_name, "Marienplatz");
        assert!(trip.rental_is_station);
        assert_eq!(trip.return_station_name, "");
        assert!(!trip.return_is_station);
    }

    #[test]
    fn keeps_inconsistent_flags_and_counts_them() {
        let row: &[&str] = &[
            "0",
            "2023-01-01 08:00",
            "2023-01-01 08:20",
            "48,1",
            "11,5",
            "48,2",
            "11,6",
            "",
            "Stachus",
            "1",
            "0",
        ];
        let report = pipeline().run(raw(&[row])).unwrap();
        let trip = &report.trips[0];
        assert!(trip.rental_is_station);
        assert!(!trip.return_is_station);
        assert_eq!(report.stats.inconsistent_flags, 2);
    }

    #[test]
    fn sweeps_rows_with_missing_coordinates() {
        let out_of_range: &[&str] = &[
            "0",
            "2023-01-01 08:00",
            "2023-01-01 08:20",
            "47,79",
            "11,5",
            "48,2",
            "11,6",
            "",
            "",
            "",
            "",
        ];
        let unparseable: &[&str] = &[
            "1",
            "2023-01-01 08:00",
            "2023-01-01 08:20",
            "48,1",
            "abc",
            "48,2",
            "11,6",
            "",
            "",
            "",
            "",
        ];
        let report = pipeline()
            .run(raw(&[TRIP_A, out_of_range, unparseable]))
            .unwrap();
        assert_eq!(report.trips.len(), 1);
        assert_eq!(report.stats.incomplete_rows, 2);
        assert_eq!(report.stats.invalid_interval_rows, 0);
    }

    #[test]
    fn outputs_satisfy_record_invariants() {
        let missing_end: &[&str] = &[
            "2", "2023-01-01 08:00", "", "48,1", "11,5", "48,2", "11,6", "", "", "", "",
        ];
        let same_instant: &[&str] = &[
            "3",
            "2023-01-01 08:00",
            "2023-01-01 08:00",
            "48,1",
            "11,5",
            "48,1",
            "11,5",
            "Odeonsplatz",
            "Odeonsplatz",
            "1",
            "",
        ];
        let report = pipeline()
            .run(raw(&[TRIP_A, TRIP_B, missing_end, same_instant]))
            .unwrap();
        assert_eq!(report.trips.len(), 2);
        for trip in &report.trips {
            assert!(trip.end_time >= trip.start_time);
            assert_eq!(trip.duration, trip.end_time - trip.start_time);
            assert!(trip.duration >= TimeDelta::zero());
        }
        assert_eq!(report.trips[1].duration, TimeDelta::zero());
        assert!(report.trips[1].return_is_station);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let pipeline = pipeline();
        let station_row: &[&str] = &[
            "5",
            "2023-03-04 17:45:10",
            "2023-03-04 18:05:00",
            "48,14",
            "11,56",
            "48,16",
            "11,57",
            "Marienplatz",
            "",
            "",
            "0",
        ];
        let first = pipeline.run(raw(&[TRIP_A, TRIP_B, station_row])).unwrap();
        let second = pipeline.run(RawTable::from_trips(&first.trips)).unwrap();

        assert_eq!(second.trips, first.trips);
        assert_eq!(second.stats.invalid_interval_rows, 0);
        assert_eq!(second.stats.incomplete_rows, 0);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let table = raw(&[TRIP_A]).drop_columns(&["RETURN_IS_STATION"]);
        let err = pipeline().run(table).unwrap_err();
        assert_eq!(err.to_string(), "Missing required column: RETURN_IS_STATION");
    }

    #[test]
    fn index_column_is_optional() {
        let table = raw(&[TRIP_A]).drop_columns(&["Row"]);
        let report = pipeline().run(table).unwrap();
        assert_eq!(report.trips.len(), 1);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let report = pipeline().run(RawTable::new(HEADER)).unwrap();
        assert!(report.trips.is_empty());
        assert_eq!(report.stats, CleanStats::default());
    }
}
