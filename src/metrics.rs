//! Per-vehicle metrics aggregation: the join between filtered trails and
//! filtered trip metadata.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;
use tracing::warn;

use crate::error::ReportError;
use crate::geo::{self, GeoPoint};
use crate::parser::{TrailRecord, TripRecord};

/// One output row of the usage report.
///
/// Field order is the report column order; the serde renames reproduce the
/// exact report headers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "License plate number")]
    pub license_plate: String,
    #[serde(rename = "Distance")]
    pub distance_km: f64,
    #[serde(rename = "Number of Trips Completed")]
    pub trip_count: usize,
    #[serde(rename = "Average Speed")]
    pub avg_speed: f64,
    #[serde(rename = "Transporter Name")]
    pub transporter_name: String,
    #[serde(rename = "Number of Speed Violations")]
    pub violation_count: usize,
}

/// What to do with a vehicle whose representative plate has no trip-metadata
/// match. `Fail` aborts the whole request; `Skip` drops that vehicle's row
/// and keeps the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingTripPolicy {
    #[default]
    Fail,
    Skip,
}

/// Joins filtered trails with filtered trip metadata and produces one row
/// per vehicle with a non-empty trail, in ascending vehicle-id order.
///
/// Per vehicle: distance is the haversine sum over consecutive records,
/// average speed the arithmetic mean of `speed`, the join key the license
/// plate of the first record, trip count the number of matching trip
/// entries, and the transporter the first matching trip's name.
///
/// # Errors
///
/// Under [`MissingTripPolicy::Fail`], a vehicle without any matching trip
/// aborts the request with [`ReportError::NoMatchingTrip`].
pub fn compute_metrics(
    trails: &BTreeMap<String, Vec<TrailRecord>>,
    trips: &[TripRecord],
    policy: MissingTripPolicy,
) -> Result<Vec<ReportRow>> {
    let mut rows = Vec::with_capacity(trails.len());

    for (vehicle, records) in trails {
        // filter_trails never emits empty vehicles
        let Some(first) = records.first() else {
            continue;
        };
        let plate = &first.license_plate;

        let positions: Vec<GeoPoint> = records.iter().map(|r| r.position).collect();
        let distance_km = geo::path_distance_km(&positions);

        let speeds: Vec<f64> = records.iter().map(|r| r.speed).collect();
        let avg_speed = mean(&speeds);

        let violation_count = records.iter().filter(|r| r.speed_violation).count();

        let matching: Vec<&TripRecord> = trips
            .iter()
            .filter(|t| &t.vehicle_number == plate)
            .collect();
        let trip_count = matching.len();

        let transporter_name = match matching.first() {
            Some(trip) => trip.transporter_name.clone(),
            None => match policy {
                MissingTripPolicy::Fail => {
                    return Err(ReportError::NoMatchingTrip {
                        plate: plate.clone(),
                    }
                    .into());
                }
                MissingTripPolicy::Skip => {
                    warn!(vehicle = %vehicle, plate = %plate, "no trip metadata for vehicle, skipping");
                    continue;
                }
            },
        };

        rows.push(ReportRow {
            license_plate: plate.clone(),
            distance_km,
            trip_count,
            avg_speed,
            transporter_name,
            violation_count,
        });
    }

    Ok(rows)
}

/// Arithmetic mean. Returns 0.0 for empty input.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;
    use chrono::DateTime;

    fn record(plate: &str, seconds: i64, lat: f64, lon: f64, speed: f64, osf: bool) -> TrailRecord {
        TrailRecord {
            timestamp: DateTime::from_timestamp(seconds, 0).unwrap(),
            position: GeoPoint::new(lat, lon),
            speed,
            license_plate: plate.to_string(),
            speed_violation: osf,
        }
    }

    fn trip(vehicle: &str, transporter: &str) -> TripRecord {
        TripRecord {
            vehicle_number: vehicle.to_string(),
            date_time: DateTime::from_timestamp(1490000000, 0).unwrap(),
            transporter_name: transporter.to_string(),
        }
    }

    fn trails_of(entries: Vec<(&str, Vec<TrailRecord>)>) -> BTreeMap<String, Vec<TrailRecord>> {
        entries
            .into_iter()
            .map(|(vehicle, records)| (vehicle.to_string(), records))
            .collect()
    }

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_mean_of_values() {
        assert_eq!(mean(&[10.0, 20.0, 30.0]), 20.0);
    }

    #[test]
    fn test_single_record_trail_has_zero_distance() {
        let trails = trails_of(vec![(
            "veh_a",
            vec![record("MH12AB1234", 100, 28.6, 77.2, 40.0, true)],
        )]);
        let trips = vec![trip("MH12AB1234", "Acme")];

        let rows = compute_metrics(&trails, &trips, MissingTripPolicy::Fail).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].distance_km, 0.0);
        assert_eq!(rows[0].avg_speed, 40.0);
        assert_eq!(rows[0].violation_count, 1);
    }

    #[test]
    fn test_three_point_trail_produces_full_row() {
        let trails = trails_of(vec![(
            "veh_a",
            vec![
                record("MH12AB1234", 100, 0.0, 0.0, 10.0, false),
                record("MH12AB1234", 200, 0.0, 1.0, 20.0, true),
                record("MH12AB1234", 300, 0.0, 2.0, 30.0, false),
            ],
        )]);
        let trips = vec![trip("MH12AB1234", "Acme"), trip("MH12AB1234", "Acme")];

        let rows = compute_metrics(&trails, &trips, MissingTripPolicy::Fail).unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.license_plate, "MH12AB1234");
        assert_float_absolute_eq!(row.distance_km, 222.4, 0.5);
        assert_eq!(row.trip_count, 2);
        assert_eq!(row.avg_speed, 20.0);
        assert_eq!(row.transporter_name, "Acme");
        assert_eq!(row.violation_count, 1);
    }

    #[test]
    fn test_rows_follow_ascending_vehicle_id() {
        let trails = trails_of(vec![
            ("veh_b", vec![record("PLATE_B", 100, 0.0, 0.0, 10.0, false)]),
            ("veh_a", vec![record("PLATE_A", 100, 0.0, 0.0, 10.0, false)]),
        ]);
        let trips = vec![trip("PLATE_A", "Acme"), trip("PLATE_B", "Globex")];

        let rows = compute_metrics(&trails, &trips, MissingTripPolicy::Fail).unwrap();

        let plates: Vec<&str> = rows.iter().map(|r| r.license_plate.as_str()).collect();
        assert_eq!(plates, vec!["PLATE_A", "PLATE_B"]);
    }

    #[test]
    fn test_join_key_is_first_record_plate() {
        // A trail whose later records carry a different plate still joins on
        // the first record's plate.
        let trails = trails_of(vec![(
            "veh_a",
            vec![
                record("PLATE_A", 100, 0.0, 0.0, 10.0, false),
                record("PLATE_B", 200, 0.0, 1.0, 20.0, false),
            ],
        )]);
        let trips = vec![
            trip("PLATE_A", "Acme"),
            trip("PLATE_B", "Globex"),
            trip("PLATE_B", "Globex"),
        ];

        let rows = compute_metrics(&trails, &trips, MissingTripPolicy::Fail).unwrap();

        assert_eq!(rows[0].license_plate, "PLATE_A");
        assert_eq!(rows[0].trip_count, 1);
        assert_eq!(rows[0].transporter_name, "Acme");
    }

    #[test]
    fn test_transporter_comes_from_first_matching_trip() {
        let trails = trails_of(vec![(
            "veh_a",
            vec![record("PLATE_A", 100, 0.0, 0.0, 10.0, false)],
        )]);
        let trips = vec![trip("PLATE_A", "Acme"), trip("PLATE_A", "Globex")];

        let rows = compute_metrics(&trails, &trips, MissingTripPolicy::Fail).unwrap();

        assert_eq!(rows[0].trip_count, 2);
        assert_eq!(rows[0].transporter_name, "Acme");
    }

    #[test]
    fn test_missing_trip_fails_request_by_default() {
        let trails = trails_of(vec![(
            "veh_a",
            vec![record("PLATE_A", 100, 0.0, 0.0, 10.0, false)],
        )]);

        let err = compute_metrics(&trails, &[], MissingTripPolicy::Fail).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::NoMatchingTrip { plate }) if plate == "PLATE_A"
        ));
    }

    #[test]
    fn test_missing_trip_skip_drops_only_unmatched_vehicle() {
        let trails = trails_of(vec![
            ("veh_a", vec![record("PLATE_A", 100, 0.0, 0.0, 10.0, false)]),
            ("veh_b", vec![record("PLATE_B", 100, 0.0, 0.0, 10.0, false)]),
        ]);
        let trips = vec![trip("PLATE_B", "Globex")];

        let rows = compute_metrics(&trails, &trips, MissingTripPolicy::Skip).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].license_plate, "PLATE_B");
    }

    #[test]
    fn test_row_count_never_exceeds_vehicle_count() {
        let trails = trails_of(vec![
            (
                "veh_a",
                vec![
                    record("PLATE_A", 100, 0.0, 0.0, 10.0, false),
                    record("PLATE_A", 200, 0.0, 1.0, 20.0, false),
                ],
            ),
            ("veh_b", vec![record("PLATE_B", 100, 0.0, 0.0, 10.0, false)]),
        ]);
        let trips = vec![trip("PLATE_A", "Acme"), trip("PLATE_B", "Globex")];

        let rows = compute_metrics(&trails, &trips, MissingTripPolicy::Fail).unwrap();

        assert_eq!(rows.len(), trails.len());
    }
}
