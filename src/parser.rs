//! CSV decoding of the raw trail and trip-metadata sources.
//!
//! Raw rows are deserialized by header name, so sources may carry extra
//! columns. Timestamps are normalized to `DateTime<Utc>` here, once, which
//! keeps the downstream filters pure over typed records.

use std::io::Read;

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::ReportError;
use crate::geo::GeoPoint;

/// Fixed-width format of the trip-metadata `date_time` column.
const TRIP_DATE_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// One GPS sample from a vehicle's trail log.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailRecord {
    pub timestamp: DateTime<Utc>,
    pub position: GeoPoint,
    pub speed: f64,
    pub license_plate: String,
    pub speed_violation: bool,
}

/// One completed-trip entry from the trip-metadata table.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub vehicle_number: String,
    pub date_time: DateTime<Utc>,
    pub transporter_name: String,
}

/// A trail row as it appears on disk.
#[derive(Debug, Deserialize)]
struct RawTrailRow {
    tis: i64,
    lat: f64,
    lon: f64,
    spd: f64,
    lic_plate_no: String,
    osf: u8,
}

/// A trip-metadata row as it appears on disk.
#[derive(Debug, Deserialize)]
struct RawTripRow {
    vehicle_number: String,
    date_time: String,
    transporter_name: String,
}

/// Decodes one vehicle's trail CSV, preserving row order.
///
/// # Errors
///
/// Returns an error on malformed cells or a `tis` value outside the
/// representable instant range. Any failure abandons the whole source.
pub fn parse_trail<R: Read>(reader: R) -> Result<Vec<TrailRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for row in rdr.deserialize() {
        let raw: RawTrailRow = row?;
        let timestamp = DateTime::from_timestamp(raw.tis, 0)
            .ok_or(ReportError::TrailTimestamp { seconds: raw.tis })?;

        records.push(TrailRecord {
            timestamp,
            position: GeoPoint::new(raw.lat, raw.lon),
            speed: raw.spd,
            license_plate: raw.lic_plate_no,
            speed_violation: raw.osf != 0,
        });
    }

    Ok(records)
}

/// Decodes the trip-metadata CSV, preserving row order.
///
/// # Errors
///
/// Returns an error on malformed cells or any `date_time` that does not
/// parse as `YYYYMMDDHHMMSS`.
pub fn parse_trip_info<R: Read>(reader: R) -> Result<Vec<TripRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut trips = Vec::new();

    for row in rdr.deserialize() {
        let raw: RawTripRow = row?;
        let date_time = parse_trip_date_time(&raw.date_time)?;

        trips.push(TripRecord {
            vehicle_number: raw.vehicle_number,
            date_time,
            transporter_name: raw.transporter_name,
        });
    }

    Ok(trips)
}

/// Parses a `YYYYMMDDHHMMSS` string, interpreted as UTC.
fn parse_trip_date_time(value: &str) -> Result<DateTime<Utc>, ReportError> {
    NaiveDateTime::parse_from_str(value, TRIP_DATE_TIME_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|source| ReportError::TripDateTime {
            value: value.to_string(),
            source,
        })
}
