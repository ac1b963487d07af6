//! Time-window filtering of trail and trip records.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::error::ReportError;
use crate::parser::{TrailRecord, TripRecord};

/// An inclusive time window over both raw data sources.
///
/// `start <= end` is expected but not validated; an inverted window simply
/// matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Builds a window from two epoch-second bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound is outside the representable
    /// instant range.
    pub fn from_epoch(start: i64, end: i64) -> Result<Self> {
        let start = DateTime::from_timestamp(start, 0)
            .ok_or(ReportError::WindowBound { seconds: start })?;
        let end =
            DateTime::from_timestamp(end, 0).ok_or(ReportError::WindowBound { seconds: end })?;
        Ok(Self { start, end })
    }

    /// Whether `t` lies inside the window, both ends inclusive.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Keeps the records whose timestamps fall inside `window`, preserving
/// relative order. The input is never mutated.
pub fn filter_trail(records: &[TrailRecord], window: TimeWindow) -> Vec<TrailRecord> {
    records
        .iter()
        .filter(|r| window.contains(r.timestamp))
        .cloned()
        .collect()
}

/// Applies [`filter_trail`] to every vehicle and drops vehicles left with no
/// in-window records; those contribute no report row. Ascending vehicle-id
/// order is preserved.
pub fn filter_trails(
    trails: &BTreeMap<String, Vec<TrailRecord>>,
    window: TimeWindow,
) -> BTreeMap<String, Vec<TrailRecord>> {
    trails
        .iter()
        .filter_map(|(vehicle, records)| {
            let kept = filter_trail(records, window);
            if kept.is_empty() {
                None
            } else {
                Some((vehicle.clone(), kept))
            }
        })
        .collect()
}

/// Keeps the trips whose `date_time` falls inside `window`, preserving
/// relative order.
pub fn filter_trips(trips: &[TripRecord], window: TimeWindow) -> Vec<TripRecord> {
    trips
        .iter()
        .filter(|t| window.contains(t.date_time))
        .cloned()
        .collect()
}
