//! The one-shot report pipeline: read both sources, filter to the window,
//! aggregate.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::filter::{self, TimeWindow};
use crate::metrics::{self, MissingTripPolicy, ReportRow};
use crate::storage;

/// Where the raw data lives and how the trip join behaves.
///
/// Passed explicitly to [`generate_report`]; the library carries no
/// ambient path defaults.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub trip_info: PathBuf,
    pub trail_dir: PathBuf,
    pub missing_trip_policy: MissingTripPolicy,
}

/// Outcome of one report request: rows, or a valid empty result.
///
/// An empty window is an expected state, kept apart from the error channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Report(Vec<ReportRow>),
    NoData,
}

/// Runs one report request over `window`.
///
/// Both sources are read fresh and borrowed only for the duration of the
/// call; nothing is cached between requests. Returns
/// [`ReportOutcome::NoData`] when no trail record or no trip record falls
/// inside the window.
#[tracing::instrument(
    skip(config),
    fields(trip_info = %config.trip_info.display(), trail_dir = %config.trail_dir.display())
)]
pub fn generate_report(config: &ReportConfig, window: TimeWindow) -> Result<ReportOutcome> {
    let trips = storage::read_trip_info(&config.trip_info)?;
    let trails = storage::read_vehicle_trails(&config.trail_dir)?;

    debug!(
        vehicles = trails.len(),
        trips = trips.len(),
        start = %window.start,
        end = %window.end,
        "Raw data loaded"
    );

    let filtered_trails = filter::filter_trails(&trails, window);
    let filtered_trips = filter::filter_trips(&trips, window);

    if filtered_trails.is_empty() || filtered_trips.is_empty() {
        info!(
            vehicles = filtered_trails.len(),
            trips = filtered_trips.len(),
            "No data inside the requested window"
        );
        return Ok(ReportOutcome::NoData);
    }

    let rows = metrics::compute_metrics(
        &filtered_trails,
        &filtered_trips,
        config.missing_trip_policy,
    )?;
    info!(rows = rows.len(), "Report computed");

    Ok(ReportOutcome::Report(rows))
}
