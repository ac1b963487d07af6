//! On-disk sources: the trip-metadata CSV, the per-vehicle trail directory,
//! and the raw-dump archive.
//!
//! Every read happens fresh per report request; nothing is cached across
//! calls.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::parser::{self, TrailRecord, TripRecord};

/// Reads and parses the trip-metadata CSV.
pub fn read_trip_info(path: &Path) -> Result<Vec<TripRecord>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let trips = parser::parse_trip_info(file)
        .with_context(|| format!("malformed trip metadata in {}", path.display()))?;

    debug!(path = %path.display(), trips = trips.len(), "Trip metadata loaded");
    Ok(trips)
}

/// Reads every `*.csv` file in `dir` as one vehicle's trail, keyed by file
/// stem. Non-CSV entries are ignored. The returned map iterates vehicles in
/// ascending id order.
pub fn read_vehicle_trails(dir: &Path) -> Result<BTreeMap<String, Vec<TrailRecord>>> {
    let mut trails = BTreeMap::new();

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read trail directory {}", dir.display()))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }

        let vehicle = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => continue,
        };

        let file =
            File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
        let records = parser::parse_trail(file)
            .with_context(|| format!("malformed trail in {}", path.display()))?;

        debug!(vehicle = %vehicle, records = records.len(), "Vehicle trail loaded");
        trails.insert(vehicle, records);
    }

    info!(vehicles = trails.len(), "Vehicle trails loaded");
    Ok(trails)
}

/// Extracts the zip archive of per-vehicle trail CSVs into `dest`, creating
/// the directory if needed.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    let file =
        File::open(archive).with_context(|| format!("failed to open {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("failed to read archive {}", archive.display()))?;

    std::fs::create_dir_all(dest).with_context(|| format!("failed to create {}", dest.display()))?;
    zip.extract(dest).with_context(|| {
        format!(
            "failed to extract {} into {}",
            archive.display(),
            dest.display()
        )
    })?;

    info!(archive = %archive.display(), dest = %dest.display(), files = zip.len(), "Archive extracted");
    Ok(())
}
