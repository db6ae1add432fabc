//! GPX ingestion
//!
//! Replays recorded GPX tracks into a store as if they had come from the position sensor.
//! Files are parsed in parallel but inserted one after another in the given order, so
//! the ids of each file's samples stay contiguous.

use crate::sample::Fix;
use crate::{Result, SampleStore, utils};
use rayon::prelude::*;
use std::path::Path;

/// Outcome of an import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportSummary {
    /// Number of files read
    pub files: usize,
    /// Number of samples inserted
    pub imported: usize,
    /// Track points skipped because they carry no timestamp
    pub skipped_untimed: usize,
    /// Track points skipped because their coordinates are out of range
    pub skipped_invalid: usize,
}

impl ImportSummary {
    fn absorb(&mut self, other: ImportSummary) {
        self.files += other.files;
        self.imported += other.imported;
        self.skipped_untimed += other.skipped_untimed;
        self.skipped_invalid += other.skipped_invalid;
    }
}

/// Extract fixes from every track point, in document order
///
/// Returns the fixes together with a summary whose `imported` field counts them.
pub fn fixes_from_gpx(gpx: &gpx::Gpx) -> (Vec<Fix>, ImportSummary) {
    let mut fixes = Vec::new();
    let mut summary = ImportSummary::default();

    let waypoints = gpx
        .tracks
        .iter()
        .flat_map(|track| &track.segments)
        .flat_map(|segment| &segment.points);

    for waypoint in waypoints {
        let point = waypoint.point();
        let (latitude, longitude) = (point.y(), point.x());

        let Some(time) = waypoint.time.as_ref() else {
            summary.skipped_untimed += 1;
            continue;
        };

        if !utils::is_valid_wgs84(latitude, longitude) {
            tracing::warn!(
                "Skipping track point outside WGS84 bounds: ({}, {})",
                latitude,
                longitude
            );
            summary.skipped_invalid += 1;
            continue;
        }

        let timestamp_ms =
            (time::OffsetDateTime::from(time.clone()).unix_timestamp_nanos() / 1_000_000) as i64;
        fixes.push(Fix::at(latitude, longitude, timestamp_ms));
    }

    if summary.skipped_untimed > 0 {
        tracing::warn!(
            "Skipped {} track points without a timestamp",
            summary.skipped_untimed
        );
    }

    summary.imported = fixes.len();
    (fixes, summary)
}

/// Read and parse one GPX file
pub fn read_gpx_file(path: impl AsRef<Path>) -> Result<(Vec<Fix>, ImportSummary)> {
    let file = std::fs::File::open(path.as_ref())?;
    let reader = std::io::BufReader::new(file);
    let gpx = gpx::read(reader)?;

    let (fixes, mut summary) = fixes_from_gpx(&gpx);
    summary.files = 1;
    tracing::debug!(
        "Parsed {} fixes from {}",
        fixes.len(),
        path.as_ref().display()
    );
    Ok((fixes, summary))
}

/// Import GPX files into `store`
///
/// All files are parsed before anything is written: a parse error leaves the store
/// untouched. Each file is then inserted with [`SampleStore::insert_many`].
pub fn import_files<S, P>(store: &S, paths: &[P]) -> Result<ImportSummary>
where
    S: SampleStore + ?Sized,
    P: AsRef<Path> + Sync,
{
    #[cfg(feature = "profiling")]
    profiling::scope!("import::import_files");

    let parsed: Result<Vec<(Vec<Fix>, ImportSummary)>> =
        paths.par_iter().map(|path| read_gpx_file(path)).collect();

    let mut total = ImportSummary::default();
    for (fixes, summary) in parsed? {
        store.insert_many(&fixes)?;
        total.absorb(summary);
    }

    tracing::info!(
        "Imported {} samples from {} files",
        total.imported,
        total.files
    );
    Ok(total)
}
