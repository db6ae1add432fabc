//! Sample storage
//!
//! The [`SampleStore`] trait is the only seam between the recording logic and the storage
//! medium. Two implementations are provided:
//!
//! - [`MemoryStore`]: lock-protected vector with an R-tree over coordinates
//! - [`SqliteStore`]: durable single-table SQLite database
//!
//! Both assign ids that strictly increase in insertion order and never reuse them.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{SCHEMA_VERSION, SqliteStore};

use crate::sample::Fix;
use crate::{BoundingBox, Result, Sample, SampleId};
use std::cmp::Ordering;

/// Durable keyed storage of position samples
///
/// Every method takes `&self`: implementations synchronize internally so one store can be
/// shared between a capture flow and a rendering flow. A query never observes a
/// partially written sample.
pub trait SampleStore: Send + Sync {
    /// Append a sample and return its newly assigned id
    ///
    /// Coordinates are stored as given; range validation is the caller's concern.
    fn insert(&self, latitude: f64, longitude: f64, timestamp_ms: i64) -> Result<SampleId>;

    /// Append several fixes in order, returning their ids in the same order
    fn insert_many(&self, fixes: &[Fix]) -> Result<Vec<SampleId>> {
        fixes
            .iter()
            .map(|fix| self.insert(fix.latitude, fix.longitude, fix.timestamp_ms))
            .collect()
    }

    /// All samples inside `bbox` (edges inclusive), ascending by timestamp then id
    ///
    /// Returns an empty vector when nothing matches.
    fn query_range(&self, bbox: &BoundingBox) -> Result<Vec<Sample>>;

    /// Number of stored samples
    fn count(&self) -> Result<usize>;
}

/// Chronological result order shared by all stores
#[inline]
pub(crate) fn chronological(a: &Sample, b: &Sample) -> Ordering {
    a.timestamp_ms()
        .cmp(&b.timestamp_ms())
        .then_with(|| a.id().cmp(&b.id()))
}
