//! In-memory sample store backed by an R-tree

use super::{SampleStore, chronological};
use crate::sample::Fix;
use crate::{BoundingBox, Result, Sample, SampleId, TrackError};
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// R-tree entry: `[longitude, latitude]` tagged with the sample's slot in `samples`
type IndexedPoint = GeomWithData<[f64; 2], usize>;

#[derive(Default)]
struct Inner {
    /// All samples in insertion order
    samples: Vec<Sample>,
    /// Spatial index over finite coordinates
    index: RTree<IndexedPoint>,
    /// Slots of samples with non-finite coordinates, kept out of the R-tree
    unindexed: Vec<usize>,
    /// Id handed to the next insert
    next_id: i64,
}

impl Inner {
    fn push(&mut self, fix: Fix) -> SampleId {
        let id = SampleId(self.next_id);
        self.next_id += 1;

        let slot = self.samples.len();
        self.samples.push(Sample::from_fix(id, fix));

        if fix.latitude.is_finite() && fix.longitude.is_finite() {
            self.index
                .insert(IndexedPoint::new([fix.longitude, fix.latitude], slot));
        } else {
            self.unindexed.push(slot);
        }
        id
    }
}

/// Non-durable store for tests, dry runs and short-lived sessions
///
/// Ids start at 1. Readers share a lock, so queries always see a consistent snapshot.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| TrackError::LockPoisoned("memory store"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| TrackError::LockPoisoned("memory store"))
    }
}

impl SampleStore for MemoryStore {
    fn insert(&self, latitude: f64, longitude: f64, timestamp_ms: i64) -> Result<SampleId> {
        let mut inner = self.write()?;
        Ok(inner.push(Fix::at(latitude, longitude, timestamp_ms)))
    }

    fn insert_many(&self, fixes: &[Fix]) -> Result<Vec<SampleId>> {
        let mut inner = self.write()?;
        Ok(fixes.iter().map(|fix| inner.push(*fix)).collect())
    }

    fn query_range(&self, bbox: &BoundingBox) -> Result<Vec<Sample>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("memory_store::query_range");

        let inner = self.read()?;
        let (lower, upper) = bbox.lower_upper();
        let envelope = AABB::from_corners(lower, upper);

        let mut found: Vec<Sample> = inner
            .index
            .locate_in_envelope(&envelope)
            .map(|entry| entry.data)
            .chain(inner.unindexed.iter().copied())
            .map(|slot| inner.samples[slot])
            .filter(|sample| bbox.contains(sample.latitude(), sample.longitude()))
            .collect();
        found.sort_by(chronological);

        tracing::debug!("Memory store query matched {} samples", found.len());
        Ok(found)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.read()?.samples.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london_box() -> BoundingBox {
        BoundingBox::new(51.0, 52.0, -1.0, 1.0)
    }

    #[test]
    fn test_ids_strictly_increase() {
        let store = MemoryStore::new();
        let a = store.insert(51.5, -0.12, 0).unwrap();
        let b = store.insert(51.5, -0.12, 0).unwrap();
        let c = store.insert(51.5, -0.12, 0).unwrap();
        assert_eq!(a, SampleId(1));
        assert!(b.directly_follows(a));
        assert!(c.directly_follows(b));
    }

    #[test]
    fn test_query_empty_store() {
        let store = MemoryStore::new();
        assert!(store.query_range(&london_box()).unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_query_filters_and_orders() {
        let store = MemoryStore::new();
        store.insert(51.5, -0.12, 3000).unwrap();
        store.insert(35.6, 139.7, 1000).unwrap(); // Tokyo, outside
        store.insert(51.6, -0.10, 2000).unwrap();
        store.insert(51.7, 0.10, 2000).unwrap();

        let found = store.query_range(&london_box()).unwrap();
        let ids: Vec<i64> = found.iter().map(|s| s.id().0).collect();
        assert_eq!(ids, vec![3, 4, 1]);
    }

    #[test]
    fn test_query_includes_edges() {
        let store = MemoryStore::new();
        store.insert(51.0, -1.0, 0).unwrap();
        store.insert(52.0, 1.0, 1).unwrap();
        store.insert(52.000001, 0.0, 2).unwrap();

        let found = store.query_range(&london_box()).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_out_of_range_values_are_stored() {
        let store = MemoryStore::new();
        store.insert(123.0, 500.0, 0).unwrap();
        store.insert(f64::NAN, 0.0, 1).unwrap();

        assert_eq!(store.count().unwrap(), 2);
        let wide = BoundingBox::new(100.0, 200.0, 400.0, 600.0);
        assert_eq!(store.query_range(&wide).unwrap().len(), 1);
        let everything = BoundingBox::new(-1e9, 1e9, -1e9, 1e9);
        assert_eq!(store.query_range(&everything).unwrap().len(), 1);
    }

    #[test]
    fn test_infinite_coordinates_match_unbounded_box() {
        let store = MemoryStore::new();
        store.insert(f64::INFINITY, 0.0, 0).unwrap();

        let unbounded = BoundingBox::new(0.0, f64::INFINITY, -1.0, 1.0);
        assert_eq!(store.query_range(&unbounded).unwrap().len(), 1);
        assert!(store.query_range(&london_box()).unwrap().is_empty());
    }

    #[test]
    fn test_insert_many_keeps_order() {
        let store = MemoryStore::new();
        let ids = store
            .insert_many(&[
                Fix::at(51.5, -0.12, 10),
                Fix::at(51.6, -0.12, 20),
                Fix::at(51.7, -0.12, 30),
            ])
            .unwrap();
        assert_eq!(ids, vec![SampleId(1), SampleId(2), SampleId(3)]);
        assert_eq!(store.count().unwrap(), 3);
    }
}
