//! TrackRecorder - Top-level manager for capturing positions and rendering visible paths
//!
//! This module ties the store, the windowed query and the feasibility filter together:
//! the capture side calls [`TrackRecorder::record`], the drawing side calls
//! [`TrackRecorder::render`] whenever the viewport changes.

use crate::sample::{Fix, now_millis};
use crate::{
    Config, FeasibilityFilter, PathProjector, Polyline, Result, SampleId, SampleStore, Viewport,
    project_polylines, query_window,
};
use std::sync::Arc;

/// Records positions into a store and produces the visible path for a viewport
///
/// The store is shared through an `Arc`, so a capture thread and a render thread can each
/// hold a recorder (or a clone of one) over the same data.
pub struct TrackRecorder<S: SampleStore + ?Sized = dyn SampleStore> {
    store: Arc<S>,
    filter: FeasibilityFilter,
}

impl<S: SampleStore + ?Sized> Clone for TrackRecorder<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            filter: self.filter.clone(),
        }
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<S: SampleStore + ?Sized> TrackRecorder<S> {
    /// Create a recorder over the given store
    pub fn new(store: Arc<S>, config: &Config) -> Self {
        Self {
            store,
            filter: FeasibilityFilter::new(config),
        }
    }

    /// The underlying store
    #[inline]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The feasibility filter in use
    #[inline]
    pub fn filter(&self) -> &FeasibilityFilter {
        &self.filter
    }

    /// Record a position stamped with the current time
    pub fn record(&self, latitude: f64, longitude: f64) -> Result<SampleId> {
        self.record_at(latitude, longitude, now_millis())
    }

    /// Record a position with an explicit timestamp in milliseconds
    pub fn record_at(&self, latitude: f64, longitude: f64, timestamp_ms: i64) -> Result<SampleId> {
        self.store.insert(latitude, longitude, timestamp_ms)
    }

    /// Record a position, dropping it if the store fails
    ///
    /// A lost sample only means one point fewer on the path, so capture keeps going.
    pub fn record_lossy(&self, fix: Fix) -> Option<SampleId> {
        match self.record_at(fix.latitude, fix.longitude, fix.timestamp_ms) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(
                    "Dropping sample at ({}, {}): {}",
                    fix.latitude,
                    fix.longitude,
                    e
                );
                None
            }
        }
    }

    /// Number of recorded samples
    pub fn sample_count(&self) -> Result<usize> {
        self.store.count()
    }

    /// Visible path as polylines of geographic points
    pub fn visible_polylines(&self, viewport: &Viewport) -> Result<Vec<Polyline>> {
        let samples = query_window(self.store.as_ref(), viewport)?;
        Ok(self.filter.segment(&samples))
    }

    /// Visible path projected into render space, ready to be drawn in full
    pub fn render<P>(&self, viewport: &Viewport, projector: &P) -> Result<Vec<Polyline>>
    where
        P: PathProjector + Sync + ?Sized,
    {
        let polylines = self.visible_polylines(viewport)?;
        Ok(project_polylines(&polylines, projector))
    }
}
