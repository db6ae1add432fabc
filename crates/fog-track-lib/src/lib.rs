//! Fog Track Library - Core Data Structures for Position Recording and Path Rendering
//!
//! This library records timestamped geographic positions and, for any viewport, yields the
//! recorded path inside it as polylines. Consecutive positions are only joined when the
//! travel between them is physically plausible, so GPS jumps show up as breaks in the path
//! instead of straight lines across the map.
//!
//! # Architecture
//!
//! - **[`Sample`]**: Immutable timestamped position, identified by a store-assigned id
//! - **[`SampleStore`]**: Storage contract, implemented by [`MemoryStore`] and [`SqliteStore`]
//! - **[`query_window`]**: Viewport to [`BoundingBox`] normalization and range query
//! - **[`FeasibilityFilter`]**: Splits an ordered run of samples into connected polylines
//! - **[`PathProjector`]**: Injected mapping from geographic to render coordinates
//! - **[`TrackRecorder`]**: High-level manager tying the pieces together
//!
//! # Performance Characteristics
//!
//! - **Insert**: O(log N) in memory, one durable row write in SQLite
//! - **Query Time**: O(log N + K) with the R-tree, index range scan in SQLite (K=results)
//! - **Segmentation**: O(K) time, O(1) extra state, single forward pass

mod bounds;
mod feasibility;
pub mod import;
mod projection;
mod sample;
pub mod store;
mod tracker;
pub mod utils;
mod window;

// Public API exports
pub use bounds::BoundingBox;
pub use feasibility::{
    Config, EARTH_RADIUS_M, FeasibilityFilter, MAX_SPEED_MPS, haversine_distance, segment,
};
pub use import::ImportSummary;
pub use projection::{PathProjector, WebMercatorProjector, project_polylines};
pub use sample::{Fix, Sample, SampleId, now_millis};
pub use store::{MemoryStore, SampleStore, SqliteStore};
pub use tracker::TrackRecorder;
pub use window::{Viewport, query_window};

/// A connected run of points, in geographic (x = longitude, y = latitude) or render space
pub type Polyline = geo::LineString<f64>;

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Storage lock poisoned: {0}")]
    LockPoisoned(&'static str),

    #[error("Unsupported schema version {found}, max supported {supported}")]
    UnsupportedSchema { found: i64, supported: i64 },

    #[error("GPX parsing error: {0}")]
    GpxParse(#[from] gpx::errors::GpxError),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackError {
    /// Whether the error came from the storage medium
    ///
    /// Capture flows use this to drop the affected sample and keep going.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            TrackError::Storage(_)
                | TrackError::LockPoisoned(_)
                | TrackError::UnsupportedSchema { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that all public types are accessible
        let _: fn() -> MemoryStore = MemoryStore::new;
        let _: fn() -> Config = Config::default;
        let _: fn(&[Sample]) -> Vec<Polyline> = segment;
    }

    #[test]
    fn test_storage_errors_are_classified() {
        assert!(TrackError::LockPoisoned("samples").is_storage());
        assert!(
            TrackError::UnsupportedSchema {
                found: 9,
                supported: 1
            }
            .is_storage()
        );
        assert!(!TrackError::InvalidCoordinate("lat".to_string()).is_storage());
    }
}
