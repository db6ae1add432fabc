//! Windowed query engine
//!
//! Turns a viewport description into a [`BoundingBox`] and runs the range query against a
//! store. Nothing is cached: every viewport change issues a fresh query.

use crate::{BoundingBox, Result, Sample, SampleStore};
use geo::Point;

/// Visible map region given by two opposite corners (x = longitude, y = latitude)
///
/// Corners may come in any order (north-east/south-west, north-west/south-east, or swapped).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub corner_a: Point<f64>,
    pub corner_b: Point<f64>,
}

impl Viewport {
    pub fn new(corner_a: Point<f64>, corner_b: Point<f64>) -> Self {
        Self { corner_a, corner_b }
    }

    /// Build a viewport from `(lat, lon)` pairs
    pub fn from_lat_lon(a: (f64, f64), b: (f64, f64)) -> Self {
        Self::new(Point::new(a.1, a.0), Point::new(b.1, b.0))
    }

    /// Normalized bounding box covering the viewport
    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_corners(self.corner_a, self.corner_b)
    }
}

/// Samples visible in `viewport`, in chronological order
pub fn query_window<S: SampleStore + ?Sized>(store: &S, viewport: &Viewport) -> Result<Vec<Sample>> {
    #[cfg(feature = "profiling")]
    profiling::scope!("window::query_window");

    let bbox = viewport.bounding_box();
    tracing::debug!(
        "Querying window lat [{}, {}] lon [{}, {}]",
        bbox.min_lat(),
        bbox.max_lat(),
        bbox.min_lon(),
        bbox.max_lon()
    );
    store.query_range(&bbox)
}
