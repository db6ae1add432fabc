//! Path projection into render space
//!
//! The projection is supplied by whoever draws the path (a map widget, an image exporter,
//! a test). It is passed in explicitly; nothing here reaches for a global map.

use crate::{BoundingBox, Polyline, utils};
use geo::{Coord, LineString, MapCoords, Point};
use rayon::prelude::*;

/// Maps a geographic point (x = lon, y = lat) to a render-space point
///
/// Implementations must be pure: the same input always maps to the same output.
pub trait PathProjector {
    fn project(&self, point: Point<f64>) -> Point<f64>;
}

impl<F> PathProjector for F
where
    F: Fn(Point<f64>) -> Point<f64>,
{
    #[inline]
    fn project(&self, point: Point<f64>) -> Point<f64> {
        self(point)
    }
}

/// Projects a bounding box onto a `width × height` pixel screen through Web Mercator
///
/// The box's north-west corner lands on pixel (0, 0) and y grows downward, the usual
/// screen convention of slippy map widgets.
#[derive(Clone, Debug)]
pub struct WebMercatorProjector {
    min: Point<f64>,
    max: Point<f64>,
    width: f64,
    height: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl WebMercatorProjector {
    /// Create a projector showing `bbox` on a screen of the given pixel size
    pub fn new(bbox: &BoundingBox, width: f64, height: f64) -> Self {
        Self {
            min: utils::wgs84_to_mercator(bbox.min_lat(), bbox.min_lon()),
            max: utils::wgs84_to_mercator(bbox.max_lat(), bbox.max_lon()),
            width,
            height,
        }
    }
}

impl PathProjector for WebMercatorProjector {
    fn project(&self, point: Point<f64>) -> Point<f64> {
        let mercator = utils::point_to_mercator(point);
        Point::new(
            scale(mercator.x() - self.min.x(), self.max.x() - self.min.x(), self.width),
            scale(self.max.y() - mercator.y(), self.max.y() - self.min.y(), self.height),
        )
    }
}

/// Map `offset` within `span` onto `0..=size`; an empty span maps to the middle
#[inline]
fn scale(offset: f64, span: f64, size: f64) -> f64 {
    if span > 0.0 {
        offset / span * size
    } else {
        size / 2.0
    }
}

/// Project every point of every polyline, keeping polyline order and boundaries
pub fn project_polylines<P>(polylines: &[Polyline], projector: &P) -> Vec<Polyline>
where
    P: PathProjector + Sync + ?Sized,
{
    #[cfg(feature = "profiling")]
    profiling::scope!("projection::project_polylines");

    polylines
        .par_iter()
        .map(|line: &LineString<f64>| {
            line.map_coords(|coord| Coord::from(projector.project(coord.into())))
        })
        .collect()
}
