//! Rectangular geographic query region

use geo::{Coord, Point, Rect};

/// Latitude/longitude box, inclusive on all four edges
///
/// Always satisfies `min_lat <= max_lat` and `min_lon <= max_lon`; the only constructors
/// normalize their input.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl BoundingBox {
    /// Build the box spanned by two opposite corners, in any order
    ///
    /// Corners are geographic points (x = longitude, y = latitude).
    pub fn from_corners(a: Point<f64>, b: Point<f64>) -> Self {
        Self {
            min_lat: a.y().min(b.y()),
            max_lat: a.y().max(b.y()),
            min_lon: a.x().min(b.x()),
            max_lon: a.x().max(b.x()),
        }
    }

    /// Build a box from raw latitude and longitude ranges, swapping reversed bounds
    pub fn new(lat_a: f64, lat_b: f64, lon_a: f64, lon_b: f64) -> Self {
        Self::from_corners(Point::new(lon_a, lat_a), Point::new(lon_b, lat_b))
    }

    #[inline]
    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    #[inline]
    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    #[inline]
    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    #[inline]
    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }

    /// Inclusive containment test on raw coordinates
    #[inline]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.min_lat <= latitude
            && latitude <= self.max_lat
            && self.min_lon <= longitude
            && longitude <= self.max_lon
    }

    /// Corners as `([min_lon, min_lat], [max_lon, max_lat])`, the R-tree envelope layout
    #[inline]
    pub fn lower_upper(&self) -> ([f64; 2], [f64; 2]) {
        (
            [self.min_lon, self.min_lat],
            [self.max_lon, self.max_lat],
        )
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self::from_corners(rect.min().into(), rect.max().into())
    }
}

impl From<BoundingBox> for Rect<f64> {
    fn from(bbox: BoundingBox) -> Self {
        Rect::new(
            Coord {
                x: bbox.min_lon,
                y: bbox.min_lat,
            },
            Coord {
                x: bbox.max_lon,
                y: bbox.max_lat,
            },
        )
    }
}
