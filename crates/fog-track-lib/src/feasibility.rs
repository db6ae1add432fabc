//! Feasibility filter
//!
//! Splits a chronologically ordered run of samples into polylines. Two neighbouring samples
//! are joined only when they were inserted back to back and the speed needed to get from
//! one to the other is plausible. Anything else (a GPS jump, leaving and re-entering the
//! viewport, a duplicate fix) starts a new polyline.
//!
//! The decision looks at the current pair only: O(n) time, O(1) state, no backtracking.

use crate::{Polyline, Sample};
use geo::{Coord, LineString, Point};

/// Fastest plausible travel speed in meters per second (roughly 110 km/h)
pub const MAX_SPEED_MPS: f64 = 31.0;

/// Mean Earth radius used by [`haversine_distance`], in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Configuration for the feasibility filter
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Maximum speed (m/s) at which two samples may still be connected.
    /// Default: [`MAX_SPEED_MPS`]
    pub max_speed_mps: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_speed_mps: MAX_SPEED_MPS,
        }
    }
}

/// Connect/disconnect decision between consecutive samples
#[derive(Debug, Clone)]
pub struct FeasibilityFilter {
    max_speed_mps: f64,
}

impl Default for FeasibilityFilter {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl FeasibilityFilter {
    /// Create a filter from the given configuration
    pub fn new(config: &Config) -> Self {
        Self {
            max_speed_mps: config.max_speed_mps,
        }
    }

    /// Speed limit in meters per second
    #[inline]
    pub fn max_speed_mps(&self) -> f64 {
        self.max_speed_mps
    }

    /// Decide whether `next` continues the path that ends at `previous`
    ///
    /// Requires all of:
    /// - `next` was inserted directly after `previous` (ids differ by exactly one)
    /// - the two points are not at the same spot (a zero-length line draws nothing)
    /// - time moved and the implied speed is within the limit
    pub fn is_feasible(&self, previous: &Sample, next: &Sample) -> bool {
        if !next.id().directly_follows(previous.id()) {
            return false;
        }

        let distance_m = haversine_distance(previous.point(), next.point());
        if distance_m == 0.0 {
            return false;
        }

        // Saturating: ids are adjacent but timestamps may sit at opposite ends of i64
        let elapsed_s = next.timestamp_ms().saturating_sub(previous.timestamp_ms()) as f64 / 1000.0;
        if elapsed_s == 0.0 {
            // Same instant: speed is unbounded
            return false;
        }

        // Backwards time gives a negative speed, which passes. NaN distances fail.
        distance_m / elapsed_s <= self.max_speed_mps
    }

    /// Split an ordered run of samples into polylines of geographic points
    ///
    /// Single-point polylines are kept; they mark isolated fixes.
    pub fn segment(&self, samples: &[Sample]) -> Vec<Polyline> {
        #[cfg(feature = "profiling")]
        profiling::scope!("feasibility::segment");

        let Some((first, rest)) = samples.split_first() else {
            return Vec::new();
        };

        let mut polylines = Vec::new();
        let mut current: Vec<Coord<f64>> = vec![first.point().into()];
        let mut previous = first;

        for next in rest {
            if !self.is_feasible(previous, next) {
                polylines.push(LineString::new(std::mem::take(&mut current)));
            }
            current.push(next.point().into());
            previous = next;
        }
        polylines.push(LineString::new(current));

        tracing::debug!(
            "Segmented {} samples into {} polylines",
            samples.len(),
            polylines.len()
        );
        polylines
    }
}

/// Split samples using the default speed limit
pub fn segment(samples: &[Sample]) -> Vec<Polyline> {
    FeasibilityFilter::default().segment(samples)
}

/// Great-circle distance in meters between two geographic points (x = lon, y = lat)
///
/// Haversine formula on a sphere of radius [`EARTH_RADIUS_M`]. Identical points give
/// exactly `0.0`.
#[inline]
pub fn haversine_distance(p1: Point<f64>, p2: Point<f64>) -> f64 {
    let hav = |theta: f64| (theta / 2.0).sin().powi(2);
    let (phi1, phi2) = (p1.y().to_radians(), p2.y().to_radians());

    let h = hav(phi2 - phi1) + phi1.cos() * phi2.cos() * hav((p2.x() - p1.x()).to_radians());
    // Rounding can push h a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_M * h.sqrt().clamp(0.0, 1.0).asin()
}
