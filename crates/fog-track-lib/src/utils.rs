//! Coordinate helpers: spherical Web Mercator (EPSG:3857) and WGS84 range checks

use geo::Point;

/// Sphere radius of the Web Mercator projection (WGS84 semi-major axis), in meters
pub const MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Projected x of the antimeridian; the map spans `-MERCATOR_HALF_EXTENT..=MERCATOR_HALF_EXTENT`
pub const MERCATOR_HALF_EXTENT: f64 = std::f64::consts::PI * MERCATOR_RADIUS_M;

/// Latitude at which the projected y reaches [`MERCATOR_HALF_EXTENT`], making the map square
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Project WGS84 degrees to Web Mercator meters
///
/// Latitude is clamped to ±[`MAX_LATITUDE`], so polar samples land on the map edge
/// instead of at infinity.
#[inline]
pub fn wgs84_to_mercator(lat: f64, lon: f64) -> Point<f64> {
    let phi = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    // asinh(tan φ) is the inverse Gudermannian, i.e. ln(tan φ + sec φ)
    Point::new(
        MERCATOR_RADIUS_M * lon.to_radians(),
        MERCATOR_RADIUS_M * phi.tan().asinh(),
    )
}

/// [`wgs84_to_mercator`] for a geographic point (x = lon, y = lat)
#[inline]
pub fn point_to_mercator(point: Point<f64>) -> Point<f64> {
    wgs84_to_mercator(point.y(), point.x())
}

/// Whether a latitude/longitude pair lies within the valid WGS84 ranges
#[inline]
pub fn is_valid_wgs84(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mercator_origin() {
        assert_eq!(wgs84_to_mercator(0.0, 0.0), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_mercator_world_is_square() {
        let west = wgs84_to_mercator(0.0, -180.0);
        assert!((west.x() + MERCATOR_HALF_EXTENT).abs() < 1e-6);

        // Beyond the cut-off latitude everything clamps to the top edge
        let pole = wgs84_to_mercator(90.0, 0.0);
        assert!((pole.y() - MERCATOR_HALF_EXTENT).abs() < 0.01);
        assert_eq!(pole, wgs84_to_mercator(MAX_LATITUDE, 0.0));
    }

    #[test]
    fn test_mercator_london() {
        let london = point_to_mercator(Point::new(-0.1278, 51.5074));
        assert!((london.x() + 14_226.63).abs() < 0.01, "got {}", london.x());
        assert!((london.y() - 6_711_542.48).abs() < 0.01, "got {}", london.y());
    }

    #[test]
    fn test_mercator_is_symmetric_about_equator() {
        let north = wgs84_to_mercator(40.0, 10.0);
        let south = wgs84_to_mercator(-40.0, 10.0);
        assert_eq!(north.x(), south.x());
        assert!((north.y() + south.y()).abs() < 1e-6);
    }

    #[test]
    fn test_is_valid_wgs84() {
        assert!(is_valid_wgs84(90.0, -180.0));
        assert!(!is_valid_wgs84(90.1, 0.0));
        assert!(!is_valid_wgs84(0.0, 180.5));
        assert!(!is_valid_wgs84(f64::NAN, 0.0));
    }
}
