//! Sample storage types
//!
//! A [`Sample`] is one recorded position as it lives in a store. Before the store assigns an
//! id, a captured position travels as a [`Fix`].

use geo::Point;
use std::fmt;

/// Store-assigned sample identifier, strictly increasing in insertion order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SampleId(pub i64);

impl SampleId {
    /// True if `self` was inserted directly after `previous`, with no sample in between
    #[inline]
    pub fn directly_follows(self, previous: SampleId) -> bool {
        self.0.checked_sub(previous.0) == Some(1)
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A captured position that has not been persisted yet
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fix {
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl Fix {
    /// Create a fix stamped with the current wall-clock time
    pub fn now(latitude: f64, longitude: f64) -> Self {
        Self::at(latitude, longitude, now_millis())
    }

    /// Create a fix with an explicit timestamp in milliseconds
    pub fn at(latitude: f64, longitude: f64, timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            latitude,
            longitude,
        }
    }
}

/// One persisted position record
///
/// Samples are created once by a store and never mutated afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    id: SampleId,
    timestamp_ms: i64,
    latitude: f64,
    longitude: f64,
}

impl Sample {
    /// Create a sample from its stored fields
    pub fn new(id: SampleId, timestamp_ms: i64, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            timestamp_ms,
            latitude,
            longitude,
        }
    }

    /// Attach a store-assigned id to a captured fix
    pub fn from_fix(id: SampleId, fix: Fix) -> Self {
        Self::new(id, fix.timestamp_ms, fix.latitude, fix.longitude)
    }

    #[inline]
    pub fn id(&self) -> SampleId {
        self.id
    }

    /// Capture time in milliseconds since the Unix epoch
    #[inline]
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Geographic point (x = longitude, y = latitude)
    #[inline]
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: (Lat: {}, Long: {})",
            self.id, self.timestamp_ms, self.latitude, self.longitude
        )
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directly_follows() {
        assert!(SampleId(6).directly_follows(SampleId(5)));
        assert!(!SampleId(9).directly_follows(SampleId(5)));
        assert!(!SampleId(5).directly_follows(SampleId(6)));
        assert!(!SampleId(5).directly_follows(SampleId(5)));
    }

    #[test]
    fn test_directly_follows_does_not_overflow() {
        assert!(!SampleId(i64::MAX).directly_follows(SampleId(-1)));
        assert!(!SampleId(i64::MIN).directly_follows(SampleId(1)));
    }

    #[test]
    fn test_point_axis_order() {
        let sample = Sample::new(SampleId(1), 0, 51.5, -0.12);
        assert_eq!(sample.point().x(), -0.12);
        assert_eq!(sample.point().y(), 51.5);
    }

    #[test]
    fn test_fix_now_uses_current_time() {
        let before = now_millis();
        let fix = Fix::now(51.5, -0.12);
        let after = now_millis();
        assert!(fix.timestamp_ms >= before);
        assert!(fix.timestamp_ms <= after);
    }

    #[test]
    fn test_from_fix_keeps_fields() {
        let fix = Fix::at(51.5, -0.12, 42);
        let sample = Sample::from_fix(SampleId(3), fix);
        assert_eq!(sample.id(), SampleId(3));
        assert_eq!(sample.timestamp_ms(), 42);
        assert_eq!(sample.latitude(), 51.5);
        assert_eq!(sample.longitude(), -0.12);
    }

    #[test]
    fn test_display() {
        let sample = Sample::new(SampleId(7), 1000, 1.5, 2.5);
        assert_eq!(sample.to_string(), "#7 1000: (Lat: 1.5, Long: 2.5)");
    }
}
