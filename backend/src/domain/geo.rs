//! Spherical geometry for radius searches.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Error;

/// Earth's radius in miles, used to turn a distance into an angle.
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    /// Degrees east of Greenwich.
    pub longitude: f64,
    /// Degrees north of the equator.
    pub latitude: f64,
}

impl GeoPoint {
    /// Build a point from longitude and latitude in degrees.
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Read a GeoJSON `[lng, lat]` coordinate pair.
    #[must_use]
    pub fn from_coordinates(coordinates: &[f64]) -> Option<Self> {
        match coordinates {
            [longitude, latitude] => Some(Self::new(*longitude, *latitude)),
            _ => None,
        }
    }

    /// Great-circle angle to `other`, in radians (haversine formula).
    #[must_use]
    pub fn angular_distance(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = lat2 - lat1;
        let d_lng = (other.longitude - self.longitude).to_radians();
        let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * h.sqrt().min(1.0).asin()
    }
}

/// Rejected radius-search input.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeoError {
    /// Distances must be finite and non-negative.
    #[error("distance must be a non-negative number of miles, got {0}")]
    InvalidDistance(f64),
}

impl From<GeoError> for Error {
    fn from(_: GeoError) -> Self {
        Self::invalid_request("Please provide a valid distance in miles")
    }
}

/// Spherical cap: every point within `radius` radians of `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCap {
    center: GeoPoint,
    radius: f64,
}

impl GeoCap {
    /// Cap around `center` reaching `miles` along the surface.
    pub fn from_miles(center: GeoPoint, miles: f64) -> Result<Self, GeoError> {
        if !miles.is_finite() || miles < 0.0 {
            return Err(GeoError::InvalidDistance(miles));
        }
        Ok(Self {
            center,
            radius: miles / EARTH_RADIUS_MILES,
        })
    }

    /// Cap centre.
    #[must_use]
    pub const fn center(&self) -> GeoPoint {
        self.center
    }

    /// Angular radius in radians.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Return `true` when `point` lies inside or on the cap boundary.
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.center.angular_distance(point) <= self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const BOSTON: GeoPoint = GeoPoint::new(-71.0589, 42.3601);
    const CAMBRIDGE: GeoPoint = GeoPoint::new(-71.1097, 42.3736);
    const NEW_YORK: GeoPoint = GeoPoint::new(-74.0060, 40.7128);

    #[rstest]
    fn radius_is_distance_over_earth_radius() {
        let cap = GeoCap::from_miles(BOSTON, 3963.0).expect("valid distance");
        assert!((cap.radius() - 1.0).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(CAMBRIDGE, 10.0, true)]
    #[case(NEW_YORK, 10.0, false)]
    #[case(NEW_YORK, 200.0, true)]
    #[case(BOSTON, 0.0, true)]
    fn cap_membership_follows_great_circle_distance(
        #[case] point: GeoPoint,
        #[case] miles: f64,
        #[case] inside: bool,
    ) {
        let cap = GeoCap::from_miles(BOSTON, miles).expect("valid distance");
        assert_eq!(cap.contains(&point), inside);
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn invalid_distances_are_rejected(#[case] miles: f64) {
        assert!(GeoCap::from_miles(BOSTON, miles).is_err());
    }

    #[rstest]
    fn coordinates_require_a_pair() {
        assert_eq!(
            GeoPoint::from_coordinates(&[-71.0, 42.0]),
            Some(GeoPoint::new(-71.0, 42.0))
        );
        assert_eq!(GeoPoint::from_coordinates(&[1.0]), None);
    }
}
