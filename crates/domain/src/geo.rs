//! Great-circle distance between two positions.

use serde::{Deserialize, Serialize};

/// Mean Earth radius (IUGG), in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// A position on the Earth's surface, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Distance to `other` in meters.
    #[must_use]
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_meters(self, other)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Shortest surface distance between `a` and `b`, in meters, using the
/// haversine formula on a sphere of radius [`EARTH_RADIUS_METERS`].
///
/// NaN coordinates propagate to a NaN distance.
#[must_use]
pub fn distance_meters(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let phi_a = a.latitude.to_radians();
    let phi_b = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (d_lambda / 2.0).sin().powi(2);
    // rounding can push the root slightly above 1 for antipodal points;
    // f64::min would swallow NaN here
    let root = h.sqrt();
    let root = if root > 1.0 { 1.0 } else { root };
    EARTH_RADIUS_METERS * 2.0 * root.asin()
}

/// Meters covered by one degree of latitude.
#[must_use]
pub fn meters_per_degree_latitude() -> f64 {
    EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn should_return_zero_for_identical_points() {
        let p = GeoPoint::new(48.8566, 2.3522);
        assert!(distance_meters(&p, &p).abs() < f64::EPSILON);
    }

    #[test]
    fn should_be_symmetric() {
        let paris = GeoPoint::new(48.8566, 2.3522);
        let london = GeoPoint::new(51.5074, -0.1278);
        assert!(approx(
            distance_meters(&paris, &london),
            distance_meters(&london, &paris),
            1e-6
        ));
    }

    #[test]
    fn should_match_known_city_distance() {
        let paris = GeoPoint::new(48.8566, 2.3522);
        let london = GeoPoint::new(51.5074, -0.1278);
        // ~343.5 km great-circle
        let d = paris.distance_to(&london);
        assert!(approx(d, 343_500.0, 1_500.0), "got {d}");
    }

    #[test]
    fn should_measure_one_degree_of_latitude() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        assert!(approx(
            distance_meters(&a, &b),
            meters_per_degree_latitude(),
            1e-6
        ));
    }

    #[test]
    fn should_handle_antipodal_points() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 180.0);
        let half_circumference = EARTH_RADIUS_METERS * std::f64::consts::PI;
        assert!(approx(distance_meters(&a, &b), half_circumference, 1e-3));
    }

    #[test]
    fn should_propagate_nan_coordinates() {
        let a = GeoPoint::new(f64::NAN, 0.0);
        let b = GeoPoint::new(0.0, 0.0);
        assert!(distance_meters(&a, &b).is_nan());
    }

    #[test]
    fn should_display_with_six_decimals() {
        let p = GeoPoint::new(1.5, -2.25);
        assert_eq!(p.to_string(), "(1.500000, -2.250000)");
    }
}
