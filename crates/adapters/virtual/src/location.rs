//! Virtual location provider — a position fix set by hand.

use std::sync::{Arc, PoisonError, RwLock};

use minifence_app::ports::LocationProvider;
use minifence_domain::geo::{GeoPoint, meters_per_degree_latitude};

/// A simulated position source.
///
/// Clones share the same fix, so a test or demo can keep a handle and move
/// the device while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct VirtualLocationProvider {
    position: Arc<RwLock<Option<GeoPoint>>>,
}

impl VirtualLocationProvider {
    /// A provider that already has a fix at `point`.
    #[must_use]
    pub fn at(point: GeoPoint) -> Self {
        let provider = Self::default();
        provider.set_position(point);
        provider
    }

    pub fn set_position(&self, point: GeoPoint) {
        tracing::debug!(%point, "virtual position updated");
        *self.position.write().unwrap_or_else(PoisonError::into_inner) = Some(point);
    }

    /// Forget the fix, as if the device never had one.
    pub fn clear(&self) {
        *self.position.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Shift the current fix by the given offsets in meters.
    ///
    /// Does nothing without a fix. The east offset is scaled by the cosine
    /// of the starting latitude, which is precise enough away from the poles.
    pub fn move_by(&self, north_meters: f64, east_meters: f64) {
        let mut guard = self.position.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(point) = guard.as_mut() {
            let per_degree = meters_per_degree_latitude();
            let start_latitude = point.latitude;
            point.latitude += north_meters / per_degree;
            point.longitude += east_meters / (per_degree * start_latitude.to_radians().cos());
            tracing::debug!(point = %*point, "virtual position moved");
        }
    }
}

impl LocationProvider for VirtualLocationProvider {
    fn last_known_position(&self) -> Option<GeoPoint> {
        *self.position.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: GeoPoint = GeoPoint::new(50.0, 14.0);

    #[test]
    fn should_have_no_fix_by_default() {
        let provider = VirtualLocationProvider::default();
        assert!(provider.last_known_position().is_none());
    }

    #[test]
    fn should_return_position_that_was_set() {
        let provider = VirtualLocationProvider::default();
        provider.set_position(HOME);
        assert_eq!(provider.last_known_position(), Some(HOME));
    }

    #[test]
    fn should_share_fix_between_clones() {
        let provider = VirtualLocationProvider::default();
        let handle = provider.clone();
        handle.set_position(HOME);
        assert_eq!(provider.last_known_position(), Some(HOME));

        handle.clear();
        assert!(provider.last_known_position().is_none());
    }

    #[test]
    fn should_move_north_by_given_distance() {
        let provider = VirtualLocationProvider::at(HOME);
        provider.move_by(500.0, 0.0);

        let moved = provider.last_known_position().unwrap();
        assert!((HOME.distance_to(&moved) - 500.0).abs() < 0.5);
        assert!((moved.longitude - HOME.longitude).abs() < f64::EPSILON);
    }

    #[test]
    fn should_move_east_by_given_distance() {
        let provider = VirtualLocationProvider::at(HOME);
        provider.move_by(0.0, 300.0);

        let moved = provider.last_known_position().unwrap();
        assert!((HOME.distance_to(&moved) - 300.0).abs() < 1.0);
    }

    #[test]
    fn should_scale_east_offset_by_starting_latitude() {
        let start = GeoPoint::new(60.0, 14.0);
        let provider = VirtualLocationProvider::at(start);
        provider.move_by(10_000.0, 1_000.0);

        let moved = provider.last_known_position().unwrap();
        let per_degree = meters_per_degree_latitude();
        let expected = start.longitude + 1_000.0 / (per_degree * 60f64.to_radians().cos());
        assert!((moved.longitude - expected).abs() < 1e-9);
    }

    #[test]
    fn should_ignore_move_without_fix() {
        let provider = VirtualLocationProvider::default();
        provider.move_by(100.0, 100.0);
        assert!(provider.last_known_position().is_none());
    }
}
