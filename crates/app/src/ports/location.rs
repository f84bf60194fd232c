//! Location port — the device's last known position.

use minifence_domain::geo::GeoPoint;

/// Pull-only source of position fixes.
///
/// Implementations must return immediately with whatever fix they have
/// cached; waiting for a live fix is not allowed.
pub trait LocationProvider {
    /// The last cached fix, or `None` if no fix has been obtained yet.
    fn last_known_position(&self) -> Option<GeoPoint>;
}

impl<T: LocationProvider + ?Sized> LocationProvider for std::sync::Arc<T> {
    fn last_known_position(&self) -> Option<GeoPoint> {
        (**self).last_known_position()
    }
}
