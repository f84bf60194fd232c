//! Symbolic display strings and the localization seam.
//!
//! Localized text is used for display only. Nothing that reaches the
//! persisted envelope goes through a [`Localizer`].

/// Every user-visible string the domain needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKey {
    Location,
    LocationInside,
    LocationOutside,
    /// Heading of the mode selector; doubles as the placeholder label for
    /// an unrecognized mode.
    LocationMode,
    /// Template with a single `{}` placeholder.
    LocationIs,
    NameShort,
    LatitudeShort,
    LongitudeShort,
    DistanceShort,
    CurrentLocation,
    Connector,
    ConnectorAnd,
    ConnectorOr,
    ConnectorXor,
}

/// Resolves a [`TextKey`] in the active locale.
pub trait Localizer {
    fn lookup(&self, key: TextKey) -> String;

    /// Look up a template key and substitute its `{}` placeholder.
    fn format(&self, key: TextKey, arg: &str) -> String {
        self.lookup(key).replacen("{}", arg, 1)
    }
}

impl<T: Localizer + ?Sized> Localizer for &T {
    fn lookup(&self, key: TextKey) -> String {
        (**self).lookup(key)
    }
}

/// Built-in English strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct English;

impl Localizer for English {
    fn lookup(&self, key: TextKey) -> String {
        let text = match key {
            TextKey::Location => "Location",
            TextKey::LocationInside => "Inside area",
            TextKey::LocationOutside => "Outside area",
            TextKey::LocationMode => "Mode",
            TextKey::LocationIs => "Location is {}",
            TextKey::NameShort => "Name",
            TextKey::LatitudeShort => "Lat",
            TextKey::LongitudeShort => "Lon",
            TextKey::DistanceShort => "Dist [m]",
            TextKey::CurrentLocation => "Current location",
            TextKey::Connector => "Connector",
            TextKey::ConnectorAnd => "And",
            TextKey::ConnectorOr => "Or",
            TextKey::ConnectorXor => "Exclusive or",
        };
        text.to_string()
    }
}
