//! Trigger — a condition that decides, from external state, whether a rule
//! should fire.
//!
//! The set of variants is closed: [`Trigger`] is a sum type and every
//! variant implements [`TriggerVariant`]. Persistence goes through a
//! type-tagged [`Envelope`]; the [`TriggerRegistry`] maps each stable
//! discriminator to a constructor so an envelope can be decoded without
//! knowing its concrete type up front. Adding a condition kind means adding
//! a variant and a registry entry.
//!
//! Every variant keeps its whole configuration behind one mutex, so
//! evaluation, encoding, hydration and edits never observe each other
//! half-way.

mod connector;
mod envelope;
mod fields;
mod location;
mod registry;

pub use connector::{CONNECTOR_TYPES, ConnectorType, TriggerConnector};
pub use envelope::Envelope;
pub use location::{
    DEBOUNCE_WINDOW, LOCATION_MODES, LocationMode, LocationTrigger, label_to_mode, mode_to_label,
};
pub use registry::{Constructor, TriggerRegistry};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MiniFenceError;
use crate::form::Command;
use crate::geo::GeoPoint;
use crate::i18n::{Localizer, TextKey};
use crate::time::EpochMillis;

/// External state a trigger is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationContext {
    /// Wall clock, epoch milliseconds.
    pub now: EpochMillis,
    /// Last cached position fix, if any.
    pub position: Option<GeoPoint>,
}

/// Symbolic icon identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    LocationOn,
}

/// Capability shared by every trigger variant.
///
/// Mutating operations take `&self`: the variant's own lock serializes them
/// against concurrent evaluation.
pub trait TriggerVariant {
    /// Stable discriminator written to the `type` field of the envelope.
    const DISCRIMINATOR: &'static str;

    /// Whether the owning rule should fire now. Never mutates the trigger.
    fn should_run(&self, ctx: &EvaluationContext) -> bool;

    /// Variant-specific `data` object of the envelope.
    fn encode_data(&self) -> Value;

    /// Overwrite the configuration from a decoded `data` value.
    ///
    /// Missing or malformed fields fall back to zero/empty defaults. If
    /// `data` is not an object at all, the error is logged and the instance
    /// is left as it was.
    fn hydrate(&self, data: &Value) -> &Self;

    fn friendly_name(&self) -> TextKey;

    /// Human-readable summary in the active locale.
    fn describe(&self, i18n: &dyn Localizer) -> String;

    fn icon(&self) -> Option<Icon>;

    /// An independent copy; editing one never affects the other.
    #[must_use]
    fn duplicate(&self) -> Self
    where
        Self: Sized;

    /// Epoch milliseconds of the last executed action, `0` if never.
    fn last_run(&self) -> EpochMillis;

    /// Record that the owning rule's actions were executed at `now`.
    fn executed(&self, now: EpochMillis);
}

/// The closed set of trigger variants.
#[derive(Debug)]
pub enum Trigger {
    Location(LocationTrigger),
    Connector(TriggerConnector),
}

macro_rules! dispatch {
    ($self:expr, $t:ident => $body:expr) => {
        match $self {
            Trigger::Location($t) => $body,
            Trigger::Connector($t) => $body,
        }
    };
}

impl Trigger {
    #[must_use]
    pub fn discriminator(&self) -> &'static str {
        match self {
            Self::Location(_) => LocationTrigger::DISCRIMINATOR,
            Self::Connector(_) => TriggerConnector::DISCRIMINATOR,
        }
    }

    #[must_use]
    pub fn should_run(&self, ctx: &EvaluationContext) -> bool {
        dispatch!(self, t => t.should_run(ctx))
    }

    #[must_use]
    pub fn encode(&self) -> Envelope {
        Envelope::new(self.discriminator(), dispatch!(self, t => t.encode_data()))
    }

    /// Compact JSON text of the envelope.
    #[must_use]
    pub fn to_json(&self) -> String {
        self.encode().to_json()
    }

    /// Hydrate using the built-in registry for nested triggers.
    pub fn hydrate(&self, data: &Value) -> &Self {
        self.hydrate_in(data, TriggerRegistry::builtin())
    }

    /// Hydrate, resolving nested triggers through `registry`.
    pub fn hydrate_in(&self, data: &Value, registry: &TriggerRegistry) -> &Self {
        match self {
            Self::Location(t) => {
                t.hydrate(data);
            }
            Self::Connector(t) => {
                t.hydrate_in(data, registry);
            }
        }
        self
    }

    #[must_use]
    pub fn friendly_name(&self) -> TextKey {
        dispatch!(self, t => t.friendly_name())
    }

    #[must_use]
    pub fn describe(&self, i18n: &dyn Localizer) -> String {
        dispatch!(self, t => t.describe(i18n))
    }

    #[must_use]
    pub fn icon(&self) -> Option<Icon> {
        dispatch!(self, t => t.icon())
    }

    #[must_use]
    pub fn duplicate(&self) -> Self {
        match self {
            Self::Location(t) => Self::Location(t.duplicate()),
            Self::Connector(t) => Self::Connector(t.duplicate()),
        }
    }

    #[must_use]
    pub fn last_run(&self) -> EpochMillis {
        dispatch!(self, t => t.last_run())
    }

    pub fn executed(&self, now: EpochMillis) {
        dispatch!(self, t => t.executed(now));
    }

    /// Nested entries skipped while decoding this tree.
    #[must_use]
    pub fn dropped_entries(&self) -> usize {
        match self {
            Self::Location(_) => 0,
            Self::Connector(t) => t.dropped_children(),
        }
    }

    /// Run a form command. Returns `true` if the trigger changed.
    pub fn apply_command(&self, command: Command, position: Option<GeoPoint>) -> bool {
        match self {
            Self::Location(t) => t.apply_command(command, position),
            Self::Connector(_) => false,
        }
    }

    #[must_use]
    pub fn as_location(&self) -> Option<&LocationTrigger> {
        match self {
            Self::Location(t) => Some(t),
            Self::Connector(_) => None,
        }
    }

    #[must_use]
    pub fn as_connector(&self) -> Option<&TriggerConnector> {
        match self {
            Self::Connector(t) => Some(t),
            Self::Location(_) => None,
        }
    }
}

impl Clone for Trigger {
    fn clone(&self) -> Self {
        self.duplicate()
    }
}

impl From<LocationTrigger> for Trigger {
    fn from(t: LocationTrigger) -> Self {
        Self::Location(t)
    }
}

impl From<TriggerConnector> for Trigger {
    fn from(t: TriggerConnector) -> Self {
        Self::Connector(t)
    }
}

impl Serialize for Trigger {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Trigger {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        TriggerRegistry::builtin()
            .decode_value(&value)
            .map_err(serde::de::Error::custom)
    }
}

impl std::str::FromStr for Trigger {
    type Err = MiniFenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TriggerRegistry::builtin().decode_str(s)
    }
}
