//! Trigger registry — discriminator → constructor lookup used on decode.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde_json::Value;

use super::{Envelope, LocationTrigger, Trigger, TriggerConnector, TriggerVariant};
use crate::error::MiniFenceError;

/// Zero-argument constructor of a default trigger instance.
pub type Constructor = fn() -> Trigger;

static BUILTIN: LazyLock<TriggerRegistry> = LazyLock::new(TriggerRegistry::default);

/// Maps envelope discriminators to trigger constructors.
#[derive(Debug, Clone)]
pub struct TriggerRegistry {
    constructors: HashMap<&'static str, Constructor>,
}

impl Default for TriggerRegistry {
    /// A registry with every built-in variant.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(LocationTrigger::DISCRIMINATOR, || {
                Trigger::Location(LocationTrigger::new())
            })
            .register(TriggerConnector::DISCRIMINATOR, || {
                Trigger::Connector(TriggerConnector::default())
            });
        registry
    }
}

impl TriggerRegistry {
    /// A registry that knows no variant.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// The shared registry of built-in variants.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Register (or replace) the constructor for `discriminator`.
    pub fn register(&mut self, discriminator: &'static str, constructor: Constructor) -> &mut Self {
        self.constructors.insert(discriminator, constructor);
        self
    }

    #[must_use]
    pub fn contains(&self, discriminator: &str) -> bool {
        self.constructors.contains_key(discriminator)
    }

    /// A default instance of the variant behind `discriminator`.
    ///
    /// # Errors
    ///
    /// Returns [`MiniFenceError::UnknownTriggerType`] if nothing is
    /// registered under `discriminator`.
    pub fn instantiate(&self, discriminator: &str) -> Result<Trigger, MiniFenceError> {
        self.constructors
            .get(discriminator)
            .map(|constructor| constructor())
            .ok_or_else(|| MiniFenceError::UnknownTriggerType {
                discriminator: discriminator.to_string(),
            })
    }

    /// Construct the variant named by the envelope and hydrate it.
    ///
    /// # Errors
    ///
    /// Returns [`MiniFenceError::UnknownTriggerType`] for an unregistered
    /// discriminator.
    pub fn decode(&self, envelope: &Envelope) -> Result<Trigger, MiniFenceError> {
        let trigger = self.instantiate(&envelope.discriminator)?;
        trigger.hydrate_in(&envelope.data, self);
        Ok(trigger)
    }

    /// Decode a parsed JSON envelope, or a string holding one.
    ///
    /// # Errors
    ///
    /// Envelope shape errors from [`Envelope::from_value`], or
    /// [`MiniFenceError::UnknownTriggerType`].
    pub fn decode_value(&self, value: &Value) -> Result<Trigger, MiniFenceError> {
        self.decode(&Envelope::from_value(value)?)
    }

    /// Decode envelope JSON text.
    ///
    /// # Errors
    ///
    /// Parse errors from [`Envelope::parse`], or
    /// [`MiniFenceError::UnknownTriggerType`].
    pub fn decode_str(&self, raw: &str) -> Result<Trigger, MiniFenceError> {
        self.decode(&Envelope::parse(raw)?)
    }

    /// Decode a list of sibling envelopes. Entries that fail are logged and
    /// skipped; the remaining entries keep their order.
    pub fn decode_forest<'a>(&self, items: impl IntoIterator<Item = &'a Value>) -> Vec<Trigger> {
        self.decode_forest_counted(items).0
    }

    /// Like [`decode_forest`](Self::decode_forest), also returning how many
    /// entries were skipped at this level.
    pub fn decode_forest_counted<'a>(
        &self,
        items: impl IntoIterator<Item = &'a Value>,
    ) -> (Vec<Trigger>, usize) {
        let mut dropped = 0;
        let mut triggers = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            match self.decode_value(item) {
                Ok(trigger) => triggers.push(trigger),
                Err(err) => {
                    tracing::warn!(index, error = %err, "dropping trigger that failed to decode");
                    dropped += 1;
                }
            }
        }
        (triggers, dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::{ConnectorType, LocationMode};
    use serde_json::json;

    fn location_envelope() -> Value {
        json!({
            "type": LocationTrigger::DISCRIMINATOR,
            "data": {
                "latitude": 50.0,
                "longitude": 14.0,
                "distance": 200.0,
                "name": "home",
                "mode": 1,
                "lastRun": 0,
            },
        })
    }

    #[test]
    fn should_register_builtin_variants() {
        let registry = TriggerRegistry::builtin();
        assert!(registry.contains(LocationTrigger::DISCRIMINATOR));
        assert!(registry.contains(TriggerConnector::DISCRIMINATOR));
        assert!(!registry.contains("NoSuchTrigger"));
    }

    #[test]
    fn should_decode_location_envelope() {
        let trigger = TriggerRegistry::default()
            .decode_value(&location_envelope())
            .unwrap();
        let loc = trigger.as_location().unwrap();
        assert_eq!(loc.name(), "home");
        assert_eq!(loc.mode(), LocationMode::Inside);
    }

    #[test]
    fn should_fail_with_unknown_trigger_type() {
        let result = TriggerRegistry::default()
            .decode_str(r#"{"type":"NoSuchTrigger","data":{}}"#);
        assert!(matches!(
            result,
            Err(MiniFenceError::UnknownTriggerType { discriminator }) if discriminator == "NoSuchTrigger"
        ));
    }

    #[test]
    fn should_fail_on_unparsable_text() {
        let result = TriggerRegistry::default().decode_str("<xml/>");
        assert!(matches!(result, Err(MiniFenceError::EnvelopeParse(_))));
    }

    #[test]
    fn should_keep_default_instance_when_data_is_malformed() {
        let value = json!({"type": LocationTrigger::DISCRIMINATOR, "data": "{broken"});
        let trigger = TriggerRegistry::default().decode_value(&value).unwrap();
        assert!((trigger.as_location().unwrap().distance() - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_decode_sibling_when_one_entry_is_unknown() {
        let items = vec![
            json!({"type": "NoSuchTrigger", "data": {}}),
            location_envelope(),
        ];
        let triggers = TriggerRegistry::default().decode_forest(&items);
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].as_location().unwrap().name(), "home");
    }

    #[test]
    fn should_preserve_order_of_decoded_siblings() {
        let connector = TriggerConnector::new(ConnectorType::Or);
        let items = vec![
            connector_value(&connector),
            json!(null),
            location_envelope(),
        ];
        let triggers = TriggerRegistry::default().decode_forest(&items);
        assert_eq!(triggers.len(), 2);
        assert!(triggers[0].as_connector().is_some());
        assert!(triggers[1].as_location().is_some());
    }

    fn connector_value(c: &TriggerConnector) -> Value {
        Envelope::new(TriggerConnector::DISCRIMINATOR, c.encode_data()).to_value()
    }

    #[test]
    fn should_resolve_nested_children_through_custom_registry() {
        let mut registry = TriggerRegistry::empty();
        registry.register(TriggerConnector::DISCRIMINATOR, || {
            Trigger::Connector(TriggerConnector::default())
        });
        let value = json!({
            "type": TriggerConnector::DISCRIMINATOR,
            "data": {"connectorType": "OR", "triggerList": [location_envelope()]},
        });
        // location is not registered here, so the child is dropped
        let trigger = registry.decode_value(&value).unwrap();
        assert!(trigger.as_connector().unwrap().is_empty());
    }

    #[test]
    fn should_count_skipped_siblings() {
        let items = vec![
            location_envelope(),
            json!({"type": "NoSuchTrigger", "data": {}}),
            json!("<xml/>"),
        ];
        let (triggers, dropped) = TriggerRegistry::default().decode_forest_counted(&items);
        assert_eq!(triggers.len(), 1);
        assert_eq!(dropped, 2);
    }

    #[test]
    fn should_replace_constructor_on_reregistration() {
        let mut registry = TriggerRegistry::empty();
        registry.register("alias", || Trigger::Location(LocationTrigger::new()));
        registry.register("alias", || Trigger::Connector(TriggerConnector::default()));
        let trigger = registry.instantiate("alias").unwrap();
        assert!(trigger.as_connector().is_some());
    }

    #[test]
    fn should_roundtrip_decode_of_encode() {
        let original = TriggerRegistry::default()
            .decode_value(&location_envelope())
            .unwrap();
        original.executed(1_700_000_000_000);
        let decoded = TriggerRegistry::default()
            .decode(&original.encode())
            .unwrap();
        assert_eq!(decoded.encode(), original.encode());
        assert_eq!(decoded.last_run(), 1_700_000_000_000);
    }
}
