//! Rule — trigger → action.
//!
//! A rule owns the root of a trigger tree and the actions to run when that
//! tree fires. Rules are stored as JSON; the trigger travels inside its
//! type-tagged envelope.

mod action;

pub use action::Action;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{MiniFenceError, ValidationError};
use crate::id::RuleId;
use crate::trigger::{Trigger, TriggerConnector, TriggerRegistry};

/// A trigger tree plus the actions it guards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub title: String,
    pub enabled: bool,
    pub trigger: Trigger,
    pub actions: Vec<Action>,
}

/// Stored shape of a rule, with the trigger still undecoded.
#[derive(Debug, Deserialize)]
struct RuleRecord {
    #[serde(default)]
    id: RuleId,
    title: String,
    #[serde(default = "enabled_by_default")]
    enabled: bool,
    trigger: Value,
    #[serde(default)]
    actions: Vec<Action>,
}

fn enabled_by_default() -> bool {
    true
}

impl Rule {
    /// Create a builder for constructing a [`Rule`].
    #[must_use]
    pub fn builder() -> RuleBuilder {
        RuleBuilder::default()
    }

    /// Check rule invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MiniFenceError::Validation`] when:
    /// - `title` is empty ([`ValidationError::EmptyTitle`])
    /// - `actions` is empty ([`ValidationError::NoActions`])
    pub fn validate(&self) -> Result<(), MiniFenceError> {
        if self.title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        if self.actions.is_empty() {
            return Err(ValidationError::NoActions.into());
        }
        Ok(())
    }

    /// Trigger entries skipped while this rule was decoded.
    ///
    /// A non-zero count means [`encode`](Self::encode) no longer reproduces
    /// the stored record.
    #[must_use]
    pub fn dropped_entries(&self) -> usize {
        self.trigger.dropped_entries()
    }

    /// Stored JSON form.
    #[must_use]
    pub fn encode(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "enabled": self.enabled,
            "trigger": self.trigger.encode().to_value(),
            "actions": self.actions,
        })
    }

    /// Decode one stored rule, resolving its trigger through `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`MiniFenceError::InvalidRule`] if the record itself is
    /// malformed, any trigger decode error, or a validation error.
    pub fn decode(registry: &TriggerRegistry, value: &Value) -> Result<Self, MiniFenceError> {
        let record: RuleRecord =
            serde_json::from_value(value.clone()).map_err(MiniFenceError::InvalidRule)?;
        let rule = Self {
            id: record.id,
            title: record.title,
            enabled: record.enabled,
            trigger: registry.decode_value(&record.trigger)?,
            actions: record.actions,
        };
        rule.validate()?;
        Ok(rule)
    }
}

/// Decode a list of stored rules. A rule that fails to decode is logged
/// and skipped; the others load normally.
pub fn decode_rules<'a>(
    registry: &TriggerRegistry,
    items: impl IntoIterator<Item = &'a Value>,
) -> Vec<Rule> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match Rule::decode(registry, item) {
            Ok(rule) => Some(rule),
            Err(err) => {
                tracing::warn!(index, error = %err, "dropping rule that failed to decode");
                None
            }
        })
        .collect()
}

/// Encode rules into a JSON array.
#[must_use]
pub fn encode_rules(rules: &[Rule]) -> Value {
    Value::Array(rules.iter().map(Rule::encode).collect())
}

/// Step-by-step builder for [`Rule`].
#[derive(Debug, Default)]
pub struct RuleBuilder {
    id: Option<RuleId>,
    title: Option<String>,
    enabled: Option<bool>,
    trigger: Option<Trigger>,
    actions: Vec<Action>,
}

impl RuleBuilder {
    #[must_use]
    pub fn id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: impl Into<Trigger>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Consume the builder, validate, and return a [`Rule`].
    ///
    /// A missing trigger defaults to an empty AND connector, which never
    /// fires.
    ///
    /// # Errors
    ///
    /// Returns [`MiniFenceError::Validation`] if required fields are missing or empty.
    pub fn build(self) -> Result<Rule, MiniFenceError> {
        let rule = Rule {
            id: self.id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            enabled: self.enabled.unwrap_or(true),
            trigger: self
                .trigger
                .unwrap_or_else(|| Trigger::Connector(TriggerConnector::default())),
            actions: self.actions,
        };
        rule.validate()?;
        Ok(rule)
    }
}
