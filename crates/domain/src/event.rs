//! Event — an immutable record of something that happened.
//!
//! The engine publishes one event each time a rule fires or fails to run
//! its actions.

use serde::{Deserialize, Serialize};

use crate::id::{EventId, RuleId};
use crate::time::{EpochMillis, now_millis};

/// Kind of occurrence an [`Event`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A rule's trigger fired and all of its actions ran.
    RuleFired,
    /// A rule's trigger fired but an action failed.
    RuleFailed,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RuleFired => f.write_str("rule_fired"),
            Self::RuleFailed => f.write_str("rule_failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub rule_id: Option<RuleId>,
    pub data: serde_json::Value,
    pub timestamp: EpochMillis,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(event_type: EventType, rule_id: Option<RuleId>, data: serde_json::Value) -> Self {
        Self::at(now_millis(), event_type, rule_id, data)
    }

    /// Create an event stamped with `timestamp`.
    #[must_use]
    pub fn at(
        timestamp: EpochMillis,
        event_type: EventType,
        rule_id: Option<RuleId>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: EventId::next(),
            event_type,
            rule_id,
            data,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_stamp_event_with_given_time() {
        let rule_id = RuleId::new();
        let event = Event::at(1_000, EventType::RuleFired, Some(rule_id), serde_json::json!({}));
        assert_eq!(event.timestamp, 1_000);
        assert_eq!(event.rule_id, Some(rule_id));
    }

    #[test]
    fn should_generate_distinct_ids() {
        let a = Event::new(EventType::RuleFired, None, serde_json::json!({}));
        let b = Event::new(EventType::RuleFired, None, serde_json::json!({}));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn should_display_snake_case_type() {
        assert_eq!(EventType::RuleFired.to_string(), "rule_fired");
        assert_eq!(EventType::RuleFailed.to_string(), "rule_failed");
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let event = Event::new(
            EventType::RuleFailed,
            Some(RuleId::new()),
            serde_json::json!({"reason": "boom"}),
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"rule_failed\""));
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
