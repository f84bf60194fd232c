//! Connector — combines child triggers with a logical operator.
//!
//! Connectors are how rule trees are built: the root of every rule is a
//! trigger, and a connector is a trigger whose children are triggers.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Value, json};

use super::fields::{data_object, string_or_empty};
use super::{EvaluationContext, Icon, Trigger, TriggerRegistry, TriggerVariant};
use crate::form::{Form, Widget};
use crate::i18n::{Localizer, TextKey};
use crate::parameter::{Select, SelectOption};
use crate::time::EpochMillis;

/// Logical operator applied between children, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorType {
    And,
    Or,
    Xor,
}

impl ConnectorType {
    /// Persisted name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "XOR" => Some(Self::Xor),
            _ => None,
        }
    }

    #[must_use]
    pub const fn apply(self, a: bool, b: bool) -> bool {
        match self {
            Self::And => a && b,
            Self::Or => a || b,
            Self::Xor => a ^ b,
        }
    }

    #[must_use]
    pub const fn label_key(self) -> TextKey {
        match self {
            Self::And => TextKey::ConnectorAnd,
            Self::Or => TextKey::ConnectorOr,
            Self::Xor => TextKey::ConnectorXor,
        }
    }
}

/// Selectable connector operators, shared by every connector.
pub static CONNECTOR_TYPES: [SelectOption<ConnectorType>; 3] = [
    SelectOption {
        value: ConnectorType::And,
        label: TextKey::ConnectorAnd,
    },
    SelectOption {
        value: ConnectorType::Or,
        label: TextKey::ConnectorOr,
    },
    SelectOption {
        value: ConnectorType::Xor,
        label: TextKey::ConnectorXor,
    },
];

#[derive(Debug)]
struct ConnectorState {
    kind: Select<ConnectorType>,
    children: Vec<Trigger>,
    /// Children skipped by the last hydration.
    dropped: usize,
    last_run: EpochMillis,
}

/// A trigger combining ordered children.
#[derive(Debug)]
pub struct TriggerConnector {
    state: Mutex<ConnectorState>,
}

impl Default for TriggerConnector {
    fn default() -> Self {
        Self::new(ConnectorType::And)
    }
}

impl TriggerConnector {
    #[must_use]
    pub fn new(kind: ConnectorType) -> Self {
        Self {
            state: Mutex::new(ConnectorState {
                kind: Select::new(&CONNECTOR_TYPES, kind),
                children: Vec::new(),
                dropped: 0,
                last_run: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConnectorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn kind(&self) -> ConnectorType {
        self.lock().kind.get()
    }

    pub fn set_kind(&self, kind: ConnectorType) -> &Self {
        self.lock().kind.set(kind);
        self
    }

    pub fn push(&self, child: impl Into<Trigger>) -> &Self {
        self.lock().children.push(child.into());
        self
    }

    /// Remove and return the child at `index`.
    pub fn remove(&self, index: usize) -> Option<Trigger> {
        let mut state = self.lock();
        (index < state.children.len()).then(|| state.children.remove(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().children.is_empty()
    }

    /// Borrow the children for the duration of `f`.
    pub fn with_children<R>(&self, f: impl FnOnce(&[Trigger]) -> R) -> R {
        f(&self.lock().children)
    }

    /// Children skipped while decoding, in this connector and every nested
    /// one. Re-encoding a tree with a non-zero count loses those entries.
    #[must_use]
    pub fn dropped_children(&self) -> usize {
        let state = self.lock();
        state.dropped
            + state
                .children
                .iter()
                .map(Trigger::dropped_entries)
                .sum::<usize>()
    }

    /// Run `f` against the operator picker while holding the lock.
    pub fn edit<R>(&self, f: impl FnOnce(&mut Form<'_>) -> R) -> R {
        let mut state = self.lock();
        let mut form = Form::new()
            .heading(TextKey::Connector)
            .field(TextKey::Connector, Widget::Choice(&mut state.kind));
        f(&mut form)
    }

    /// Hydrate, decoding children through `registry`. Children that fail to
    /// decode are dropped one by one; their siblings still load.
    pub fn hydrate_in(&self, data: &Value, registry: &TriggerRegistry) -> &Self {
        let data = match data_object(data) {
            Ok(data) => data,
            Err(err) => {
                tracing::error!(error = %err, "cannot hydrate connector");
                return self;
            }
        };
        let kind = ConnectorType::parse(&string_or_empty(&data, "connectorType"))
            .unwrap_or(ConnectorType::And);
        let (children, dropped) = match data.get("triggerList") {
            Some(Value::Array(items)) => registry.decode_forest_counted(items),
            _ => (Vec::new(), 0),
        };

        let mut state = self.lock();
        state.kind.set(kind);
        state.children = children;
        state.dropped = dropped;
        drop(state);
        self
    }
}

impl TriggerVariant for TriggerConnector {
    const DISCRIMINATOR: &'static str =
        "info.nightscout.androidaps.plugins.general.automation.triggers.TriggerConnector";

    /// Combines children left to right. An empty connector never fires.
    fn should_run(&self, ctx: &EvaluationContext) -> bool {
        let state = self.lock();
        let kind = state.kind.get();
        let mut children = state.children.iter();
        let Some(first) = children.next() else {
            return false;
        };
        children.fold(first.should_run(ctx), |acc, child| {
            kind.apply(acc, child.should_run(ctx))
        })
    }

    fn encode_data(&self) -> Value {
        let state = self.lock();
        let children: Vec<Value> = state
            .children
            .iter()
            .map(|child| child.encode().to_value())
            .collect();
        json!({
            "connectorType": state.kind.get().as_str(),
            "triggerList": children,
        })
    }

    fn hydrate(&self, data: &Value) -> &Self {
        self.hydrate_in(data, TriggerRegistry::builtin())
    }

    fn friendly_name(&self) -> TextKey {
        TextKey::Connector
    }

    fn describe(&self, i18n: &dyn Localizer) -> String {
        let state = self.lock();
        let parts: Vec<String> = state
            .children
            .iter()
            .map(|child| child.describe(i18n))
            .collect();
        format!(
            "{} ({})",
            i18n.lookup(state.kind.get().label_key()),
            parts.join(", ")
        )
    }

    fn icon(&self) -> Option<Icon> {
        None
    }

    fn duplicate(&self) -> Self {
        let state = self.lock();
        Self {
            state: Mutex::new(ConnectorState {
                kind: Select::new(&CONNECTOR_TYPES, state.kind.get()),
                children: state.children.iter().map(Trigger::duplicate).collect(),
                dropped: state.dropped,
                last_run: state.last_run,
            }),
        }
    }

    fn last_run(&self) -> EpochMillis {
        self.lock().last_run
    }

    fn executed(&self, now: EpochMillis) {
        let mut state = self.lock();
        state.last_run = now;
        for child in &state.children {
            child.executed(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::i18n::English;
    use crate::trigger::{LocationMode, LocationTrigger};

    const NOW: EpochMillis = 1_700_000_000_000;

    fn always(fire: bool) -> Trigger {
        // a huge inside geofence fires everywhere, an unset one never does
        let t = LocationTrigger::new();
        t.set_distance(1e9)
            .set_name(if fire { "yes" } else { "no" })
            .set_mode(if fire {
                LocationMode::Inside
            } else {
                LocationMode::Unset
            });
        t.into()
    }

    fn ctx() -> EvaluationContext {
        EvaluationContext {
            now: NOW,
            position: Some(GeoPoint::new(0.0, 0.0)),
        }
    }

    fn connector(kind: ConnectorType, children: &[bool]) -> TriggerConnector {
        let c = TriggerConnector::new(kind);
        for &fire in children {
            c.push(always(fire));
        }
        c
    }

    #[test]
    fn should_never_fire_when_empty() {
        for kind in [ConnectorType::And, ConnectorType::Or, ConnectorType::Xor] {
            assert!(!TriggerConnector::new(kind).should_run(&ctx()));
        }
    }

    #[test]
    fn should_combine_with_and() {
        assert!(connector(ConnectorType::And, &[true, true]).should_run(&ctx()));
        assert!(!connector(ConnectorType::And, &[true, false]).should_run(&ctx()));
    }

    #[test]
    fn should_combine_with_or() {
        assert!(connector(ConnectorType::Or, &[false, true]).should_run(&ctx()));
        assert!(!connector(ConnectorType::Or, &[false, false]).should_run(&ctx()));
    }

    #[test]
    fn should_combine_with_xor_left_to_right() {
        assert!(connector(ConnectorType::Xor, &[true, false]).should_run(&ctx()));
        assert!(!connector(ConnectorType::Xor, &[true, true]).should_run(&ctx()));
        assert!(connector(ConnectorType::Xor, &[true, true, true]).should_run(&ctx()));
    }

    #[test]
    fn should_use_single_child_result() {
        assert!(connector(ConnectorType::And, &[true]).should_run(&ctx()));
        assert!(!connector(ConnectorType::Or, &[false]).should_run(&ctx()));
    }

    #[test]
    fn should_count_unknown_children_at_every_depth() {
        let inner = serde_json::json!({
            "type": TriggerConnector::DISCRIMINATOR,
            "data": {
                "connectorType": "OR",
                "triggerList": [{"type": "com.example.TriggerBg", "data": {}}],
            },
        });
        let data = serde_json::json!({
            "connectorType": "AND",
            "triggerList": [
                Trigger::from(LocationTrigger::new()).encode().to_value(),
                {"type": "com.example.TriggerTime", "data": {}},
                inner,
            ],
        });
        let c = TriggerConnector::default();
        c.hydrate(&data);

        assert_eq!(c.len(), 2);
        assert_eq!(c.dropped_children(), 2);
        assert_eq!(c.duplicate().dropped_children(), 2);
    }

    #[test]
    fn should_report_no_drops_for_built_tree() {
        assert_eq!(connector(ConnectorType::And, &[true, false]).dropped_children(), 0);
    }

    #[test]
    fn should_roundtrip_children() {
        let c = connector(ConnectorType::Or, &[true, false]);
        let copy = TriggerConnector::default();
        copy.hydrate(&c.encode_data());
        assert_eq!(copy.kind(), ConnectorType::Or);
        assert_eq!(copy.len(), 2);
        assert_eq!(copy.encode_data(), c.encode_data());
    }

    #[test]
    fn should_drop_only_undecodable_children() {
        let data = json!({
            "connectorType": "AND",
            "triggerList": [
                {"type": "NoSuchTrigger", "data": {}},
                always(true).encode().to_value(),
                "not even json",
            ],
        });
        let c = TriggerConnector::default();
        c.hydrate(&data);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn should_accept_children_encoded_as_strings() {
        let data = json!({
            "connectorType": "XOR",
            "triggerList": [always(true).to_json()],
        });
        let c = TriggerConnector::default();
        c.hydrate(&data);
        assert_eq!(c.kind(), ConnectorType::Xor);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn should_default_unknown_operator_to_and() {
        let c = TriggerConnector::new(ConnectorType::Or);
        c.hydrate(&json!({"connectorType": "NAND"}));
        assert_eq!(c.kind(), ConnectorType::And);
        assert!(c.is_empty());
    }

    #[test]
    fn should_mark_children_executed() {
        let c = connector(ConnectorType::And, &[true, true]);
        c.executed(NOW);
        assert_eq!(c.last_run(), NOW);
        c.with_children(|children| {
            assert!(children.iter().all(|child| child.last_run() == NOW));
        });
        assert!(!c.should_run(&ctx()));
    }

    #[test]
    fn should_duplicate_children_independently() {
        let a = connector(ConnectorType::And, &[true]);
        let b = a.duplicate();
        b.push(always(false));
        b.with_children(|children| {
            children[0].as_location().unwrap().set_name("changed");
        });
        assert_eq!(a.len(), 1);
        a.with_children(|children| {
            assert_eq!(children[0].as_location().unwrap().name(), "yes");
        });
    }

    #[test]
    fn should_remove_child_by_index() {
        let c = connector(ConnectorType::And, &[true, false]);
        assert!(c.remove(5).is_none());
        let removed = c.remove(0).unwrap();
        assert_eq!(removed.as_location().unwrap().name(), "yes");
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn should_describe_operator_and_children() {
        let c = connector(ConnectorType::Or, &[true]);
        assert_eq!(
            c.describe(&English),
            "Or (Location is Inside area yes)"
        );
        assert_eq!(c.icon(), None);
    }

    #[test]
    fn should_edit_operator_through_form() {
        let c = TriggerConnector::default();
        c.edit(|form| {
            if let Some(Widget::Choice(choice)) = form.widget_mut(TextKey::Connector) {
                choice.select_index(2);
            }
        });
        assert_eq!(c.kind(), ConnectorType::Xor);
    }
}
