//! Identifiers.
//!
//! Rules are persisted, so [`RuleId`] is a random UUID that stays stable
//! across restarts and is written as a plain string. Events never leave
//! the process; [`EventId`] is a sequence number that orders them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Stable identifier of a [`Rule`](crate::rule::Rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(uuid::Uuid);

impl RuleId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

static NEXT_EVENT: AtomicU64 = AtomicU64::new(1);

/// Position of an [`Event`](crate::event::Event) in the order the process
/// created them. Starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    /// Take the next number of the process-wide sequence.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_EVENT.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
