//! Action — the effect performed when a rule fires.

use serde::{Deserialize, Serialize};

/// An operation to execute once the rule's trigger fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Show a notification to the user.
    Notify { message: String },
    /// Wait for a specified duration before continuing to the next action.
    Delay {
        /// Number of seconds to wait.
        seconds: u64,
    },
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notify { message } => write!(f, "notify({message})"),
            Self::Delay { seconds } => write!(f, "delay({seconds}s)"),
        }
    }
}
