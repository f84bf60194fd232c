//! Logging action executor — performs no side effect beyond a log line.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use minifence_app::ports::ActionExecutor;
use minifence_domain::error::MiniFenceError;
use minifence_domain::id::RuleId;
use minifence_domain::rule::{Action, Rule};

/// One action as seen by [`LoggingActionExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedAction {
    pub rule_id: RuleId,
    pub rule_title: String,
    pub action: Action,
}

/// Executes every action by logging it at `info` level.
///
/// Clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct LoggingActionExecutor {
    history: Arc<Mutex<Vec<ExecutedAction>>>,
}

impl LoggingActionExecutor {
    /// Every action executed so far, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<ExecutedAction> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ActionExecutor for LoggingActionExecutor {
    fn execute(
        &self,
        rule: &Rule,
        action: &Action,
    ) -> impl Future<Output = Result<(), MiniFenceError>> + Send {
        match action {
            Action::Notify { message } => {
                tracing::info!(rule_id = %rule.id, title = %rule.title, %message, "notification");
            }
            other => {
                tracing::info!(rule_id = %rule.id, title = %rule.title, action = %other, "action");
            }
        }
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ExecutedAction {
                rule_id: rule.id,
                rule_title: rule.title.clone(),
                action: action.clone(),
            });
        async { Ok(()) }
    }
}
