//! Action port — performs the side effects of a fired rule.

use std::future::Future;

use minifence_domain::error::MiniFenceError;
use minifence_domain::rule::{Action, Rule};

/// Executes rule actions that leave the process (notifications, …).
///
/// Flow control such as [`Action::Delay`] is handled by the engine and
/// never reaches the executor.
pub trait ActionExecutor {
    fn execute(
        &self,
        rule: &Rule,
        action: &Action,
    ) -> impl Future<Output = Result<(), MiniFenceError>> + Send;
}

impl<T: ActionExecutor + Send + Sync> ActionExecutor for std::sync::Arc<T> {
    fn execute(
        &self,
        rule: &Rule,
        action: &Action,
    ) -> impl Future<Output = Result<(), MiniFenceError>> + Send {
        (**self).execute(rule, action)
    }
}
