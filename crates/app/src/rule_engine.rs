//! Rule engine — polls every enabled rule and runs the actions of the ones
//! whose trigger fires.
//!
//! Each tick samples the clock and the last known position once, evaluates
//! every enabled rule against that snapshot, and for each rule that fires
//! runs its actions in order. The trigger's debounce clock is advanced only
//! once all actions succeeded, so a failed run is retried on the next tick.

use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use minifence_domain::error::MiniFenceError;
use minifence_domain::event::{Event, EventType};
use minifence_domain::id::RuleId;
use minifence_domain::rule::{Action, Rule};
use minifence_domain::time::EpochMillis;
use minifence_domain::trigger::{EvaluationContext, Trigger};

use crate::ports::{ActionExecutor, Clock, EventPublisher, LocationProvider};

/// Periodic trigger evaluator.
pub struct RuleEngine<L, C, X, P> {
    rules: Vec<Rule>,
    location: L,
    clock: C,
    executor: X,
    publisher: P,
}

impl<L, C, X, P> RuleEngine<L, C, X, P>
where
    L: LocationProvider + Sync,
    C: Clock + Sync,
    X: ActionExecutor + Sync,
    P: EventPublisher + Sync,
{
    /// Create a new engine.
    pub fn new(rules: Vec<Rule>, location: L, clock: C, executor: X, publisher: P) -> Self {
        Self {
            rules,
            location,
            clock,
            executor,
            publisher,
        }
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Sample the clock and the location provider once.
    pub fn snapshot(&self) -> EvaluationContext {
        EvaluationContext {
            now: self.clock.now(),
            position: self.location.last_known_position(),
        }
    }

    /// Evaluate every enabled rule once.
    ///
    /// Returns the ids of the rules whose actions all ran. A failing action
    /// is logged and published as [`EventType::RuleFailed`]; it never aborts
    /// the tick.
    #[tracing::instrument(skip(self), fields(rules = self.rules.len()))]
    pub async fn tick(&self) -> Vec<RuleId> {
        let ctx = self.snapshot();
        let mut fired = Vec::new();

        for rule in self.rules.iter().filter(|rule| rule.enabled) {
            if !evaluate(&rule.trigger, &ctx) {
                continue;
            }

            tracing::info!(rule_id = %rule.id, title = %rule.title, "rule fired");
            match self.execute_actions(rule).await {
                Ok(()) => {
                    rule.trigger.executed(ctx.now);
                    let data = serde_json::json!({ "title": rule.title });
                    self.emit(ctx.now, EventType::RuleFired, rule, data).await;
                    fired.push(rule.id);
                }
                Err(err) => {
                    tracing::error!(rule_id = %rule.id, error = %err, "rule actions failed");
                    let data = serde_json::json!({
                        "title": rule.title,
                        "error": err.to_string(),
                    });
                    self.emit(ctx.now, EventType::RuleFailed, rule, data).await;
                }
            }
        }

        fired
    }

    /// Tick every `period` until `shutdown` resolves. The first tick runs
    /// immediately; ticks missed while a slow one was running are skipped.
    ///
    /// Shutdown also interrupts a tick in progress, for instance one waiting
    /// on a long [`Action::Delay`]. The interrupted rule keeps its previous
    /// `lastRun`, so it is not debounced on the next start.
    pub async fn run(&self, period: Duration, shutdown: impl Future<Output = ()>) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        tracing::info!(?period, rules = self.rules.len(), "rule engine started");
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = interval.tick() => {}
            }
            tokio::select! {
                () = &mut shutdown => {
                    tracing::warn!("shutdown interrupted a running tick");
                    break;
                }
                _ = self.tick() => {}
            }
        }
        tracing::info!("rule engine stopped");
    }

    /// Execute actions in order, stopping at the first failure.
    async fn execute_actions(&self, rule: &Rule) -> Result<(), MiniFenceError> {
        for action in &rule.actions {
            match action {
                Action::Delay { seconds } => {
                    tokio::time::sleep(Duration::from_secs(*seconds)).await;
                }
                other => self.executor.execute(rule, other).await?,
            }
        }
        Ok(())
    }

    async fn emit(&self, at: EpochMillis, event_type: EventType, rule: &Rule, data: serde_json::Value) {
        let event = Event::at(at, event_type, Some(rule.id), data);
        if let Err(err) = self.publisher.publish(event).await {
            tracing::warn!(rule_id = %rule.id, error = %err, "failed to publish event");
        }
    }
}

/// A trigger that panics while evaluating counts as not firing.
fn evaluate(trigger: &Trigger, ctx: &EvaluationContext) -> bool {
    catch_unwind(AssertUnwindSafe(|| trigger.should_run(ctx))).unwrap_or_else(|_| {
        tracing::error!(
            discriminator = trigger.discriminator(),
            "trigger evaluation panicked"
        );
        false
    })
}
