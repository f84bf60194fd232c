//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`MiniFenceError`] via `#[from]` or an explicit `From` impl.
//!
//! Two failure kinds never become error values: a missing or malformed
//! individual field during hydration is replaced by a default, and a fault
//! during evaluation degrades to "do not fire".

/// Base error for every fallible operation in minifence.
#[derive(Debug, thiserror::Error)]
pub enum MiniFenceError {
    /// No constructor is registered for the envelope discriminator.
    #[error("unknown trigger type {discriminator:?}")]
    UnknownTriggerType { discriminator: String },

    /// The raw text is not JSON at all.
    #[error("failed to parse trigger envelope")]
    EnvelopeParse(#[from] serde_json::Error),

    /// The JSON does not have the `{"type": …, "data": …}` shape.
    #[error("malformed trigger envelope")]
    MalformedEnvelope(#[from] MalformedEnvelope),

    /// A stored rule record does not have the expected shape.
    #[error("invalid rule record")]
    InvalidRule(#[source] serde_json::Error),

    /// A rule-level invariant does not hold.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// An adapter failed to execute an action.
    #[error("action error")]
    Action(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Structural problems with a persisted envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedEnvelope {
    #[error("envelope is not a JSON object")]
    NotAnObject,

    #[error("envelope has no string `type` field")]
    MissingType,
}

/// Rule invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("a rule needs at least one action")]
    NoActions,
}
