//! Envelope — the persisted `{"type": …, "data": …}` wrapper.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MalformedEnvelope, MiniFenceError};

/// Type-tagged persisted form of a trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub discriminator: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    #[must_use]
    pub fn new(discriminator: impl Into<String>, data: Value) -> Self {
        Self {
            discriminator: discriminator.into(),
            data,
        }
    }

    /// Read an envelope out of an already parsed JSON value.
    ///
    /// A string value is treated as JSON text holding the envelope, which is
    /// how nested triggers were stored by older writers.
    ///
    /// # Errors
    ///
    /// Returns [`MiniFenceError::EnvelopeParse`] if a string value is not
    /// JSON, or [`MiniFenceError::MalformedEnvelope`] if the value is not an
    /// object with a string `type`.
    pub fn from_value(value: &Value) -> Result<Self, MiniFenceError> {
        match value {
            Value::Object(map) => {
                let discriminator = map
                    .get("type")
                    .and_then(Value::as_str)
                    .ok_or(MalformedEnvelope::MissingType)?;
                Ok(Self::new(
                    discriminator,
                    map.get("data").cloned().unwrap_or(Value::Null),
                ))
            }
            Value::String(raw) => Self::parse(raw),
            _ => Err(MalformedEnvelope::NotAnObject.into()),
        }
    }

    /// Parse envelope JSON text.
    ///
    /// # Errors
    ///
    /// Same as [`Envelope::from_value`].
    pub fn parse(raw: &str) -> Result<Self, MiniFenceError> {
        let value: Value = serde_json::from_str(raw)?;
        match value {
            Value::Object(_) => Self::from_value(&value),
            _ => Err(MalformedEnvelope::NotAnObject.into()),
        }
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "type": self.discriminator,
            "data": self.data,
        })
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}
