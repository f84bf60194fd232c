//! Lenient field readers used during hydration.
//!
//! Each reader returns a zero/empty default for a missing or mistyped field
//! instead of failing. Numeric strings are accepted.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::error::{MalformedEnvelope, MiniFenceError};

/// View `data` as a JSON object. A string holding object JSON is accepted.
pub(crate) fn data_object(data: &Value) -> Result<Cow<'_, Map<String, Value>>, MiniFenceError> {
    match data {
        Value::Object(map) => Ok(Cow::Borrowed(map)),
        Value::String(raw) => match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => Ok(Cow::Owned(map)),
            _ => Err(MalformedEnvelope::NotAnObject.into()),
        },
        _ => Err(MalformedEnvelope::NotAnObject.into()),
    }
}

/// A JSON number for `value`, without a fraction when it is whole, which is
/// how stored rules have always written decimals. Non-finite values become
/// `null`.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub(crate) fn decimal(value: f64) -> Value {
    // whole numbers above 2^53 are no longer exact as integers
    const EXACT_LIMIT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() < EXACT_LIMIT {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

pub(crate) fn f64_or_zero(map: &Map<String, Value>, key: &str) -> f64 {
    match map.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn i64_or_zero(map: &Map<String, Value>, key: &str) -> i64 {
    match map.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

pub(crate) fn string_or_empty(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
        _ => String::new(),
    }
}
