//! Lenient accessors over loosely shaped JSON records.
//!
//! Log producers disagree on field names and value types, so every lookup
//! here takes a list of alternate names and coerces what it finds.

use chrono::DateTime;
use serde_json::Value;

/// Truthiness as the log producers use it: empty strings, zero and null are unset.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// First field among `keys` holding a non-null value.
pub fn first_present<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

/// First field among `keys` holding a truthy value.
pub fn first_truthy<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| truthy(value))
}

/// Finite number from a number, numeric string or boolean.
pub fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    };

    parsed.filter(|n| n.is_finite())
}

/// Number coercion with 0 for anything absent or non-numeric.
pub fn number_or_zero(value: Option<&Value>) -> f64 {
    value.and_then(number).unwrap_or(0.0)
}

/// Millisecond timestamp from a number or an RFC 3339 string.
pub fn timestamp(value: &Value) -> Option<f64> {
    if let Some(millis) = number(value) {
        return Some(millis);
    }

    value
        .as_str()
        .and_then(|text| DateTime::parse_from_rfc3339(text.trim()).ok())
        .map(|at| at.timestamp_millis() as f64)
}

/// String form of a scalar identifier. Numbers are stringified.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Array elements, or nothing when the field is missing or not an array.
pub fn items<'a>(record: Option<&'a Value>) -> &'a [Value] {
    record
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
