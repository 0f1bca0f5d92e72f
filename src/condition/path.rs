//! Field-path mini-language over generic JSON documents.
//!
//! Paths are dotted: `metadata.name`, `spec.containers.0.image`. A final `#`
//! segment yields the length of the array at that point, so
//! `metadata.finalizers.#` counts finalizers. Anything that cannot be
//! resolved is "absent" rather than an error; the predicate operators decide
//! what absence means.

use serde_json::Value;

/// Scalar extracted from a document. Composites (objects, arrays) render as
/// their compact JSON text so `eq`/`contains` can still see them.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl FieldValue {
    /// String form used by `eq`/`neq`/`contains`.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Int(number) => number.to_string(),
            FieldValue::Float(number) => number.to_string(),
            FieldValue::Bool(flag) => flag.to_string(),
        }
    }

    /// Integer form used by `lt`/`gt`. Strings must parse as base-10;
    /// floats truncate; booleans have no integer form.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(number) => Some(*number),
            FieldValue::Float(number) => Some(*number as i64),
            FieldValue::Text(text) => text.trim().parse().ok(),
            FieldValue::Bool(_) => None,
        }
    }
}

/// Resolve a dotted path against a document. `None` means the path does not
/// exist (including explicit JSON null).
pub fn resolve(document: &Value, path: &str) -> Option<FieldValue> {
    if path.is_empty() {
        return None;
    }
    let mut current = document;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if segment == "#" && segments.peek().is_none() {
            return current
                .as_array()
                .map(|items| FieldValue::Int(items.len() as i64));
        }
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    scalar(current)
}

fn scalar(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(FieldValue::Bool(*flag)),
        Value::Number(number) => number
            .as_i64()
            .map(FieldValue::Int)
            .or_else(|| number.as_f64().map(FieldValue::Float)),
        Value::String(text) => Some(FieldValue::Text(text.clone())),
        composite => Some(FieldValue::Text(composite.to_string())),
    }
}
