//! Response normalizer and record field accessors.
//!
//! Listing endpoints answer with a bare array, an object wrapping the array
//! under one of a few known keys, or a single record object. Everything is
//! flattened to `Vec<Record>` here so pagination only ever counts records.

use serde_json::Value;

/// Opaque API record. Shape varies per endpoint.
pub type Record = Value;

/// Known keys an object response may wrap its record list under, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperKey {
    Data,
    Users,
    Results,
}

impl WrapperKey {
    pub const ALL: [WrapperKey; 3] = [WrapperKey::Data, WrapperKey::Users, WrapperKey::Results];

    pub fn as_str(&self) -> &'static str {
        match self {
            WrapperKey::Data => "data",
            WrapperKey::Users => "users",
            WrapperKey::Results => "results",
        }
    }
}

/// Shape of one response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    List,
    Wrapped(WrapperKey),
    /// Object without a known wrapper key: taken as one record.
    Single,
    /// Empty object, null or scalar.
    Empty,
}

pub fn classify(body: &Value) -> ResponseShape {
    match body {
        Value::Array(_) => ResponseShape::List,
        Value::Object(map) => {
            if let Some(key) = WrapperKey::ALL.into_iter().find(|k| map.contains_key(k.as_str())) {
                ResponseShape::Wrapped(key)
            } else if map.is_empty() {
                ResponseShape::Empty
            } else {
                ResponseShape::Single
            }
        }
        _ => ResponseShape::Empty,
    }
}

/// Flatten a response body into its records.
///
/// A wrapper key holding `null` yields nothing; holding a non-list value it
/// yields that value as a single record.
pub fn extract_records(body: Value) -> Vec<Record> {
    match classify(&body) {
        ResponseShape::List => match body {
            Value::Array(items) => items,
            _ => Vec::new(),
        },
        ResponseShape::Wrapped(key) => match body {
            Value::Object(mut map) => match map.remove(key.as_str()) {
                Some(Value::Array(items)) => items,
                Some(Value::Null) | None => Vec::new(),
                Some(other) => vec![other],
            },
            _ => Vec::new(),
        },
        ResponseShape::Single => vec![body],
        ResponseShape::Empty => Vec::new(),
    }
}

/// First non-empty string among `keys`.
pub fn str_field<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| record.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

/// Owner of an activity: `userid`, falling back to `facultyid`.
/// Accepts strings and numbers; empty strings and zero count as absent.
pub fn user_id(activity: &Value) -> Option<String> {
    ["userid", "facultyid"].iter().find_map(|k| match activity.get(*k)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    })
}

/// `section.name` of an activity-section record.
pub fn section_name(record: &Value) -> String {
    record
        .get("section")
        .and_then(|s| s.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("Unknown Section")
        .to_string()
}

/// Activities of a section record; `None` when the record is not a section.
pub fn activities(record: &Value) -> Option<&Vec<Value>> {
    record.get("activities").and_then(Value::as_array)
}
