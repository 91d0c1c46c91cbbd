use serde_json::{Map, Value};

use crate::error::ExprError;

///
/// In-memory matching
///
/// The matcher walks a rule tree against a keyed data accessor instead of
/// a database. Any type exposing `get_value` can back a match; the two
/// built-in adapters read a parsed JSON document (field is a
/// dot-separated path) and a flat map (field is a bare key).
///
/// CONTRACT: an absent field resolves to `Value::Null`, not an error —
/// the existence operators test that placeholder.
///

pub trait MatchedData {
    /// Resolve a field to its current value.
    fn get_value(&self, field: &str) -> Result<Value, ExprError>;
}

///
/// JsonData
///
/// A JSON-document-backed accessor. Fields are dot-separated paths;
/// numeric segments index into arrays.
///

#[derive(Clone, Debug)]
pub struct JsonData {
    value: Value,
}

impl JsonData {
    /// Parse a raw JSON document.
    pub fn new(raw: &str) -> Result<Self, ExprError> {
        let value = serde_json::from_str(raw).map_err(|err| ExprError::InvalidDocument {
            reason: err.to_string(),
        })?;

        Ok(Self { value })
    }

    /// Wrap an already-parsed document.
    #[must_use]
    pub const fn from_value(value: Value) -> Self {
        Self { value }
    }
}

impl MatchedData for JsonData {
    fn get_value(&self, field: &str) -> Result<Value, ExprError> {
        let mut current = &self.value;

        for segment in field.split('.') {
            current = match current {
                Value::Object(map) => match map.get(segment) {
                    Some(next) => next,
                    None => return Ok(Value::Null),
                },
                Value::Array(items) => match segment.parse::<usize>().ok().and_then(|i| items.get(i)) {
                    Some(next) => next,
                    None => return Ok(Value::Null),
                },
                _ => return Ok(Value::Null),
            };
        }

        Ok(current.clone())
    }
}

///
/// MapData
///
/// A flat-map accessor. Fields are bare keys with no nested-path support;
/// nested access is only reachable through the structural operators,
/// which construct a fresh adapter at each recursion level.
///

#[derive(Clone, Debug, Default)]
pub struct MapData {
    values: Map<String, Value>,
}

impl MapData {
    #[must_use]
    pub const fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl MatchedData for MapData {
    fn get_value(&self, field: &str) -> Result<Value, ExprError> {
        Ok(self.values.get(field).cloned().unwrap_or(Value::Null))
    }
}

/// TESTS
///
