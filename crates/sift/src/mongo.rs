use bson::{Bson, Document};
use serde_json::Value;

use crate::error::ExprError;

///
/// MongoDB query-document vocabulary
///
/// The operator keys the compiler emits, plus the small helpers used to
/// assemble `{field: {key: value}}` shaped condition documents. Keys are
/// centralized here so every operator compiles against the same spellings.
///

pub const EQ: &str = "$eq";
pub const NE: &str = "$ne";
pub const IN: &str = "$in";
pub const NIN: &str = "$nin";
pub const LT: &str = "$lt";
pub const LTE: &str = "$lte";
pub const GT: &str = "$gt";
pub const GTE: &str = "$gte";
pub const REGEX: &str = "$regex";
pub const OPTIONS: &str = "$options";
pub const NOT: &str = "$not";
pub const SIZE: &str = "$size";
pub const EXISTS: &str = "$exists";
pub const AND: &str = "$and";
pub const OR: &str = "$or";

/// Case-insensitive regex option flag.
pub const CASE_INSENSITIVE: &str = "i";

/// Encode a rule operand into a bson value.
pub(crate) fn to_bson(value: &Value) -> Result<Bson, ExprError> {
    bson::to_bson(value).map_err(|err| ExprError::Bson {
        reason: err.to_string(),
    })
}

/// Build a single-key document: `{key: value}`.
#[must_use]
pub(crate) fn key_value(key: &str, value: impl Into<Bson>) -> Document {
    let mut doc = Document::new();
    doc.insert(key, value);
    doc
}

/// Build a field condition document: `{field: condition}`.
#[must_use]
pub(crate) fn field_condition(field: &str, condition: Document) -> Document {
    let mut doc = Document::new();
    doc.insert(field, condition);
    doc
}
