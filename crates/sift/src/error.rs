use crate::{expr::FieldType, op::OpType};
use thiserror::Error as ThisError;

///
/// ExprError
///
/// Error surface for decoding, validating, compiling, and matching filter
/// expressions. Every variant carries enough context (field name, operator
/// name, offending value) to localize the failing node; recursive walks
/// wrap failures in [`ExprError::Rule`] / [`ExprError::Field`] breadcrumbs
/// on the way out, so the caller sees a single error with a path instead
/// of a partial result.
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum ExprError {
    // ---- value shape ----
    #[error("operator {operator} expects {expected}, got value {value}")]
    ValueShape {
        operator: OpType,
        expected: &'static str,
        value: String,
    },

    #[error("array element at index {index} is not of {expected} type: {value}")]
    ElementShape {
        index: usize,
        expected: &'static str,
        value: String,
    },

    #[error("array value is empty")]
    EmptyArray,

    #[error("value {value} is not convertible to a datetime")]
    NotDatetime { value: String },

    // ---- validation policy ----
    #[error("expression should not be empty")]
    EmptyExpression,

    #[error("rule field can not be empty")]
    EmptyField,

    #[error("rule value can not be null")]
    NullValue,

    #[error("combined rules should not be empty")]
    EmptyRules,

    #[error("field '{field}' is not a supported filter field")]
    UnknownField { field: String },

    #[error("field '{field}' value {value} does not match the declared {declared} type")]
    FieldTypeMismatch {
        field: String,
        declared: FieldType,
        value: String,
    },

    #[error("field '{field}' of {declared} type does not support operator {operator}")]
    FieldTypeUnsupported {
        field: String,
        declared: FieldType,
        operator: OpType,
    },

    #[error("expression rules depth exceeds maximum")]
    DepthExceeded,

    #[error("rules count {count} exceeds maximum {limit}")]
    TooManyRules { count: usize, limit: u32 },

    #[error("operator {operator} array length {count} exceeds maximum {limit}")]
    TooManyElements {
        operator: OpType,
        count: usize,
        limit: u32,
    },

    // ---- operators ----
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    // ---- mongo compilation ----
    #[error("field '{field}' is not allowed under an array context, expected '{expected}'")]
    NonElementField {
        field: String,
        expected: &'static str,
    },

    #[error("value can not be encoded as a bson value: {reason}")]
    Bson { reason: String },

    // ---- matching ----
    #[error("operator {operator} can not compare {left} with {right}")]
    Incomparable {
        operator: OpType,
        left: String,
        right: String,
    },

    #[error("matched data is not a json document: {reason}")]
    InvalidDocument { reason: String },

    // ---- decoding ----
    #[error("rule decode failed: {reason}")]
    Decode { reason: String },

    // ---- breadcrumbs ----
    #[error("rules[{index}]: {source}")]
    Rule {
        index: usize,
        source: Box<ExprError>,
    },

    #[error("field '{field}' validate failed: {source}")]
    Field {
        field: String,
        source: Box<ExprError>,
    },
}

impl ExprError {
    /// Wrap a child failure with the index of the combined rule it came from.
    #[must_use]
    pub fn at_index(self, index: usize) -> Self {
        Self::Rule {
            index,
            source: Box::new(self),
        }
    }

    /// Wrap a failure with the field of the atomic rule it came from.
    #[must_use]
    pub fn at_field(self, field: impl Into<String>) -> Self {
        Self::Field {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Unwrap breadcrumb wrappers down to the originating failure.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Rule { source, .. } | Self::Field { source, .. } => source.root_cause(),
            _ => self,
        }
    }
}
