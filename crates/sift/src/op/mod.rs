use bson::Document;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::{
    error::ExprError,
    expr::{ExprOption, Rule, RuleValue},
};

mod collection;
mod compare;
mod datetime;
mod nullity;
mod structural;
mod text;

#[cfg(test)]
mod tests;

pub use structural::ELEMENT;

///
/// Operator registry
///
/// A fixed catalogue of named operators, each a stateless singleton
/// implementing three contracts that must stay semantically consistent
/// with each other: operand validation, Mongo compilation, and in-memory
/// matching. The catalogue is a static dispatch table — immutable after
/// process start, safe for concurrent lookup without locking.
///

///
/// OpType
///
/// Wire-level operator names. Unrecognized names decode into
/// [`OpType::Unknown`] and resolve to a sentinel operator whose every
/// method fails, so a bad name surfaces at validation rather than at
/// decode.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum OpType {
    Equal,
    NotEqual,
    In,
    NotIn,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    DatetimeLess,
    DatetimeLessOrEqual,
    DatetimeGreater,
    DatetimeGreaterOrEqual,
    BeginsWith,
    BeginsWithInsensitive,
    NotBeginsWith,
    NotBeginsWithInsensitive,
    Contains,
    ContainsSensitive,
    NotContains,
    NotContainsInsensitive,
    EndsWith,
    EndsWithInsensitive,
    NotEndsWith,
    NotEndsWithInsensitive,
    IsEmpty,
    IsNotEmpty,
    Size,
    IsNull,
    IsNotNull,
    Exist,
    NotExist,
    Object,
    Array,
    Unknown(String),
}

impl OpType {
    /// Resolve a wire name. Never fails; unrecognized names become
    /// [`OpType::Unknown`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "equal" => Self::Equal,
            "not_equal" => Self::NotEqual,
            "in" => Self::In,
            "not_in" => Self::NotIn,
            "less" => Self::Less,
            "less_or_equal" => Self::LessOrEqual,
            "greater" => Self::Greater,
            "greater_or_equal" => Self::GreaterOrEqual,
            "datetime_less" => Self::DatetimeLess,
            "datetime_less_or_equal" => Self::DatetimeLessOrEqual,
            "datetime_greater" => Self::DatetimeGreater,
            "datetime_greater_or_equal" => Self::DatetimeGreaterOrEqual,
            "begins_with" => Self::BeginsWith,
            "begins_with_i" => Self::BeginsWithInsensitive,
            "not_begins_with" => Self::NotBeginsWith,
            "not_begins_with_i" => Self::NotBeginsWithInsensitive,
            "contains" => Self::Contains,
            "contains_s" => Self::ContainsSensitive,
            "not_contains" => Self::NotContains,
            "not_contains_i" => Self::NotContainsInsensitive,
            "ends_with" => Self::EndsWith,
            "ends_with_i" => Self::EndsWithInsensitive,
            "not_ends_with" => Self::NotEndsWith,
            "not_ends_with_i" => Self::NotEndsWithInsensitive,
            "is_empty" => Self::IsEmpty,
            "is_not_empty" => Self::IsNotEmpty,
            "size" => Self::Size,
            "is_null" => Self::IsNull,
            "is_not_null" => Self::IsNotNull,
            "exist" => Self::Exist,
            "not_exist" => Self::NotExist,
            "filter_object" => Self::Object,
            "filter_array" => Self::Array,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The operator's wire name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "not_equal",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Less => "less",
            Self::LessOrEqual => "less_or_equal",
            Self::Greater => "greater",
            Self::GreaterOrEqual => "greater_or_equal",
            Self::DatetimeLess => "datetime_less",
            Self::DatetimeLessOrEqual => "datetime_less_or_equal",
            Self::DatetimeGreater => "datetime_greater",
            Self::DatetimeGreaterOrEqual => "datetime_greater_or_equal",
            Self::BeginsWith => "begins_with",
            Self::BeginsWithInsensitive => "begins_with_i",
            Self::NotBeginsWith => "not_begins_with",
            Self::NotBeginsWithInsensitive => "not_begins_with_i",
            Self::Contains => "contains",
            Self::ContainsSensitive => "contains_s",
            Self::NotContains => "not_contains",
            Self::NotContainsInsensitive => "not_contains_i",
            Self::EndsWith => "ends_with",
            Self::EndsWithInsensitive => "ends_with_i",
            Self::NotEndsWith => "not_ends_with",
            Self::NotEndsWithInsensitive => "not_ends_with_i",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
            Self::Size => "size",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
            Self::Exist => "exist",
            Self::NotExist => "not_exist",
            Self::Object => "filter_object",
            Self::Array => "filter_array",
            Self::Unknown(name) => name,
        }
    }

    /// Whether this operator name is part of the registered catalogue.
    pub fn validate(&self) -> Result<(), ExprError> {
        match self {
            Self::Unknown(name) => Err(ExprError::UnsupportedOperator(name.clone())),
            _ => Ok(()),
        }
    }

    /// Whether this operator's value is itself a sub-rule.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }

    /// Look up the operator singleton registered for this name.
    #[must_use]
    pub fn operator(&self) -> &'static dyn Operator {
        match self {
            Self::Equal => &compare::EqualOp,
            Self::NotEqual => &compare::NotEqualOp,
            Self::In => &compare::InOp,
            Self::NotIn => &compare::NotInOp,
            Self::Less => &compare::LessOp,
            Self::LessOrEqual => &compare::LessOrEqualOp,
            Self::Greater => &compare::GreaterOp,
            Self::GreaterOrEqual => &compare::GreaterOrEqualOp,
            Self::DatetimeLess => &datetime::DatetimeLessOp,
            Self::DatetimeLessOrEqual => &datetime::DatetimeLessOrEqualOp,
            Self::DatetimeGreater => &datetime::DatetimeGreaterOp,
            Self::DatetimeGreaterOrEqual => &datetime::DatetimeGreaterOrEqualOp,
            Self::BeginsWith => &text::BeginsWithOp,
            Self::BeginsWithInsensitive => &text::BeginsWithInsensitiveOp,
            Self::NotBeginsWith => &text::NotBeginsWithOp,
            Self::NotBeginsWithInsensitive => &text::NotBeginsWithInsensitiveOp,
            Self::Contains => &text::ContainsOp,
            Self::ContainsSensitive => &text::ContainsSensitiveOp,
            Self::NotContains => &text::NotContainsOp,
            Self::NotContainsInsensitive => &text::NotContainsInsensitiveOp,
            Self::EndsWith => &text::EndsWithOp,
            Self::EndsWithInsensitive => &text::EndsWithInsensitiveOp,
            Self::NotEndsWith => &text::NotEndsWithOp,
            Self::NotEndsWithInsensitive => &text::NotEndsWithInsensitiveOp,
            Self::IsEmpty => &collection::IsEmptyOp,
            Self::IsNotEmpty => &collection::IsNotEmptyOp,
            Self::Size => &collection::SizeOp,
            Self::IsNull => &nullity::IsNullOp,
            Self::IsNotNull => &nullity::IsNotNullOp,
            Self::Exist => &nullity::ExistOp,
            Self::NotExist => &nullity::NotExistOp,
            Self::Object => &structural::ObjectOp,
            Self::Array => &structural::ArrayOp,
            Self::Unknown(_) => &UnknownOp,
        }
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OpType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OpType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

///
/// Operator
///
/// The three contracts every registered operator implements. `matches`
/// receives the field's already-resolved value on the left and the rule's
/// operand on the right; `to_mongo` receives the fully-prefixed field
/// path. Implementations are pure and hold no state.
///

pub trait Operator: Send + Sync {
    /// The operator's registered name.
    fn name(&self) -> OpType;

    /// Validate that the rule operand has a legal shape for this operator.
    fn validate_value(&self, value: &RuleValue, opt: &ExprOption) -> Result<(), ExprError>;

    /// Compile this operator into a Mongo condition document.
    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError>;

    /// Evaluate this operator against a resolved record value.
    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError>;
}

///
/// UnknownOp
///
/// Sentinel for unregistered operator names; every contract fails.
///

pub(crate) struct UnknownOp;

impl Operator for UnknownOp {
    fn name(&self) -> OpType {
        OpType::Unknown("unknown".to_string())
    }

    fn validate_value(&self, _value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        Err(ExprError::UnsupportedOperator("unknown".to_string()))
    }

    fn to_mongo(&self, _field: &str, _value: &RuleValue) -> Result<Document, ExprError> {
        Err(ExprError::UnsupportedOperator("unknown".to_string()))
    }

    fn matches(&self, _value: &Value, _rule_value: &RuleValue) -> Result<bool, ExprError> {
        Err(ExprError::UnsupportedOperator("unknown".to_string()))
    }
}

// Field paths are required for every operator's Mongo compilation,
// the structural ones included.
fn ensure_field(field: &str) -> Result<(), ExprError> {
    if field.is_empty() {
        return Err(ExprError::EmptyField);
    }

    Ok(())
}

// Read a scalar/array operand, rejecting nested-rule operands.
fn scalar_operand<'a>(op: &dyn Operator, value: &'a RuleValue) -> Result<&'a Value, ExprError> {
    value.as_value().ok_or_else(|| ExprError::ValueShape {
        operator: op.name(),
        expected: "a plain value",
        value: "a nested rule".to_string(),
    })
}

// Read a nested-rule operand, rejecting plain values.
fn rule_operand<'a>(op: &dyn Operator, value: &'a RuleValue) -> Result<&'a Rule, ExprError> {
    value.as_rule().ok_or_else(|| ExprError::ValueShape {
        operator: op.name(),
        expected: "a nested rule",
        value: value.to_display_string(),
    })
}
