use bson::Document;
use serde_json::Value;

use crate::{
    error::ExprError,
    expr::{ExprOption, RuleValue},
    mongo,
    op::{OpType, Operator, ensure_field, scalar_operand},
};

///
/// String-match operators
///
/// Prefix, suffix, and substring families, each in case-sensitive and
/// case-insensitive flavors with exact logical negations. The bare
/// `contains` name is case-insensitive and `contains_s` is its sensitive
/// counterpart, matching the older query-builder convention; every other
/// name is sensitive unless suffixed `_i`. Case folding lower-cases both
/// operands and is not locale-aware. Compilation emits `$regex`
/// conditions with `^`/`$` anchors and an `i` option for insensitive
/// variants; negations wrap the condition in `$not`.
///

// Where the operand anchors within the candidate string.
#[derive(Clone, Copy)]
enum Anchor {
    Prefix,
    Suffix,
    Substring,
}

impl Anchor {
    fn pattern(self, operand: &str) -> String {
        match self {
            Self::Prefix => format!("^{operand}"),
            Self::Suffix => format!("{operand}$"),
            Self::Substring => operand.to_string(),
        }
    }

    fn check(self, candidate: &str, operand: &str) -> bool {
        match self {
            Self::Prefix => candidate.starts_with(operand),
            Self::Suffix => candidate.ends_with(operand),
            Self::Substring => candidate.contains(operand),
        }
    }
}

fn validate_text(op: &dyn Operator, value: &RuleValue) -> Result<(), ExprError> {
    let value = scalar_operand(op, value)?;
    match value {
        Value::String(text) if !text.is_empty() => Ok(()),
        _ => Err(ExprError::ValueShape {
            operator: op.name(),
            expected: "a non-empty string",
            value: value.to_string(),
        }),
    }
}

fn text_to_mongo(
    op: &dyn Operator,
    field: &str,
    value: &RuleValue,
    anchor: Anchor,
    insensitive: bool,
    negate: bool,
) -> Result<Document, ExprError> {
    ensure_field(field)?;
    let value = scalar_operand(op, value)?;

    let Value::String(operand) = value else {
        return Err(ExprError::ValueShape {
            operator: op.name(),
            expected: "a non-empty string",
            value: value.to_string(),
        });
    };

    let mut condition = mongo::key_value(mongo::REGEX, anchor.pattern(operand));
    if insensitive {
        condition.insert(mongo::OPTIONS, mongo::CASE_INSENSITIVE);
    }

    if negate {
        condition = mongo::key_value(mongo::NOT, condition);
    }

    Ok(mongo::field_condition(field, condition))
}

fn text_matches(
    op: &dyn Operator,
    value: &Value,
    rule_value: &RuleValue,
    anchor: Anchor,
    insensitive: bool,
    negate: bool,
) -> Result<bool, ExprError> {
    let expected = scalar_operand(op, rule_value)?;

    let (Value::String(candidate), Value::String(operand)) = (value, expected) else {
        return Err(ExprError::Incomparable {
            operator: op.name(),
            left: value.to_string(),
            right: expected.to_string(),
        });
    };

    let hit = if insensitive {
        anchor.check(&candidate.to_lowercase(), &operand.to_lowercase())
    } else {
        anchor.check(candidate, operand)
    };

    Ok(hit != negate)
}

pub(crate) struct BeginsWithOp;

impl Operator for BeginsWithOp {
    fn name(&self) -> OpType {
        OpType::BeginsWith
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_text(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        text_to_mongo(self, field, value, Anchor::Prefix, false, false)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        text_matches(self, value, rule_value, Anchor::Prefix, false, false)
    }
}

pub(crate) struct BeginsWithInsensitiveOp;

impl Operator for BeginsWithInsensitiveOp {
    fn name(&self) -> OpType {
        OpType::BeginsWithInsensitive
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_text(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        text_to_mongo(self, field, value, Anchor::Prefix, true, false)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        text_matches(self, value, rule_value, Anchor::Prefix, true, false)
    }
}

pub(crate) struct NotBeginsWithOp;

impl Operator for NotBeginsWithOp {
    fn name(&self) -> OpType {
        OpType::NotBeginsWith
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_text(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        text_to_mongo(self, field, value, Anchor::Prefix, false, true)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        text_matches(self, value, rule_value, Anchor::Prefix, false, true)
    }
}

pub(crate) struct NotBeginsWithInsensitiveOp;

impl Operator for NotBeginsWithInsensitiveOp {
    fn name(&self) -> OpType {
        OpType::NotBeginsWithInsensitive
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_text(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        text_to_mongo(self, field, value, Anchor::Prefix, true, true)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        text_matches(self, value, rule_value, Anchor::Prefix, true, true)
    }
}

pub(crate) struct ContainsOp;

impl Operator for ContainsOp {
    fn name(&self) -> OpType {
        OpType::Contains
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_text(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        text_to_mongo(self, field, value, Anchor::Substring, true, false)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        text_matches(self, value, rule_value, Anchor::Substring, true, false)
    }
}

pub(crate) struct ContainsSensitiveOp;

impl Operator for ContainsSensitiveOp {
    fn name(&self) -> OpType {
        OpType::ContainsSensitive
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_text(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        text_to_mongo(self, field, value, Anchor::Substring, false, false)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        text_matches(self, value, rule_value, Anchor::Substring, false, false)
    }
}

pub(crate) struct NotContainsOp;

impl Operator for NotContainsOp {
    fn name(&self) -> OpType {
        OpType::NotContains
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_text(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        text_to_mongo(self, field, value, Anchor::Substring, false, true)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        text_matches(self, value, rule_value, Anchor::Substring, false, true)
    }
}

pub(crate) struct NotContainsInsensitiveOp;

impl Operator for NotContainsInsensitiveOp {
    fn name(&self) -> OpType {
        OpType::NotContainsInsensitive
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_text(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        text_to_mongo(self, field, value, Anchor::Substring, true, true)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        text_matches(self, value, rule_value, Anchor::Substring, true, true)
    }
}

pub(crate) struct EndsWithOp;

impl Operator for EndsWithOp {
    fn name(&self) -> OpType {
        OpType::EndsWith
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_text(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        text_to_mongo(self, field, value, Anchor::Suffix, false, false)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        text_matches(self, value, rule_value, Anchor::Suffix, false, false)
    }
}

pub(crate) struct EndsWithInsensitiveOp;

impl Operator for EndsWithInsensitiveOp {
    fn name(&self) -> OpType {
        OpType::EndsWithInsensitive
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_text(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        text_to_mongo(self, field, value, Anchor::Suffix, true, false)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        text_matches(self, value, rule_value, Anchor::Suffix, true, false)
    }
}

pub(crate) struct NotEndsWithOp;

impl Operator for NotEndsWithOp {
    fn name(&self) -> OpType {
        OpType::NotEndsWith
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_text(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        text_to_mongo(self, field, value, Anchor::Suffix, false, true)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        text_matches(self, value, rule_value, Anchor::Suffix, false, true)
    }
}

pub(crate) struct NotEndsWithInsensitiveOp;

impl Operator for NotEndsWithInsensitiveOp {
    fn name(&self) -> OpType {
        OpType::NotEndsWithInsensitive
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_text(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        text_to_mongo(self, field, value, Anchor::Suffix, true, true)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        text_matches(self, value, rule_value, Anchor::Suffix, true, true)
    }
}
