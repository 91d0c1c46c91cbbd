use bson::Document;
use serde_json::Value;

use crate::{
    coerce,
    error::ExprError,
    expr::{ExprOption, RuleValue},
    mongo,
    op::{OpType, Operator, ensure_field, scalar_operand},
};

///
/// Equality and ordering operators
///
/// Equality widens numbers to `f64` on both sides, so wire representation
/// never decides a comparison; strings and booleans require the same
/// dynamic type on both sides, and a mismatch is a match error rather
/// than a silent false. Ordering operators are numeric-only.
///

pub(crate) struct EqualOp;

impl Operator for EqualOp {
    fn name(&self) -> OpType {
        OpType::Equal
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        let value = scalar_operand(self, value)?;
        if !coerce::is_basic(value) {
            return Err(ExprError::ValueShape {
                operator: self.name(),
                expected: "a basic value",
                value: value.to_string(),
            });
        }

        Ok(())
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        ensure_field(field)?;
        let value = scalar_operand(self, value)?;

        Ok(mongo::field_condition(
            field,
            mongo::key_value(mongo::EQ, mongo::to_bson(value)?),
        ))
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        let expected = scalar_operand(self, rule_value)?;

        coerce::compare_eq(value, expected).ok_or_else(|| ExprError::Incomparable {
            operator: self.name(),
            left: value.to_string(),
            right: expected.to_string(),
        })
    }
}

pub(crate) struct NotEqualOp;

impl Operator for NotEqualOp {
    fn name(&self) -> OpType {
        OpType::NotEqual
    }

    fn validate_value(&self, value: &RuleValue, opt: &ExprOption) -> Result<(), ExprError> {
        EqualOp.validate_value(value, opt)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        ensure_field(field)?;
        let value = scalar_operand(self, value)?;

        Ok(mongo::field_condition(
            field,
            mongo::key_value(mongo::NE, mongo::to_bson(value)?),
        ))
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        EqualOp.matches(value, rule_value).map(|hit| !hit)
    }
}

pub(crate) struct InOp;

impl Operator for InOp {
    fn name(&self) -> OpType {
        OpType::In
    }

    fn validate_value(&self, value: &RuleValue, opt: &ExprOption) -> Result<(), ExprError> {
        let value = scalar_operand(self, value)?;
        coerce::validate_basic_slice(&self.name(), value, opt.max_in_limit)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        ensure_field(field)?;
        let value = scalar_operand(self, value)?;

        Ok(mongo::field_condition(
            field,
            mongo::key_value(mongo::IN, mongo::to_bson(value)?),
        ))
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        let expected = scalar_operand(self, rule_value)?;

        let Value::Array(items) = expected else {
            return Err(ExprError::ValueShape {
                operator: self.name(),
                expected: "a non-empty array",
                value: expected.to_string(),
            });
        };
        if items.is_empty() {
            return Err(ExprError::EmptyArray);
        }

        if !coerce::is_basic(value) {
            return Err(ExprError::Incomparable {
                operator: self.name(),
                left: value.to_string(),
                right: expected.to_string(),
            });
        }

        // Elements of a different dynamic type simply do not match.
        Ok(items
            .iter()
            .any(|item| coerce::compare_eq(value, item) == Some(true)))
    }
}

pub(crate) struct NotInOp;

impl Operator for NotInOp {
    fn name(&self) -> OpType {
        OpType::NotIn
    }

    fn validate_value(&self, value: &RuleValue, opt: &ExprOption) -> Result<(), ExprError> {
        let value = scalar_operand(self, value)?;
        coerce::validate_basic_slice(&self.name(), value, opt.max_not_in_limit)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        ensure_field(field)?;
        let value = scalar_operand(self, value)?;

        Ok(mongo::field_condition(
            field,
            mongo::key_value(mongo::NIN, mongo::to_bson(value)?),
        ))
    }

    // Defined as the exact negation of `in`; delegating keeps the two
    // scans from drifting apart.
    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        InOp.matches(value, rule_value).map(|hit| !hit)
    }
}

// Shared behavior for the four numeric ordering operators.
fn validate_numeric(op: &dyn Operator, value: &RuleValue) -> Result<(), ExprError> {
    let value = scalar_operand(op, value)?;
    if !coerce::is_numeric(value) {
        return Err(ExprError::ValueShape {
            operator: op.name(),
            expected: "a numeric value",
            value: value.to_string(),
        });
    }

    Ok(())
}

fn ordering_to_mongo(
    op: &dyn Operator,
    key: &str,
    field: &str,
    value: &RuleValue,
) -> Result<Document, ExprError> {
    ensure_field(field)?;
    let value = scalar_operand(op, value)?;

    Ok(mongo::field_condition(
        field,
        mongo::key_value(key, mongo::to_bson(value)?),
    ))
}

fn ordering_matches(
    op: &dyn Operator,
    value: &Value,
    rule_value: &RuleValue,
    accept: impl FnOnce(std::cmp::Ordering) -> bool,
) -> Result<bool, ExprError> {
    let expected = scalar_operand(op, rule_value)?;

    coerce::compare_order(value, expected)
        .map(accept)
        .ok_or_else(|| ExprError::Incomparable {
            operator: op.name(),
            left: value.to_string(),
            right: expected.to_string(),
        })
}

pub(crate) struct LessOp;

impl Operator for LessOp {
    fn name(&self) -> OpType {
        OpType::Less
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_numeric(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        ordering_to_mongo(self, mongo::LT, field, value)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        ordering_matches(self, value, rule_value, std::cmp::Ordering::is_lt)
    }
}

pub(crate) struct LessOrEqualOp;

impl Operator for LessOrEqualOp {
    fn name(&self) -> OpType {
        OpType::LessOrEqual
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_numeric(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        ordering_to_mongo(self, mongo::LTE, field, value)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        ordering_matches(self, value, rule_value, std::cmp::Ordering::is_le)
    }
}

pub(crate) struct GreaterOp;

impl Operator for GreaterOp {
    fn name(&self) -> OpType {
        OpType::Greater
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_numeric(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        ordering_to_mongo(self, mongo::GT, field, value)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        ordering_matches(self, value, rule_value, std::cmp::Ordering::is_gt)
    }
}

pub(crate) struct GreaterOrEqualOp;

impl Operator for GreaterOrEqualOp {
    fn name(&self) -> OpType {
        OpType::GreaterOrEqual
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_numeric(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        ordering_to_mongo(self, mongo::GTE, field, value)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        ordering_matches(self, value, rule_value, std::cmp::Ordering::is_ge)
    }
}
