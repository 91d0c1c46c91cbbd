use bson::Document;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    coerce,
    error::ExprError,
    expr::{ExprOption, RuleValue},
    mongo,
    op::{OpType, Operator, ensure_field, scalar_operand},
};

///
/// Datetime ordering operators
///
/// Operands are resolved through the permissive converter (Unix
/// timestamps, RFC 3339, `YYYY-MM-DD[ HH:MM:SS]`) on both sides. The
/// compiler materializes a concrete bson datetime rather than passing the
/// raw operand through, so the store never re-interprets timezone-less
/// strings.
///

fn validate_datetime(op: &dyn Operator, value: &RuleValue) -> Result<(), ExprError> {
    let value = scalar_operand(op, value)?;
    if !coerce::is_datetime(value) {
        return Err(ExprError::NotDatetime {
            value: value.to_string(),
        });
    }

    Ok(())
}

fn datetime_to_mongo(
    op: &dyn Operator,
    key: &str,
    field: &str,
    value: &RuleValue,
) -> Result<Document, ExprError> {
    ensure_field(field)?;
    let value = scalar_operand(op, value)?;

    let instant = coerce::to_datetime(value).ok_or_else(|| ExprError::NotDatetime {
        value: value.to_string(),
    })?;

    Ok(mongo::field_condition(
        field,
        mongo::key_value(key, bson::DateTime::from_chrono(instant)),
    ))
}

fn datetime_matches(
    op: &dyn Operator,
    value: &Value,
    rule_value: &RuleValue,
    accept: impl FnOnce(DateTime<Utc>, DateTime<Utc>) -> bool,
) -> Result<bool, ExprError> {
    let expected = scalar_operand(op, rule_value)?;

    let left = coerce::to_datetime(value).ok_or_else(|| ExprError::NotDatetime {
        value: value.to_string(),
    })?;
    let right = coerce::to_datetime(expected).ok_or_else(|| ExprError::NotDatetime {
        value: expected.to_string(),
    })?;

    Ok(accept(left, right))
}

pub(crate) struct DatetimeLessOp;

impl Operator for DatetimeLessOp {
    fn name(&self) -> OpType {
        OpType::DatetimeLess
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_datetime(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        datetime_to_mongo(self, mongo::LT, field, value)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        datetime_matches(self, value, rule_value, |left, right| left < right)
    }
}

pub(crate) struct DatetimeLessOrEqualOp;

impl Operator for DatetimeLessOrEqualOp {
    fn name(&self) -> OpType {
        OpType::DatetimeLessOrEqual
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_datetime(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        datetime_to_mongo(self, mongo::LTE, field, value)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        datetime_matches(self, value, rule_value, |left, right| left <= right)
    }
}

pub(crate) struct DatetimeGreaterOp;

impl Operator for DatetimeGreaterOp {
    fn name(&self) -> OpType {
        OpType::DatetimeGreater
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_datetime(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        datetime_to_mongo(self, mongo::GT, field, value)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        datetime_matches(self, value, rule_value, |left, right| left > right)
    }
}

pub(crate) struct DatetimeGreaterOrEqualOp;

impl Operator for DatetimeGreaterOrEqualOp {
    fn name(&self) -> OpType {
        OpType::DatetimeGreaterOrEqual
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        validate_datetime(self, value)
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        datetime_to_mongo(self, mongo::GTE, field, value)
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        datetime_matches(self, value, rule_value, |left, right| left >= right)
    }
}
