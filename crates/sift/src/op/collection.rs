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
/// Collection operators
///
/// Emptiness and length checks over array-typed fields. Operating on a
/// non-collection value is an error, never a silent false.
///

fn array_length(op: &dyn Operator, value: &Value) -> Result<usize, ExprError> {
    match value {
        Value::Array(items) => Ok(items.len()),
        _ => Err(ExprError::ValueShape {
            operator: op.name(),
            expected: "an array",
            value: value.to_string(),
        }),
    }
}

pub(crate) struct IsEmptyOp;

impl Operator for IsEmptyOp {
    fn name(&self) -> OpType {
        OpType::IsEmpty
    }

    fn validate_value(&self, _value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        Ok(())
    }

    fn to_mongo(&self, field: &str, _value: &RuleValue) -> Result<Document, ExprError> {
        ensure_field(field)?;

        Ok(mongo::field_condition(
            field,
            mongo::key_value(mongo::SIZE, 0),
        ))
    }

    fn matches(&self, value: &Value, _rule_value: &RuleValue) -> Result<bool, ExprError> {
        Ok(array_length(self, value)? == 0)
    }
}

pub(crate) struct IsNotEmptyOp;

impl Operator for IsNotEmptyOp {
    fn name(&self) -> OpType {
        OpType::IsNotEmpty
    }

    fn validate_value(&self, _value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        Ok(())
    }

    fn to_mongo(&self, field: &str, _value: &RuleValue) -> Result<Document, ExprError> {
        ensure_field(field)?;

        Ok(mongo::field_condition(
            field,
            mongo::key_value(mongo::SIZE, mongo::key_value(mongo::GT, 0)),
        ))
    }

    fn matches(&self, value: &Value, _rule_value: &RuleValue) -> Result<bool, ExprError> {
        Ok(array_length(self, value)? > 0)
    }
}

pub(crate) struct SizeOp;

impl Operator for SizeOp {
    fn name(&self) -> OpType {
        OpType::Size
    }

    fn validate_value(&self, value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        let value = scalar_operand(self, value)?;
        if coerce::as_non_negative_int(value).is_none() {
            return Err(ExprError::ValueShape {
                operator: self.name(),
                expected: "a non-negative integer",
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
            mongo::key_value(mongo::SIZE, mongo::to_bson(value)?),
        ))
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        let expected = scalar_operand(self, rule_value)?;

        let length = array_length(self, value)?;
        let wanted = coerce::as_non_negative_int(expected).ok_or_else(|| ExprError::ValueShape {
            operator: self.name(),
            expected: "a non-negative integer",
            value: expected.to_string(),
        })?;

        Ok(length as i64 == wanted)
    }
}
