use bson::{Bson, Document};
use serde_json::Value;

use crate::{
    error::ExprError,
    expr::{ExprOption, RuleValue},
    mongo,
    op::{OpType, Operator, ensure_field},
};

///
/// Null and existence operators
///
/// These test the resolved left operand only; the rule operand is unused.
///
/// CONTRACT: callers resolve an absent field to a null placeholder before
/// matching, so `exist` matches when the resolved value IS that
/// placeholder and `not_exist` when it is not. The inversion is the
/// upstream convention and is deliberately preserved; Mongo compilation
/// still emits the plain `$exists: true/false` forms.
///

pub(crate) struct IsNullOp;

impl Operator for IsNullOp {
    fn name(&self) -> OpType {
        OpType::IsNull
    }

    fn validate_value(&self, _value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        Ok(())
    }

    fn to_mongo(&self, field: &str, _value: &RuleValue) -> Result<Document, ExprError> {
        ensure_field(field)?;

        Ok(mongo::field_condition(
            field,
            mongo::key_value(mongo::EQ, Bson::Null),
        ))
    }

    fn matches(&self, value: &Value, _rule_value: &RuleValue) -> Result<bool, ExprError> {
        Ok(value.is_null())
    }
}

pub(crate) struct IsNotNullOp;

impl Operator for IsNotNullOp {
    fn name(&self) -> OpType {
        OpType::IsNotNull
    }

    fn validate_value(&self, _value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        Ok(())
    }

    fn to_mongo(&self, field: &str, _value: &RuleValue) -> Result<Document, ExprError> {
        ensure_field(field)?;

        Ok(mongo::field_condition(
            field,
            mongo::key_value(mongo::NE, Bson::Null),
        ))
    }

    fn matches(&self, value: &Value, _rule_value: &RuleValue) -> Result<bool, ExprError> {
        Ok(!value.is_null())
    }
}

pub(crate) struct ExistOp;

impl Operator for ExistOp {
    fn name(&self) -> OpType {
        OpType::Exist
    }

    fn validate_value(&self, _value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        Ok(())
    }

    fn to_mongo(&self, field: &str, _value: &RuleValue) -> Result<Document, ExprError> {
        ensure_field(field)?;

        Ok(mongo::field_condition(
            field,
            mongo::key_value(mongo::EXISTS, true),
        ))
    }

    fn matches(&self, value: &Value, _rule_value: &RuleValue) -> Result<bool, ExprError> {
        Ok(value.is_null())
    }
}

pub(crate) struct NotExistOp;

impl Operator for NotExistOp {
    fn name(&self) -> OpType {
        OpType::NotExist
    }

    fn validate_value(&self, _value: &RuleValue, _opt: &ExprOption) -> Result<(), ExprError> {
        Ok(())
    }

    fn to_mongo(&self, field: &str, _value: &RuleValue) -> Result<Document, ExprError> {
        ensure_field(field)?;

        Ok(mongo::field_condition(
            field,
            mongo::key_value(mongo::EXISTS, false),
        ))
    }

    fn matches(&self, value: &Value, _rule_value: &RuleValue) -> Result<bool, ExprError> {
        Ok(!value.is_null())
    }
}
