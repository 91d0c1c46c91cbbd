use bson::Document;
use serde_json::{Map, Value};

use crate::{
    error::ExprError,
    expr::{ExprOption, ParentType, RuleOption, RuleValue},
    matcher::{JsonData, MapData},
    op::{OpType, Operator, ensure_field, rule_operand},
};

///
/// Structural operators
///
/// `filter_object` and `filter_array` carry a nested rule as their operand
/// and recurse into embedded data. Compilation threads a parent-field
/// context through the sub-rule so leaf conditions come out with
/// dot-prefixed paths; matching re-roots the walk by constructing a fresh
/// data adapter over the resolved nested value at every recursion level.
///

/// Reserved leaf field name addressing the elements of an array field.
pub const ELEMENT: &str = "element";

pub(crate) struct ObjectOp;

impl Operator for ObjectOp {
    fn name(&self) -> OpType {
        OpType::Object
    }

    fn validate_value(&self, value: &RuleValue, opt: &ExprOption) -> Result<(), ExprError> {
        let sub_rule = rule_operand(self, value)?;

        if opt.max_rules_depth <= 1 {
            return Err(ExprError::DepthExceeded);
        }

        sub_rule.validate(&opt.descend())
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        ensure_field(field)?;
        let sub_rule = rule_operand(self, value)?;

        let parent = RuleOption {
            parent: field.to_string(),
            parent_type: ParentType::Object,
        };

        sub_rule.to_mongo_with(Some(&parent))
    }

    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        let sub_rule = rule_operand(self, rule_value)?;

        match value {
            Value::Object(_) => sub_rule.matches(&JsonData::from_value(value.clone())),

            // An array field drills down with the store's native array
            // semantics: the condition holds if any element object does.
            Value::Array(items) => {
                for item in items {
                    if !item.is_object() {
                        continue;
                    }

                    if sub_rule.matches(&JsonData::from_value(item.clone()))? {
                        return Ok(true);
                    }
                }

                Ok(false)
            }

            _ => Err(ExprError::ValueShape {
                operator: self.name(),
                expected: "an object",
                value: value.to_string(),
            }),
        }
    }
}

pub(crate) struct ArrayOp;

impl Operator for ArrayOp {
    fn name(&self) -> OpType {
        OpType::Array
    }

    fn validate_value(&self, value: &RuleValue, opt: &ExprOption) -> Result<(), ExprError> {
        let sub_rule = rule_operand(self, value)?;

        if opt.max_rules_depth <= 1 {
            return Err(ExprError::DepthExceeded);
        }

        sub_rule.validate(&opt.descend())
    }

    fn to_mongo(&self, field: &str, value: &RuleValue) -> Result<Document, ExprError> {
        ensure_field(field)?;
        let sub_rule = rule_operand(self, value)?;

        let parent = RuleOption {
            parent: field.to_string(),
            parent_type: ParentType::Array,
        };

        sub_rule.to_mongo_with(Some(&parent))
    }

    // The sub-rule addresses the reserved `element` field, so matching
    // wraps the resolved array in a synthetic single-key document and
    // evaluates the sub-rule once against it.
    fn matches(&self, value: &Value, rule_value: &RuleValue) -> Result<bool, ExprError> {
        let sub_rule = rule_operand(self, rule_value)?;

        if !value.is_array() {
            return Err(ExprError::ValueShape {
                operator: self.name(),
                expected: "an array",
                value: value.to_string(),
            });
        }

        let mut wrapper = Map::new();
        wrapper.insert(ELEMENT.to_string(), value.clone());

        sub_rule.matches(&MapData::new(wrapper))
    }
}
