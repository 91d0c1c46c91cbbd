use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::Error as DeError,
};
use serde_json::{Map, Value};

use crate::{
    error::ExprError,
    expr::{AtomRule, CombinedRule, Condition, Rule, RuleValue},
    op::OpType,
};

///
/// Wire codec
///
/// A rule payload is polymorphic: a `condition` key selects a combined
/// rule, an `operator` key selects an atomic one, and a payload carrying
/// neither is a decode error. The peek-then-dispatch happens at every
/// recursion level — each element of a combined rule's `rules` array and
/// each structural sub-rule goes through the same dispatcher. Decoding
/// buffers through a self-describing value first, so the one codec serves
/// JSON and BSON alike.
///

const CONDITION_KEY: &str = "condition";
const OPERATOR_KEY: &str = "operator";
const RULES_KEY: &str = "rules";
const FIELD_KEY: &str = "field";
const VALUE_KEY: &str = "value";

impl Rule {
    /// Decode a rule from a buffered wire value.
    pub(crate) fn from_wire(raw: &Value) -> Result<Self, ExprError> {
        let Value::Object(map) = raw else {
            return Err(decode_error(format!("rule must be an object, got {raw}")));
        };

        if map.contains_key(CONDITION_KEY) {
            return CombinedRule::from_wire(map).map(Self::Combined);
        }

        if map.contains_key(OPERATOR_KEY) {
            return AtomRule::from_wire(map).map(Self::Atom);
        }

        Err(decode_error(
            "no rule found: payload has neither 'condition' nor 'operator'",
        ))
    }
}

impl CombinedRule {
    fn from_wire(map: &Map<String, Value>) -> Result<Self, ExprError> {
        let condition = match map.get(CONDITION_KEY).and_then(Value::as_str) {
            Some("AND") => Condition::And,
            Some("OR") => Condition::Or,
            Some(other) => {
                return Err(decode_error(format!("unsupported condition: {other}")));
            }
            None => return Err(decode_error("condition must be a string")),
        };

        let raw_rules = match map.get(RULES_KEY) {
            Some(Value::Array(rules)) => rules,
            Some(other) => {
                return Err(decode_error(format!("rules must be an array, got {other}")));
            }
            None => return Err(decode_error("combined rule requires a 'rules' array")),
        };

        let mut rules = Vec::with_capacity(raw_rules.len());
        for (index, raw) in raw_rules.iter().enumerate() {
            let rule = Rule::from_wire(raw)
                .map_err(|err| decode_error(format!("rules[{index}]: {err}")))?;
            rules.push(rule);
        }

        Ok(Self::new(condition, rules))
    }
}

impl AtomRule {
    fn from_wire(map: &Map<String, Value>) -> Result<Self, ExprError> {
        let field = match map.get(FIELD_KEY) {
            Some(Value::String(field)) => field.clone(),
            Some(other) => {
                return Err(decode_error(format!("field must be a string, got {other}")));
            }
            None => return Err(decode_error("atomic rule requires a 'field'")),
        };

        let operator = match map.get(OPERATOR_KEY) {
            Some(Value::String(name)) => OpType::from_name(name),
            Some(other) => {
                return Err(decode_error(format!(
                    "operator must be a string, got {other}"
                )));
            }
            None => return Err(decode_error("atomic rule requires an 'operator'")),
        };

        // An absent value decodes as null; validation rejects it later.
        let raw_value = map.get(VALUE_KEY).cloned().unwrap_or(Value::Null);

        let value = if operator.is_structural() {
            let sub_rule = Rule::from_wire(&raw_value)
                .map_err(|err| decode_error(format!("{operator} value: {err}")))?;
            RuleValue::Rule(Box::new(sub_rule))
        } else {
            RuleValue::Value(raw_value)
        };

        Ok(Self {
            field,
            operator,
            value,
        })
    }
}

fn decode_error(reason: impl Into<String>) -> ExprError {
    ExprError::Decode {
        reason: reason.into(),
    }
}

impl Serialize for RuleValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => value.serialize(serializer),
            Self::Rule(rule) => rule.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Rule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Self::from_wire(&raw).map_err(D::Error::custom)
    }
}

impl<'de> Deserialize<'de> for AtomRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Rule::deserialize(deserializer)? {
            Rule::Atom(atom) => Ok(atom),
            Rule::Combined(_) => Err(D::Error::custom("expected an atomic rule")),
        }
    }
}

impl<'de> Deserialize<'de> for CombinedRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Rule::deserialize(deserializer)? {
            Rule::Combined(combined) => Ok(combined),
            Rule::Atom(_) => Err(D::Error::custom("expected a combined rule")),
        }
    }
}
