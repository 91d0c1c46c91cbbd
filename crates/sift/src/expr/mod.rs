use bson::Document;
use serde::{Deserialize, Serialize};

use crate::{error::ExprError, matcher::MatchedData};

mod option;
mod rule;
mod wire;


pub use option::{
    DEFAULT_MAX_IN_LIMIT, DEFAULT_MAX_NOT_IN_LIMIT, DEFAULT_MAX_RULES_DEPTH,
    DEFAULT_MAX_RULES_LIMIT, ExprOption, FieldType, ParentType, RuleOption,
};
pub use rule::{AtomRule, CombinedRule, Condition, Rule, RuleValue};

///
/// Expression
///
/// The public entry type: a wrapper holding one root rule. An empty
/// expression serializes to JSON/BSON `null` — never to an empty
/// document — so stores can distinguish "no filter" from "empty filter".
/// Expressions are built fresh per request, validated once, then either
/// compiled once or matched repeatedly.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Expression {
    pub rule: Option<Rule>,
}

impl Expression {
    #[must_use]
    pub const fn new(rule: Rule) -> Self {
        Self { rule: Some(rule) }
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self { rule: None }
    }

    /// Wrap rules under one `AND` root.
    #[must_use]
    pub fn and(rules: Vec<Rule>) -> Self {
        Self::new(Rule::Combined(CombinedRule::new(Condition::And, rules)))
    }

    /// Wrap rules under one `OR` root.
    #[must_use]
    pub fn or(rules: Vec<Rule>) -> Self {
        Self::new(Rule::Combined(CombinedRule::new(Condition::Or, rules)))
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rule.is_none()
    }

    /// Decode an expression from a JSON payload.
    pub fn from_json(raw: &str) -> Result<Self, ExprError> {
        serde_json::from_str(raw).map_err(|err| ExprError::Decode {
            reason: err.to_string(),
        })
    }

    /// Encode this expression as a JSON payload.
    pub fn to_json(&self) -> Result<String, ExprError> {
        serde_json::to_string(self).map_err(|err| ExprError::Decode {
            reason: err.to_string(),
        })
    }

    /// Validate the root rule against the caller's policy.
    pub fn validate(&self, opt: &ExprOption) -> Result<(), ExprError> {
        let rule = self.rule.as_ref().ok_or(ExprError::EmptyExpression)?;
        rule.validate(opt)
    }

    /// Compile the root rule into a Mongo query document.
    pub fn to_mongo(&self) -> Result<Document, ExprError> {
        let rule = self.rule.as_ref().ok_or(ExprError::EmptyExpression)?;
        rule.to_mongo()
    }

    /// Evaluate the root rule against a record.
    pub fn matches<D: MatchedData + ?Sized>(&self, data: &D) -> Result<bool, ExprError> {
        let rule = self.rule.as_ref().ok_or(ExprError::EmptyExpression)?;
        rule.matches(data)
    }

    /// Flattened list of leaf fields the filter touches.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        self.rule.as_ref().map(Rule::fields).unwrap_or_default()
    }

    /// Nesting depth of the root rule; `0` for an empty expression.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.rule.as_ref().map_or(0, Rule::depth)
    }
}

impl From<Rule> for Expression {
    fn from(rule: Rule) -> Self {
        Self::new(rule)
    }
}
