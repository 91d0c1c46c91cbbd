use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::{BitAnd, BitOr};

use crate::{
    coerce,
    error::ExprError,
    expr::{ExprOption, FieldType, ParentType, RuleOption},
    matcher::MatchedData,
    mongo,
    op::{ELEMENT, OpType},
};

///
/// Rule model
///
/// A filter is a recursive tree of two node shapes: an atomic
/// `field / operator / value` leaf, and an `AND`/`OR` combination of
/// child rules. A rule is immutable once validated; validation,
/// compilation, and matching only read the tree and thread a context
/// value through the walk.
///

///
/// Condition
///
/// Logic operator joining the children of a combined rule.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Condition {
    And,
    Or,
}

impl Condition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    /// The Mongo document key this condition compiles to.
    #[must_use]
    pub(crate) const fn mongo_key(self) -> &'static str {
        match self {
            Self::And => mongo::AND,
            Self::Or => mongo::OR,
        }
    }
}

///
/// RuleValue
///
/// An atomic rule's operand: a plain (scalar or array) value for most
/// operators, or a nested rule for the two structural operators. Decode
/// selects the shape from the atom's operator name; serialization is
/// transparent either way.
///

#[derive(Clone, Debug, PartialEq)]
pub enum RuleValue {
    Value(Value),
    Rule(Box<Rule>),
}

impl RuleValue {
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Rule(_) => None,
        }
    }

    #[must_use]
    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Self::Value(_) => None,
            Self::Rule(rule) => Some(rule),
        }
    }

    #[must_use]
    pub(crate) fn to_display_string(&self) -> String {
        match self {
            Self::Value(value) => value.to_string(),
            Self::Rule(_) => "a nested rule".to_string(),
        }
    }

    const fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }
}

impl From<Value> for RuleValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Rule> for RuleValue {
    fn from(rule: Rule) -> Self {
        Self::Rule(Box::new(rule))
    }
}

///
/// AtomRule
///
/// A leaf predicate.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AtomRule {
    pub field: String,
    pub operator: OpType,
    pub value: RuleValue,
}

impl AtomRule {
    #[must_use]
    pub fn new(field: impl Into<String>, operator: OpType, value: impl Into<RuleValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn equal(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, OpType::Equal, value)
    }

    #[must_use]
    pub fn not_equal(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, OpType::NotEqual, value)
    }

    #[must_use]
    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, OpType::In, Value::Array(values))
    }

    #[must_use]
    pub fn not_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, OpType::NotIn, Value::Array(values))
    }

    #[must_use]
    pub fn less(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, OpType::Less, value)
    }

    #[must_use]
    pub fn less_or_equal(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, OpType::LessOrEqual, value)
    }

    #[must_use]
    pub fn greater(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, OpType::Greater, value)
    }

    #[must_use]
    pub fn greater_or_equal(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, OpType::GreaterOrEqual, value)
    }

    /// Filter an object-typed field through a nested rule.
    #[must_use]
    pub fn filter_object(field: impl Into<String>, rule: Rule) -> Self {
        Self::new(field, OpType::Object, rule)
    }

    /// Filter an array-typed field through a nested rule over the
    /// reserved `element` field.
    #[must_use]
    pub fn filter_array(field: impl Into<String>, rule: Rule) -> Self {
        Self::new(field, OpType::Array, rule)
    }

    /// Validate this leaf against the caller's policy.
    pub fn validate(&self, opt: &ExprOption) -> Result<(), ExprError> {
        if self.field.is_empty() {
            return Err(ExprError::EmptyField);
        }

        self.operator.validate()?;

        if self.value.is_null() {
            return Err(ExprError::NullValue);
        }

        if !opt.ignore_rule_fields {
            let declared =
                *opt.rule_fields
                    .get(&self.field)
                    .ok_or_else(|| ExprError::UnknownField {
                        field: self.field.clone(),
                    })?;

            self.validate_declared_type(declared)?;
        }

        let operator = self.operator.operator();
        let result = if self.operator.is_structural() {
            operator.validate_value(&self.value, &opt.narrowed(&self.field))
        } else {
            operator.validate_value(&self.value, opt)
        };

        result.map_err(|err| err.at_field(&self.field))
    }

    // Check the operand against the field's declared type. Structural
    // operators require a container-typed field; collection operators an
    // array-typed one; nullity operators accept any declared type; the
    // rest compare the operand's shape to the declared scalar type,
    // arrays element-wise.
    fn validate_declared_type(&self, declared: FieldType) -> Result<(), ExprError> {
        let unsupported = || ExprError::FieldTypeUnsupported {
            field: self.field.clone(),
            declared,
            operator: self.operator.clone(),
        };

        match self.operator {
            OpType::Object => match declared {
                FieldType::Object | FieldType::MapString => Ok(()),
                _ => Err(unsupported()),
            },
            OpType::Array | OpType::IsEmpty | OpType::IsNotEmpty | OpType::Size => {
                match declared {
                    FieldType::Array => Ok(()),
                    _ => Err(unsupported()),
                }
            }
            OpType::IsNull | OpType::IsNotNull | OpType::Exist | OpType::NotExist => Ok(()),
            _ => {
                let Some(value) = self.value.as_value() else {
                    // A nested rule under a non-structural operator is
                    // reported by the operator's own shape check.
                    return Ok(());
                };

                self.validate_value_type(value, declared)
            }
        }
    }

    fn validate_value_type(&self, value: &Value, declared: FieldType) -> Result<(), ExprError> {
        if let Value::Array(items) = value {
            for item in items {
                self.validate_scalar_type(item, declared)?;
            }
            return Ok(());
        }

        self.validate_scalar_type(value, declared)
    }

    fn validate_scalar_type(&self, value: &Value, declared: FieldType) -> Result<(), ExprError> {
        let matched = match declared {
            FieldType::String | FieldType::Enum => value.is_string(),
            FieldType::Numeric | FieldType::Timestamp => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Time => coerce::is_datetime(value),
            FieldType::MapString | FieldType::Array | FieldType::Object => {
                return Err(ExprError::FieldTypeUnsupported {
                    field: self.field.clone(),
                    declared,
                    operator: self.operator.clone(),
                });
            }
        };

        if !matched {
            return Err(ExprError::FieldTypeMismatch {
                field: self.field.clone(),
                declared,
                value: value.to_string(),
            });
        }

        Ok(())
    }

    /// Compile this leaf into a Mongo condition document.
    pub(crate) fn to_mongo_with(&self, opt: Option<&RuleOption>) -> Result<Document, ExprError> {
        let field_path = match opt {
            None => self.field.clone(),
            Some(RuleOption {
                parent,
                parent_type: ParentType::Object,
            }) => format!("{parent}.{}", self.field),
            Some(RuleOption {
                parent,
                parent_type: ParentType::Array,
            }) => {
                if self.field != ELEMENT {
                    return Err(ExprError::NonElementField {
                        field: self.field.clone(),
                        expected: ELEMENT,
                    });
                }

                parent.clone()
            }
        };

        self.operator.operator().to_mongo(&field_path, &self.value)
    }

    /// Evaluate this leaf against a record.
    pub fn matches<D: MatchedData + ?Sized>(&self, data: &D) -> Result<bool, ExprError> {
        let resolved = data.get_value(&self.field)?;

        self.operator
            .operator()
            .matches(&resolved, &self.value)
            .map_err(|err| err.at_field(&self.field))
    }

    /// Leaf fields referenced by this rule; structural sub-rule fields
    /// come out prefixed with this rule's field.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        let mut fields = vec![self.field.clone()];

        if let RuleValue::Rule(sub_rule) = &self.value {
            for sub in sub_rule.fields() {
                fields.push(format!("{}.{sub}", self.field));
            }
        }

        fields
    }

    /// Nesting depth contributed by this leaf.
    #[must_use]
    pub fn depth(&self) -> u32 {
        match &self.value {
            RuleValue::Rule(sub_rule) => 1 + sub_rule.depth(),
            RuleValue::Value(_) => 1,
        }
    }
}

///
/// CombinedRule
///
/// A non-leaf node joining child rules under one logic condition.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CombinedRule {
    pub condition: Condition,
    pub rules: Vec<Rule>,
}

impl CombinedRule {
    #[must_use]
    pub const fn new(condition: Condition, rules: Vec<Rule>) -> Self {
        Self { condition, rules }
    }

    /// Validate this node and its children, consuming one unit of depth
    /// budget for the descent.
    pub fn validate(&self, opt: &ExprOption) -> Result<(), ExprError> {
        if self.rules.is_empty() {
            return Err(ExprError::EmptyRules);
        }

        if opt.max_rules_limit > 0 && self.rules.len() > opt.max_rules_limit as usize {
            return Err(ExprError::TooManyRules {
                count: self.rules.len(),
                limit: opt.max_rules_limit,
            });
        }

        if opt.max_rules_depth <= 1 {
            return Err(ExprError::DepthExceeded);
        }

        let child_opt = opt.descend();
        for (index, rule) in self.rules.iter().enumerate() {
            rule.validate(&child_opt)
                .map_err(|err| err.at_index(index))?;
        }

        Ok(())
    }

    /// Compile this node into an `$and`/`$or` document, compiling every
    /// child under the same parent context.
    pub(crate) fn to_mongo_with(&self, opt: Option<&RuleOption>) -> Result<Document, ExprError> {
        if self.rules.is_empty() {
            return Err(ExprError::EmptyRules);
        }

        let mut children = Vec::with_capacity(self.rules.len());
        for (index, rule) in self.rules.iter().enumerate() {
            let child = rule
                .to_mongo_with(opt)
                .map_err(|err| err.at_index(index))?;
            children.push(Bson::Document(child));
        }

        Ok(mongo::key_value(
            self.condition.mongo_key(),
            Bson::Array(children),
        ))
    }

    /// Evaluate this node against a record, short-circuiting: `AND` stops
    /// at the first false child, `OR` at the first true one.
    pub fn matches<D: MatchedData + ?Sized>(&self, data: &D) -> Result<bool, ExprError> {
        match self.condition {
            Condition::And => {
                for (index, rule) in self.rules.iter().enumerate() {
                    if !rule.matches(data).map_err(|err| err.at_index(index))? {
                        return Ok(false);
                    }
                }

                Ok(true)
            }
            Condition::Or => {
                for (index, rule) in self.rules.iter().enumerate() {
                    if rule.matches(data).map_err(|err| err.at_index(index))? {
                        return Ok(true);
                    }
                }

                Ok(false)
            }
        }
    }

    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        self.rules.iter().flat_map(Rule::fields).collect()
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        1 + self.rules.iter().map(Rule::depth).max().unwrap_or(0)
    }
}

///
/// Rule
///
/// The closed sum of the two node shapes.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Rule {
    Atom(AtomRule),
    Combined(CombinedRule),
}

impl Rule {
    pub fn validate(&self, opt: &ExprOption) -> Result<(), ExprError> {
        match self {
            Self::Atom(atom) => atom.validate(opt),
            Self::Combined(combined) => combined.validate(opt),
        }
    }

    /// Compile this tree into a Mongo query document.
    pub fn to_mongo(&self) -> Result<Document, ExprError> {
        self.to_mongo_with(None)
    }

    pub(crate) fn to_mongo_with(&self, opt: Option<&RuleOption>) -> Result<Document, ExprError> {
        match self {
            Self::Atom(atom) => atom.to_mongo_with(opt),
            Self::Combined(combined) => combined.to_mongo_with(opt),
        }
    }

    /// Evaluate this tree against a record.
    pub fn matches<D: MatchedData + ?Sized>(&self, data: &D) -> Result<bool, ExprError> {
        match self {
            Self::Atom(atom) => atom.matches(data),
            Self::Combined(combined) => combined.matches(data),
        }
    }

    /// Flattened list of leaf fields this tree touches.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        match self {
            Self::Atom(atom) => atom.fields(),
            Self::Combined(combined) => combined.fields(),
        }
    }

    /// Nesting depth of this tree, counting every node level including
    /// leaf atoms. A tree validates under a depth budget of `N` exactly
    /// when `depth() <= N`.
    #[must_use]
    pub fn depth(&self) -> u32 {
        match self {
            Self::Atom(atom) => atom.depth(),
            Self::Combined(combined) => combined.depth(),
        }
    }
}

impl From<AtomRule> for Rule {
    fn from(atom: AtomRule) -> Self {
        Self::Atom(atom)
    }
}

impl From<CombinedRule> for Rule {
    fn from(combined: CombinedRule) -> Self {
        Self::Combined(combined)
    }
}

impl BitAnd for Rule {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::Combined(CombinedRule::new(Condition::And, vec![self, rhs]))
    }
}

impl BitOr for Rule {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Combined(CombinedRule::new(Condition::Or, vec![self, rhs]))
    }
}
