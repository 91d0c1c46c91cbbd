use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

///
/// Validation and compilation options
///
/// `ExprOption` is the caller's validation policy, supplied per call and
/// never implicit. Recursion narrows it by cloning — sibling branches of
/// a combined rule must not observe each other's narrowed whitelist, so
/// options are never mutated in place.
///

/// Default cap on `in` array operands.
pub const DEFAULT_MAX_IN_LIMIT: u32 = 500;

/// Default cap on `not_in` array operands.
pub const DEFAULT_MAX_NOT_IN_LIMIT: u32 = 500;

/// Default cap on rules per combined node.
pub const DEFAULT_MAX_RULES_LIMIT: u32 = 50;

/// Default cap on rule-tree depth.
pub const DEFAULT_MAX_RULES_DEPTH: u32 = 6;

///
/// FieldType
///
/// Declared type of a filterable field. Used purely as a type oracle
/// during validation, never for storage.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Numeric,
    Time,
    Timestamp,
    Boolean,
    String,
    MapString,
    Array,
    Object,
    Enum,
}

impl FieldType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::MapString => "mapString",
            Self::Array => "array",
            Self::Object => "object",
            Self::Enum => "enum",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// ExprOption
///
/// Caller-supplied validation policy: a field whitelist doubling as a
/// type oracle, plus structural limits. A count limit of `0` means
/// unlimited; the depth limit is always enforced.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ExprOption {
    /// Whitelisted fields and their declared types.
    pub rule_fields: BTreeMap<String, FieldType>,

    /// Skip field whitelisting and declared-type checks entirely.
    pub ignore_rule_fields: bool,

    pub max_in_limit: u32,
    pub max_not_in_limit: u32,
    pub max_rules_limit: u32,
    pub max_rules_depth: u32,
}

impl ExprOption {
    /// Policy validating against a field whitelist, with default limits.
    #[must_use]
    pub fn new(rule_fields: BTreeMap<String, FieldType>) -> Self {
        Self {
            rule_fields,
            ..Self::default()
        }
    }

    /// Policy with field whitelisting disabled, with default limits.
    #[must_use]
    pub fn ignore_fields() -> Self {
        Self {
            ignore_rule_fields: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_max_rules_depth(mut self, depth: u32) -> Self {
        self.max_rules_depth = depth;
        self
    }

    /// Clone this policy with one unit of depth budget consumed.
    #[must_use]
    pub(crate) fn descend(&self) -> Self {
        let mut child = self.clone();
        child.max_rules_depth = self.max_rules_depth.saturating_sub(1);
        child
    }

    /// Clone this policy with the whitelist narrowed to the sub-fields of
    /// `field`: keys with the `field.` prefix, prefix stripped. Depth is
    /// left untouched; the structural operators account for it when they
    /// descend.
    #[must_use]
    pub(crate) fn narrowed(&self, field: &str) -> Self {
        let prefix = format!("{field}.");
        let rule_fields = self
            .rule_fields
            .iter()
            .filter_map(|(key, declared)| {
                key.strip_prefix(&prefix)
                    .map(|sub| (sub.to_string(), *declared))
            })
            .collect();

        Self {
            rule_fields,
            ..self.clone()
        }
    }
}

impl Default for ExprOption {
    fn default() -> Self {
        Self {
            rule_fields: BTreeMap::new(),
            ignore_rule_fields: false,
            max_in_limit: DEFAULT_MAX_IN_LIMIT,
            max_not_in_limit: DEFAULT_MAX_NOT_IN_LIMIT,
            max_rules_limit: DEFAULT_MAX_RULES_LIMIT,
            max_rules_depth: DEFAULT_MAX_RULES_DEPTH,
        }
    }
}

///
/// ParentType
///
/// The kind of container a structural operator is drilling into.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParentType {
    Object,
    Array,
}

///
/// RuleOption
///
/// Compiler-side recursion context: the accumulated parent field path and
/// the container kind being drilled into. Absent at the root.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuleOption {
    pub parent: String,
    pub parent_type: ParentType,
}
