//! Sift: an embeddable boolean filter-expression engine.
//!
//! A filter is a recursive rule tree — atomic `field / operator / value`
//! leaves combined under `AND`/`OR` nodes — that is validated against
//! caller-supplied policy, then executed through one of two backends:
//! compiled into a MongoDB-style query [`Document`](bson::Document), or
//! matched directly against in-memory records through [`MatchedData`].
//! Both backends walk the same immutable tree and agree on operator
//! semantics.

pub mod error;
pub mod expr;
pub mod matcher;
pub mod mongo;
pub mod op;

pub(crate) mod coerce;

pub use error::ExprError;
pub use expr::{
    AtomRule, CombinedRule, Condition, ExprOption, Expression, FieldType, ParentType, Rule,
    RuleOption, RuleValue,
};
pub use matcher::{JsonData, MapData, MatchedData};
pub use op::{OpType, Operator};

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
///

pub mod prelude {
    pub use crate::{
        error::ExprError,
        expr::{AtomRule, CombinedRule, Condition, ExprOption, Expression, FieldType, Rule},
        matcher::{JsonData, MapData, MatchedData},
        op::OpType,
    };
}
