use proptest::prelude::*;
use serde_json::{Value, json};

use sift::{AtomRule, CombinedRule, Condition, ExprOption, Expression, OpType, Rule};

///
/// Property coverage: wire round-trips over generated trees, the
/// `not_in`/`in` negation law, and the depth-budget accounting law.
///

const FIELDS: [&str; 4] = ["a", "b", "c", "d"];

fn arb_field() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(FIELDS[0].to_string()),
        Just(FIELDS[1].to_string()),
        Just(FIELDS[2].to_string()),
        Just(FIELDS[3].to_string()),
    ]
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(|n| json!(n)),
        any::<bool>().prop_map(|b| json!(b)),
        "[a-zA-Z0-9_]{0,8}".prop_map(|s| json!(s)),
    ]
}

fn arb_number_list() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(any::<i32>().prop_map(|n| json!(n)), 1..5)
}

fn arb_string_list() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec("[a-z]{1,4}".prop_map(|s| json!(s)), 1..5)
}

// Leaf rules that are always well-formed under an ignore-fields policy.
fn arb_atom() -> impl Strategy<Value = Rule> {
    prop_oneof![
        (arb_field(), any::<i32>())
            .prop_map(|(field, n)| Rule::Atom(AtomRule::equal(field, json!(n)))),
        (arb_field(), "[a-z]{1,6}")
            .prop_map(|(field, s)| Rule::Atom(AtomRule::not_equal(field, json!(s)))),
        (arb_field(), any::<i32>())
            .prop_map(|(field, n)| Rule::Atom(AtomRule::less(field, json!(n)))),
        (arb_field(), any::<i32>())
            .prop_map(|(field, n)| Rule::Atom(AtomRule::greater_or_equal(field, json!(n)))),
        (arb_field(), arb_number_list())
            .prop_map(|(field, items)| Rule::Atom(AtomRule::is_in(field, items))),
        (arb_field(), arb_string_list())
            .prop_map(|(field, items)| Rule::Atom(AtomRule::not_in(field, items))),
        (arb_field(), "[a-z]{1,4}").prop_map(|(field, s)| {
            Rule::Atom(AtomRule::new(field, OpType::BeginsWithInsensitive, json!(s)))
        }),
        arb_field().prop_map(|field| Rule::Atom(AtomRule::new(field, OpType::IsNull, json!(true)))),
    ]
}

fn arb_condition() -> impl Strategy<Value = Condition> {
    prop_oneof![Just(Condition::And), Just(Condition::Or)]
}

// Recursive trees mixing combined nodes and structural wrappers.
fn arb_rule() -> impl Strategy<Value = Rule> {
    arb_atom().prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            (arb_condition(), prop::collection::vec(inner.clone(), 1..4)).prop_map(
                |(condition, rules)| Rule::Combined(CombinedRule::new(condition, rules))
            ),
            (arb_field(), inner.clone())
                .prop_map(|(field, sub)| Rule::Atom(AtomRule::filter_object(field, sub))),
            (arb_field(), inner).prop_map(|(field, sub)| {
                Rule::Atom(AtomRule::filter_array(field, sub))
            }),
        ]
    })
}

proptest! {
    #[test]
    fn rules_round_trip_through_json(rule in arb_rule()) {
        let encoded = serde_json::to_value(&rule).unwrap();
        let decoded: Rule = serde_json::from_value(encoded).unwrap();
        prop_assert_eq!(rule, decoded);
    }

    #[test]
    fn expressions_round_trip_through_bson(rule in arb_rule()) {
        let expr = Expression::new(rule);
        let encoded = bson::to_bson(&expr).unwrap();
        let decoded: Expression = bson::from_bson(encoded).unwrap();
        prop_assert_eq!(expr, decoded);
    }

    #[test]
    fn not_in_is_always_the_negation_of_in(
        value in arb_scalar(),
        items in prop_oneof![arb_number_list(), arb_string_list()],
    ) {
        let is_in = OpType::In.operator();
        let not_in = OpType::NotIn.operator();
        let operand = sift::RuleValue::Value(Value::Array(items));

        match (is_in.matches(&value, &operand), not_in.matches(&value, &operand)) {
            (Ok(hit), Ok(inverted)) => prop_assert_eq!(hit, !inverted),
            (Err(_), Err(_)) => {}
            (left, right) => {
                prop_assert!(false, "in/not_in disagree on errors: {left:?} vs {right:?}");
            }
        }
    }

    #[test]
    fn depth_budget_matches_computed_depth(rule in arb_rule(), max_depth in 1_u32..8) {
        let opt = ExprOption::ignore_fields().with_max_rules_depth(max_depth);
        let valid = rule.validate(&opt).is_ok();

        prop_assert_eq!(valid, rule.depth() <= max_depth);
    }

    #[test]
    fn validation_never_mutates_the_caller_policy(rule in arb_rule()) {
        let opt = ExprOption::ignore_fields().with_max_rules_depth(6);
        let before = opt.clone();
        let _ = rule.validate(&opt);

        prop_assert_eq!(opt, before);
    }
}
