use bson::doc;
use serde_json::{Value, json};

use crate::{
    error::ExprError,
    expr::{AtomRule, CombinedRule, Condition, ExprOption, Rule, RuleValue},
    matcher::JsonData,
    op::OpType,
};

fn opt() -> ExprOption {
    ExprOption::ignore_fields()
}

fn val(value: Value) -> RuleValue {
    RuleValue::Value(value)
}

fn sub(rule: Rule) -> RuleValue {
    RuleValue::Rule(Box::new(rule))
}

#[test]
fn equal_validates_basic_values_only() {
    let op = OpType::Equal.operator();

    assert!(op.validate_value(&val(json!(1)), &opt()).is_ok());
    assert!(op.validate_value(&val(json!(1.5)), &opt()).is_ok());
    assert!(op.validate_value(&val(json!("a")), &opt()).is_ok());
    assert!(op.validate_value(&val(json!(true)), &opt()).is_ok());

    assert!(op.validate_value(&val(json!([1])), &opt()).is_err());
    assert!(op.validate_value(&val(json!({"a": 1})), &opt()).is_err());
    assert!(op.validate_value(&val(json!(null)), &opt()).is_err());
    let nested = sub(Rule::Atom(AtomRule::equal("a", json!(1))));
    assert!(op.validate_value(&nested, &opt()).is_err());
}

#[test]
fn equal_mongo_cond() {
    let op = OpType::Equal.operator();

    let cond = op.to_mongo("test", &val(json!(1))).unwrap();
    assert_eq!(cond, doc! {"test": {"$eq": 1_i64}});

    assert_eq!(
        op.to_mongo("", &val(json!(1))),
        Err(ExprError::EmptyField)
    );
}

#[test]
fn equal_match_widens_numbers() {
    let op = OpType::Equal.operator();

    assert_eq!(op.matches(&json!(1), &val(json!(1.0))), Ok(true));
    assert_eq!(op.matches(&json!(2), &val(json!(1))), Ok(false));
    assert_eq!(op.matches(&json!("a"), &val(json!("a"))), Ok(true));
    assert_eq!(op.matches(&json!(true), &val(json!(true))), Ok(true));
}

#[test]
fn equal_match_rejects_type_mismatch() {
    let op = OpType::Equal.operator();

    assert!(op.matches(&json!(1), &val(json!("1"))).is_err());
    assert!(op.matches(&json!(null), &val(json!(1))).is_err());
    assert!(op.matches(&json!(true), &val(json!(1))).is_err());
}

#[test]
fn not_equal_is_negation_of_equal() {
    let equal = OpType::Equal.operator();
    let not_equal = OpType::NotEqual.operator();

    for (left, right) in [
        (json!(1), json!(1.0)),
        (json!(1), json!(2)),
        (json!("a"), json!("b")),
    ] {
        assert_eq!(
            not_equal.matches(&left, &val(right.clone())).unwrap(),
            !equal.matches(&left, &val(right)).unwrap(),
        );
    }
}

#[test]
fn not_equal_mongo_cond() {
    let cond = OpType::NotEqual
        .operator()
        .to_mongo("test", &val(json!("a")))
        .unwrap();
    assert_eq!(cond, doc! {"test": {"$ne": "a"}});
}

#[test]
fn in_validates_homogeneous_arrays() {
    let op = OpType::In.operator();

    assert!(op.validate_value(&val(json!([1, 2])), &opt()).is_ok());
    assert!(op.validate_value(&val(json!(["a", "b"])), &opt()).is_ok());
    assert!(op.validate_value(&val(json!([true, false])), &opt()).is_ok());

    assert!(op.validate_value(&val(json!(1)), &opt()).is_err());
    assert!(op.validate_value(&val(json!("a")), &opt()).is_err());
    assert!(op.validate_value(&val(json!([])), &opt()).is_err());
    assert!(op.validate_value(&val(json!([1, "a"])), &opt()).is_err());
    assert!(op.validate_value(&val(json!([{"a": 1}])), &opt()).is_err());
}

#[test]
fn in_enforces_element_limit() {
    let op = OpType::In.operator();
    let mut policy = opt();
    policy.max_in_limit = 2;

    assert!(op.validate_value(&val(json!([1, 2])), &policy).is_ok());
    assert_eq!(
        op.validate_value(&val(json!([1, 2, 3])), &policy),
        Err(ExprError::TooManyElements {
            operator: OpType::In,
            count: 3,
            limit: 2,
        })
    );
}

#[test]
fn in_mongo_cond() {
    let cond = OpType::In
        .operator()
        .to_mongo("test", &val(json!([1, 2])))
        .unwrap();
    assert_eq!(cond, doc! {"test": {"$in": [1_i64, 2_i64]}});
}

#[test]
fn in_match_widens_numeric_elements() {
    let op = OpType::In.operator();

    assert_eq!(op.matches(&json!(1.0), &val(json!([1, 2]))), Ok(true));
    assert_eq!(op.matches(&json!(3), &val(json!([1, 2]))), Ok(false));
    assert_eq!(op.matches(&json!("a"), &val(json!(["a"]))), Ok(true));
    // String elements never match numbers; no cross-type coercion.
    assert_eq!(op.matches(&json!(1), &val(json!(["1"]))), Ok(false));
}

#[test]
fn in_match_requires_a_non_empty_array() {
    let op = OpType::In.operator();

    assert!(op.matches(&json!(1), &val(json!([]))).is_err());
    assert!(op.matches(&json!(1), &val(json!(1))).is_err());
    assert!(op.matches(&json!(null), &val(json!([1]))).is_err());
}

#[test]
fn not_in_is_negation_of_in() {
    let is_in = OpType::In.operator();
    let not_in = OpType::NotIn.operator();

    for (left, right) in [
        (json!(1.0), json!([1, 2])),
        (json!(3), json!([1, 2])),
        (json!("a"), json!(["a", "b"])),
    ] {
        assert_eq!(
            not_in.matches(&left, &val(right.clone())).unwrap(),
            !is_in.matches(&left, &val(right)).unwrap(),
        );
    }
}

#[test]
fn not_in_mongo_cond() {
    let cond = OpType::NotIn
        .operator()
        .to_mongo("test", &val(json!(["a", "b"])))
        .unwrap();
    assert_eq!(cond, doc! {"test": {"$nin": ["a", "b"]}});
}

#[test]
fn ordering_operators_validate_numeric_values_only() {
    for op_type in [
        OpType::Less,
        OpType::LessOrEqual,
        OpType::Greater,
        OpType::GreaterOrEqual,
    ] {
        let op = op_type.operator();
        assert!(op.validate_value(&val(json!(1)), &opt()).is_ok());
        assert!(op.validate_value(&val(json!(1.5)), &opt()).is_ok());
        assert!(op.validate_value(&val(json!("1")), &opt()).is_err());
        assert!(op.validate_value(&val(json!(true)), &opt()).is_err());
        assert!(op.validate_value(&val(json!([1])), &opt()).is_err());
    }
}

#[test]
fn ordering_mongo_conds() {
    let value = val(json!(5));

    assert_eq!(
        OpType::Less.operator().to_mongo("test", &value).unwrap(),
        doc! {"test": {"$lt": 5_i64}}
    );
    assert_eq!(
        OpType::LessOrEqual.operator().to_mongo("test", &value).unwrap(),
        doc! {"test": {"$lte": 5_i64}}
    );
    assert_eq!(
        OpType::Greater.operator().to_mongo("test", &value).unwrap(),
        doc! {"test": {"$gt": 5_i64}}
    );
    assert_eq!(
        OpType::GreaterOrEqual.operator().to_mongo("test", &value).unwrap(),
        doc! {"test": {"$gte": 5_i64}}
    );
}

#[test]
fn strict_ordering_rejects_equal_operands() {
    let five = val(json!(5));

    assert_eq!(OpType::Less.operator().matches(&json!(5.0), &five), Ok(false));
    assert_eq!(OpType::LessOrEqual.operator().matches(&json!(5.0), &five), Ok(true));
    assert_eq!(OpType::Greater.operator().matches(&json!(5.0), &five), Ok(false));
    assert_eq!(OpType::GreaterOrEqual.operator().matches(&json!(5.0), &five), Ok(true));

    assert_eq!(OpType::Less.operator().matches(&json!(4), &five), Ok(true));
    assert_eq!(OpType::Greater.operator().matches(&json!(6), &five), Ok(true));
    assert!(OpType::Less.operator().matches(&json!("4"), &five).is_err());
}

#[test]
fn datetime_validates_permissive_operands() {
    for op_type in [
        OpType::DatetimeLess,
        OpType::DatetimeLessOrEqual,
        OpType::DatetimeGreater,
        OpType::DatetimeGreaterOrEqual,
    ] {
        let op = op_type.operator();
        assert!(op.validate_value(&val(json!(1_700_000_000)), &opt()).is_ok());
        assert!(op.validate_value(&val(json!("2024-01-02T03:04:05Z")), &opt()).is_ok());
        assert!(op.validate_value(&val(json!("2024-01-02 03:04:05")), &opt()).is_ok());
        assert!(op.validate_value(&val(json!("2024-01-02")), &opt()).is_ok());
        assert!(op.validate_value(&val(json!("junk")), &opt()).is_err());
        assert!(op.validate_value(&val(json!(true)), &opt()).is_err());
    }
}

#[test]
fn datetime_mongo_cond_materializes_a_time_value() {
    let cond = OpType::DatetimeLess
        .operator()
        .to_mongo("test", &val(json!(1)))
        .unwrap();
    assert_eq!(cond, doc! {"test": {"$lt": bson::DateTime::from_millis(1_000)}});

    let cond = OpType::DatetimeGreaterOrEqual
        .operator()
        .to_mongo("test", &val(json!("1970-01-01T00:00:01Z")))
        .unwrap();
    assert_eq!(cond, doc! {"test": {"$gte": bson::DateTime::from_millis(1_000)}});
}

#[test]
fn datetime_match_compares_across_representations() {
    let op = OpType::DatetimeLess.operator();

    assert_eq!(
        op.matches(&json!(100), &val(json!("1970-01-01T00:03:20Z"))),
        Ok(true)
    );
    assert_eq!(op.matches(&json!(200), &val(json!(200))), Ok(false));
    assert_eq!(
        OpType::DatetimeLessOrEqual.operator().matches(&json!(200), &val(json!(200))),
        Ok(true)
    );
    assert_eq!(
        OpType::DatetimeGreater.operator().matches(&json!(201), &val(json!(200))),
        Ok(true)
    );
    assert!(op.matches(&json!("junk"), &val(json!(1))).is_err());
}

#[test]
fn text_operators_validate_non_empty_strings() {
    for op_type in [
        OpType::BeginsWith,
        OpType::BeginsWithInsensitive,
        OpType::NotBeginsWith,
        OpType::NotBeginsWithInsensitive,
        OpType::Contains,
        OpType::ContainsSensitive,
        OpType::NotContains,
        OpType::NotContainsInsensitive,
        OpType::EndsWith,
        OpType::EndsWithInsensitive,
        OpType::NotEndsWith,
        OpType::NotEndsWithInsensitive,
    ] {
        let op = op_type.operator();
        assert!(op.validate_value(&val(json!("a")), &opt()).is_ok());
        assert!(op.validate_value(&val(json!("")), &opt()).is_err());
        assert!(op.validate_value(&val(json!(1)), &opt()).is_err());
    }
}

#[test]
fn begins_with_mongo_conds() {
    let value = val(json!("a"));

    assert_eq!(
        OpType::BeginsWith.operator().to_mongo("test", &value).unwrap(),
        doc! {"test": {"$regex": "^a"}}
    );
    assert_eq!(
        OpType::BeginsWithInsensitive.operator().to_mongo("test", &value).unwrap(),
        doc! {"test": {"$regex": "^a", "$options": "i"}}
    );
    assert_eq!(
        OpType::NotBeginsWith.operator().to_mongo("test", &value).unwrap(),
        doc! {"test": {"$not": {"$regex": "^a"}}}
    );
    assert_eq!(
        OpType::NotBeginsWithInsensitive.operator().to_mongo("test", &value).unwrap(),
        doc! {"test": {"$not": {"$regex": "^a", "$options": "i"}}}
    );
}

#[test]
fn contains_mongo_conds() {
    let value = val(json!("a"));

    // Bare `contains` is the case-insensitive variant.
    assert_eq!(
        OpType::Contains.operator().to_mongo("test", &value).unwrap(),
        doc! {"test": {"$regex": "a", "$options": "i"}}
    );
    assert_eq!(
        OpType::ContainsSensitive.operator().to_mongo("test", &value).unwrap(),
        doc! {"test": {"$regex": "a"}}
    );
    assert_eq!(
        OpType::NotContains.operator().to_mongo("test", &value).unwrap(),
        doc! {"test": {"$not": {"$regex": "a"}}}
    );
    assert_eq!(
        OpType::NotContainsInsensitive.operator().to_mongo("test", &value).unwrap(),
        doc! {"test": {"$not": {"$regex": "a", "$options": "i"}}}
    );
}

#[test]
fn ends_with_mongo_conds() {
    let value = val(json!("a"));

    assert_eq!(
        OpType::EndsWith.operator().to_mongo("test", &value).unwrap(),
        doc! {"test": {"$regex": "a$"}}
    );
    assert_eq!(
        OpType::EndsWithInsensitive.operator().to_mongo("test", &value).unwrap(),
        doc! {"test": {"$regex": "a$", "$options": "i"}}
    );
    assert_eq!(
        OpType::NotEndsWith.operator().to_mongo("test", &value).unwrap(),
        doc! {"test": {"$not": {"$regex": "a$"}}}
    );
}

#[test]
fn text_match_case_sensitivity() {
    let candidate = json!("abcdef");

    assert_eq!(
        OpType::BeginsWith.operator().matches(&candidate, &val(json!("aB"))),
        Ok(false)
    );
    assert_eq!(
        OpType::BeginsWithInsensitive.operator().matches(&candidate, &val(json!("aB"))),
        Ok(true)
    );
    assert_eq!(
        OpType::Contains.operator().matches(&candidate, &val(json!("CDe"))),
        Ok(true)
    );
    assert_eq!(
        OpType::ContainsSensitive.operator().matches(&candidate, &val(json!("CDe"))),
        Ok(false)
    );
    assert_eq!(
        OpType::EndsWith.operator().matches(&candidate, &val(json!("DEF"))),
        Ok(false)
    );
    assert_eq!(
        OpType::EndsWithInsensitive.operator().matches(&candidate, &val(json!("DEF"))),
        Ok(true)
    );
}

#[test]
fn negated_text_operators_invert_their_positive_counterparts() {
    let pairs = [
        (OpType::BeginsWith, OpType::NotBeginsWith),
        (OpType::BeginsWithInsensitive, OpType::NotBeginsWithInsensitive),
        (OpType::ContainsSensitive, OpType::NotContains),
        (OpType::Contains, OpType::NotContainsInsensitive),
        (OpType::EndsWith, OpType::NotEndsWith),
        (OpType::EndsWithInsensitive, OpType::NotEndsWithInsensitive),
    ];

    for (positive, negative) in pairs {
        for operand in [json!("aB"), json!("abc"), json!("f")] {
            let hit = positive
                .operator()
                .matches(&json!("abcdef"), &val(operand.clone()))
                .unwrap();
            let inverted = negative
                .operator()
                .matches(&json!("abcdef"), &val(operand))
                .unwrap();
            assert_eq!(hit, !inverted, "{positive} / {negative}");
        }
    }
}

#[test]
fn text_match_rejects_non_string_operands() {
    let op = OpType::Contains.operator();

    assert!(op.matches(&json!(1), &val(json!("a"))).is_err());
    assert!(op.matches(&json!("a"), &val(json!(1))).is_err());
}

#[test]
fn is_empty_mongo_conds() {
    assert_eq!(
        OpType::IsEmpty.operator().to_mongo("test", &val(json!(true))).unwrap(),
        doc! {"test": {"$size": 0_i32}}
    );
    assert_eq!(
        OpType::IsNotEmpty.operator().to_mongo("test", &val(json!(true))).unwrap(),
        doc! {"test": {"$size": {"$gt": 0_i32}}}
    );
}

#[test]
fn collection_operators_require_collections() {
    for op_type in [OpType::IsEmpty, OpType::IsNotEmpty] {
        let op = op_type.operator();
        assert!(op.matches(&json!(1), &val(json!(true))).is_err());
        assert!(op.matches(&json!("a"), &val(json!(true))).is_err());
        assert!(op.matches(&json!({"a": 1}), &val(json!(true))).is_err());
    }

    assert_eq!(
        OpType::IsEmpty.operator().matches(&json!([]), &val(json!(true))),
        Ok(true)
    );
    assert_eq!(
        OpType::IsEmpty.operator().matches(&json!([1]), &val(json!(true))),
        Ok(false)
    );
    assert_eq!(
        OpType::IsNotEmpty.operator().matches(&json!([1]), &val(json!(true))),
        Ok(true)
    );
    assert_eq!(
        OpType::IsNotEmpty.operator().matches(&json!([]), &val(json!(true))),
        Ok(false)
    );
}

#[test]
fn size_validates_non_negative_integers() {
    let op = OpType::Size.operator();

    assert!(op.validate_value(&val(json!(0)), &opt()).is_ok());
    assert!(op.validate_value(&val(json!(3)), &opt()).is_ok());
    assert!(op.validate_value(&val(json!(-1)), &opt()).is_err());
    assert!(op.validate_value(&val(json!(1.5)), &opt()).is_err());
    assert!(op.validate_value(&val(json!("3")), &opt()).is_err());
}

#[test]
fn size_matches_array_length() {
    let op = OpType::Size.operator();

    assert_eq!(op.matches(&json!([1, 2]), &val(json!(2))), Ok(true));
    assert_eq!(op.matches(&json!([1, 2]), &val(json!(3))), Ok(false));
    assert_eq!(op.matches(&json!([]), &val(json!(0))), Ok(true));
    assert!(op.matches(&json!("ab"), &val(json!(2))).is_err());

    assert_eq!(
        op.to_mongo("test", &val(json!(2))).unwrap(),
        doc! {"test": {"$size": 2_i64}}
    );
}

#[test]
fn null_operators_test_the_left_operand_only() {
    assert_eq!(
        OpType::IsNull.operator().matches(&json!(null), &val(json!(true))),
        Ok(true)
    );
    assert_eq!(
        OpType::IsNull.operator().matches(&json!(1), &val(json!(true))),
        Ok(false)
    );
    assert_eq!(
        OpType::IsNotNull.operator().matches(&json!(1), &val(json!(true))),
        Ok(true)
    );

    assert_eq!(
        OpType::IsNull.operator().to_mongo("test", &val(json!(true))).unwrap(),
        doc! {"test": {"$eq": bson::Bson::Null}}
    );
    assert_eq!(
        OpType::IsNotNull.operator().to_mongo("test", &val(json!(true))).unwrap(),
        doc! {"test": {"$ne": bson::Bson::Null}}
    );
}

#[test]
fn exist_matches_the_null_placeholder() {
    // The resolved-value convention: an absent field arrives as null, so
    // `exist` matches null and `not_exist` matches anything else.
    assert_eq!(
        OpType::Exist.operator().matches(&json!(null), &val(json!(true))),
        Ok(true)
    );
    assert_eq!(
        OpType::Exist.operator().matches(&json!(1), &val(json!(true))),
        Ok(false)
    );
    assert_eq!(
        OpType::NotExist.operator().matches(&json!(1), &val(json!(true))),
        Ok(true)
    );

    assert_eq!(
        OpType::Exist.operator().to_mongo("test", &val(json!(true))).unwrap(),
        doc! {"test": {"$exists": true}}
    );
    assert_eq!(
        OpType::NotExist.operator().to_mongo("test", &val(json!(true))).unwrap(),
        doc! {"test": {"$exists": false}}
    );
}

#[test]
fn filter_object_compiles_with_a_dot_prefixed_path() {
    let sub_rule = Rule::Combined(CombinedRule::new(
        Condition::And,
        vec![Rule::Atom(AtomRule::equal("name", json!("web")))],
    ));

    let cond = OpType::Object
        .operator()
        .to_mongo("host", &sub(sub_rule))
        .unwrap();
    assert_eq!(cond, doc! {"$and": [{"host.name": {"$eq": "web"}}]});
}

#[test]
fn filter_array_requires_the_element_field() {
    let good = Rule::Atom(AtomRule::equal("element", json!(1)));
    let cond = OpType::Array.operator().to_mongo("ports", &sub(good)).unwrap();
    assert_eq!(cond, doc! {"ports": {"$eq": 1_i64}});

    let bad = Rule::Atom(AtomRule::equal("other", json!(1)));
    assert_eq!(
        OpType::Array.operator().to_mongo("ports", &sub(bad)),
        Err(ExprError::NonElementField {
            field: "other".to_string(),
            expected: "element",
        })
    );
}

#[test]
fn structural_operators_reject_plain_values() {
    for op_type in [OpType::Object, OpType::Array] {
        let op = op_type.operator();
        assert!(op.validate_value(&val(json!({"a": 1})), &opt()).is_err());
        assert!(op.to_mongo("test", &val(json!(1))).is_err());
        assert!(op.matches(&json!({}), &val(json!(1))).is_err());
    }
}

#[test]
fn structural_validate_consumes_depth_budget() {
    let sub_rule = sub(Rule::Atom(AtomRule::equal("a", json!(1))));
    let op = OpType::Object.operator();

    let mut policy = opt();
    policy.max_rules_depth = 2;
    assert!(op.validate_value(&sub_rule, &policy).is_ok());

    policy.max_rules_depth = 1;
    assert_eq!(
        op.validate_value(&sub_rule, &policy),
        Err(ExprError::DepthExceeded)
    );
}

#[test]
fn filter_object_matches_nested_objects() {
    let sub_rule = sub(Rule::Atom(AtomRule::equal("name", json!("web"))));
    let op = OpType::Object.operator();

    assert_eq!(op.matches(&json!({"name": "web"}), &sub_rule), Ok(true));
    assert_eq!(op.matches(&json!({"name": "db"}), &sub_rule), Ok(false));
    assert!(op.matches(&json!(1), &sub_rule).is_err());
}

#[test]
fn filter_object_matches_any_array_element() {
    let sub_rule = sub(Rule::Atom(AtomRule::equal("name", json!("web"))));
    let op = OpType::Object.operator();

    assert_eq!(
        op.matches(&json!([{"name": "db"}, {"name": "web"}]), &sub_rule),
        Ok(true)
    );
    assert_eq!(op.matches(&json!([{"name": "db"}]), &sub_rule), Ok(false));
    assert_eq!(op.matches(&json!([]), &sub_rule), Ok(false));
}

#[test]
fn filter_array_matches_through_the_element_wrapper() {
    let sub_rule = sub(Rule::Atom(AtomRule::new(
        "element",
        OpType::IsNotEmpty,
        json!(true),
    )));
    let op = OpType::Array.operator();

    assert_eq!(op.matches(&json!([1]), &sub_rule), Ok(true));
    assert_eq!(op.matches(&json!([]), &sub_rule), Ok(false));
    assert!(op.matches(&json!(1), &sub_rule).is_err());
}

#[test]
fn unknown_operator_fails_every_contract() {
    let rule: Rule = serde_json::from_value(json!({
        "field": "test",
        "operator": "bogus",
        "value": 1,
    }))
    .unwrap();

    let Rule::Atom(atom) = &rule else {
        panic!("expected an atomic rule");
    };
    assert_eq!(atom.operator, OpType::Unknown("bogus".to_string()));

    let op = atom.operator.operator();
    assert!(op.validate_value(&atom.value, &opt()).is_err());
    assert!(op.to_mongo("test", &atom.value).is_err());
    assert!(op.matches(&json!(1), &atom.value).is_err());

    assert!(rule.validate(&opt()).is_err());
}

#[test]
fn operators_round_trip_their_wire_names() {
    let names = [
        "equal",
        "not_equal",
        "in",
        "not_in",
        "less",
        "less_or_equal",
        "greater",
        "greater_or_equal",
        "datetime_less",
        "datetime_less_or_equal",
        "datetime_greater",
        "datetime_greater_or_equal",
        "begins_with",
        "begins_with_i",
        "not_begins_with",
        "not_begins_with_i",
        "contains",
        "contains_s",
        "not_contains",
        "not_contains_i",
        "ends_with",
        "ends_with_i",
        "not_ends_with",
        "not_ends_with_i",
        "is_empty",
        "is_not_empty",
        "size",
        "is_null",
        "is_not_null",
        "exist",
        "not_exist",
        "filter_object",
        "filter_array",
    ];

    for name in names {
        let op_type = OpType::from_name(name);
        assert!(op_type.validate().is_ok(), "{name}");
        assert_eq!(op_type.as_str(), name);
        assert_eq!(op_type.operator().name(), op_type);
    }
}

#[test]
fn registry_resolves_every_operator_consistently() {
    // Each registered singleton reports the name it is registered under.
    let op = OpType::from_name("equal");
    let matched = op
        .operator()
        .matches(&json!(1), &val(json!(1)))
        .unwrap();
    assert!(matched);

    let data = JsonData::from_value(json!({"a": 1}));
    let rule = Rule::Atom(AtomRule::equal("a", json!(1)));
    assert_eq!(rule.matches(&data), Ok(true));
}
