use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

use crate::{error::ExprError, op::OpType};

///
/// Value coercion and comparison semantics
///
/// Defines how untyped rule operands are compared during matching and
/// checked during validation. Numbers are widened to `f64` before
/// comparison, so `1` equals `1.0` regardless of wire representation;
/// strings and booleans compare strictly within their own type.
/// This module is operator-agnostic; operators translate `None` results
/// into their own error context.
///

/// Formats accepted for datetime string operands, tried in order after
/// RFC 3339.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d"];

/// Whether a value is a basic scalar: string, number, or boolean.
#[must_use]
pub(crate) const fn is_basic(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Number(_) | Value::Bool(_)
    )
}

/// Whether a value is numeric.
#[must_use]
pub(crate) const fn is_numeric(value: &Value) -> bool {
    matches!(value, Value::Number(_))
}

/// Widen a numeric value to `f64`.
#[must_use]
pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    value.as_number().and_then(serde_json::Number::as_f64)
}

/// Equality under numeric widening.
///
/// Returns `None` when the two values are not comparable: mixed dynamic
/// types, or non-scalar operands.
#[must_use]
pub(crate) fn compare_eq(left: &Value, right: &Value) -> Option<bool> {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) => Some(as_f64(left)? == as_f64(right)?),
        (Value::String(a), Value::String(b)) => Some(a == b),
        (Value::Bool(a), Value::Bool(b)) => Some(a == b),
        _ => None,
    }
}

/// Ordering under numeric widening. Numeric operands only.
#[must_use]
pub(crate) fn compare_order(left: &Value, right: &Value) -> Option<Ordering> {
    as_f64(left)?.partial_cmp(&as_f64(right)?)
}

/// Convert an operand to a UTC datetime.
///
/// Accepts a Unix-timestamp number (integer or float seconds), an RFC 3339
/// string, or a `YYYY-MM-DD[ HH:MM:SS]` formatted string.
#[must_use]
pub(crate) fn to_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(_) => {
            let secs = as_f64(value)?;
            let millis = (secs * 1_000.0) as i64;
            DateTime::from_timestamp_millis(millis)
        }
        Value::String(raw) => {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
                return Some(parsed.with_timezone(&Utc));
            }

            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, DATETIME_FORMATS[0]) {
                return Some(naive.and_utc());
            }

            NaiveDate::parse_from_str(raw, DATETIME_FORMATS[1])
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        _ => None,
    }
}

/// Whether an operand can be converted to a datetime.
#[must_use]
pub(crate) fn is_datetime(value: &Value) -> bool {
    to_datetime(value).is_some()
}

/// Read an operand as a non-negative integer.
#[must_use]
pub(crate) fn as_non_negative_int(value: &Value) -> Option<i64> {
    let int = value.as_i64().or_else(|| {
        // Whole-number floats are accepted; 3.0 counts as 3.
        let float = value.as_f64()?;
        (float.fract() == 0.0).then_some(float as i64)
    })?;

    (int >= 0).then_some(int)
}

// Basic-type label used for homogeneity checks over array operands.
const fn basic_kind(value: &Value) -> Option<&'static str> {
    match value {
        Value::Number(_) => Some("numeric"),
        Value::String(_) => Some("string"),
        Value::Bool(_) => Some("bool"),
        _ => None,
    }
}

/// Validate an `in`/`not_in` style array operand: non-empty, within the
/// element limit (`0` means unlimited), and homogeneous over one basic
/// element type.
pub(crate) fn validate_basic_slice(
    operator: &OpType,
    value: &Value,
    limit: u32,
) -> Result<(), ExprError> {
    let Value::Array(items) = value else {
        return Err(ExprError::ValueShape {
            operator: operator.clone(),
            expected: "an array of basic values",
            value: value.to_string(),
        });
    };

    if items.is_empty() {
        return Err(ExprError::EmptyArray);
    }

    if limit > 0 && items.len() > limit as usize {
        return Err(ExprError::TooManyElements {
            operator: operator.clone(),
            count: items.len(),
            limit,
        });
    }

    let mut kind: Option<&'static str> = None;
    for (index, item) in items.iter().enumerate() {
        let Some(item_kind) = basic_kind(item) else {
            return Err(ExprError::ElementShape {
                index,
                expected: "basic",
                value: item.to_string(),
            });
        };

        match kind {
            None => kind = Some(item_kind),
            Some(expected) if expected != item_kind => {
                return Err(ExprError::ElementShape {
                    index,
                    expected,
                    value: item.to_string(),
                });
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compare_eq_widens_numbers() {
        assert_eq!(compare_eq(&json!(1), &json!(1.0)), Some(true));
        assert_eq!(compare_eq(&json!(2), &json!(1.5)), Some(false));
    }

    #[test]
    fn compare_eq_rejects_mixed_types() {
        assert_eq!(compare_eq(&json!(1), &json!("1")), None);
        assert_eq!(compare_eq(&json!(true), &json!(1)), None);
        assert_eq!(compare_eq(&json!(null), &json!(1)), None);
    }

    #[test]
    fn to_datetime_accepts_all_operand_shapes() {
        assert!(to_datetime(&json!(1_700_000_000)).is_some());
        assert!(to_datetime(&json!(1.5)).is_some());
        assert!(to_datetime(&json!("2024-01-02T03:04:05Z")).is_some());
        assert!(to_datetime(&json!("2024-01-02 03:04:05")).is_some());
        assert!(to_datetime(&json!("2024-01-02")).is_some());
        assert!(to_datetime(&json!("not a time")).is_none());
        assert!(to_datetime(&json!(true)).is_none());
    }

    #[test]
    fn datetime_number_and_string_agree() {
        let from_number = to_datetime(&json!(1_700_000_000)).unwrap();
        let from_string = to_datetime(&json!("2023-11-14T22:13:20Z")).unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn validate_basic_slice_requires_homogeneous_elements() {
        let op = OpType::In;
        assert!(validate_basic_slice(&op, &json!([1, 2, 3]), 0).is_ok());
        assert!(validate_basic_slice(&op, &json!(["a", "b"]), 0).is_ok());
        assert!(validate_basic_slice(&op, &json!([true, false]), 0).is_ok());
        assert!(validate_basic_slice(&op, &json!([1, "a"]), 0).is_err());
        assert!(validate_basic_slice(&op, &json!([]), 0).is_err());
        assert!(validate_basic_slice(&op, &json!(1), 0).is_err());
        assert!(validate_basic_slice(&op, &json!([[1], [2]]), 0).is_err());
    }

    #[test]
    fn validate_basic_slice_enforces_limit() {
        let op = OpType::In;
        assert!(validate_basic_slice(&op, &json!([1, 2, 3]), 3).is_ok());
        assert!(validate_basic_slice(&op, &json!([1, 2, 3]), 2).is_err());
    }

    #[test]
    fn as_non_negative_int_accepts_whole_floats() {
        assert_eq!(as_non_negative_int(&json!(3)), Some(3));
        assert_eq!(as_non_negative_int(&json!(3.0)), Some(3));
        assert_eq!(as_non_negative_int(&json!(3.5)), None);
        assert_eq!(as_non_negative_int(&json!(-1)), None);
        assert_eq!(as_non_negative_int(&json!("3")), None);
    }
}
