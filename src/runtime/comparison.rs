use std::cmp::Ordering;

use crate::ast::BinaryOp;
use crate::error::{Error, ErrorKind};
use crate::types::{RangeType, Value, ValueType};

/// Three-way comparison following the cross-type ordering table.
///
/// Null and Undefined sort below every concrete value and are only equal
/// to themselves. A failed coercion is reported as an evaluation error
/// naming both operands.
pub fn compare(lhs: &Value, rhs: &Value) -> Result<Ordering, Error> {
    compare_values(lhs, rhs).map_err(|cause| {
        if cause.kind == ErrorKind::Conversion {
            Error::evaluation(format!("{}: {}", compare_message(lhs, rhs), cause.message))
        } else {
            cause
        }
    })
}

fn compare_values(lhs: &Value, rhs: &Value) -> Result<Ordering, Error> {
    use Value::*;
    match (lhs, rhs) {
        (Null, Null) | (Undefined, Undefined) => Ok(Ordering::Equal),
        (Null, _) | (Undefined, _) => Ok(Ordering::Less),
        (_, Null) | (_, Undefined) => Ok(Ordering::Greater),

        (Boolean(_), Boolean(_) | Number(_) | String(_))
        | (Number(_) | String(_), Boolean(_)) => compare_as_booleans(lhs, rhs),
        (Number(_), Number(_) | String(_)) | (String(_), Number(_)) => compare_as_numbers(lhs, rhs),
        (String(l), String(r)) => Ok(l.cmp(r)),

        (Array(l), Array(r)) => compare_sequences(l.iter(), r.iter()),
        (Map(l), Map(r)) => {
            let mut left = l.iter();
            let mut right = r.iter();
            loop {
                match (left.next(), right.next()) {
                    (None, None) => return Ok(Ordering::Equal),
                    (None, Some(_)) => return Ok(Ordering::Less),
                    (Some(_), None) => return Ok(Ordering::Greater),
                    (Some((lk, lv)), Some((rk, rv))) => {
                        let mut order = lk.cmp(rk);
                        if order == Ordering::Equal {
                            order = compare(lv, rv)?;
                        }
                        if order != Ordering::Equal {
                            return Ok(order);
                        }
                    }
                }
            }
        }
        (Range(l), Range(r)) => compare_ranges(lhs, rhs, l, r),
        _ => Err(Error::evaluation(compare_message(lhs, rhs))),
    }
}

fn compare_as_booleans(lhs: &Value, rhs: &Value) -> Result<Ordering, Error> {
    let l = lhs.convert_to(ValueType::Boolean)?.boolean_value()?;
    let r = rhs.convert_to(ValueType::Boolean)?.boolean_value()?;
    Ok(l.cmp(&r))
}

fn compare_as_numbers(lhs: &Value, rhs: &Value) -> Result<Ordering, Error> {
    let diff = lhs.convert_to(ValueType::Number)?.number_value()? - rhs.convert_to(ValueType::Number)?.number_value()?;
    Ok(if diff < 0.0 {
        Ordering::Less
    } else if diff > 0.0 {
        Ordering::Greater
    } else {
        Ordering::Equal
    })
}

fn compare_sequences<'a>(
    mut left: impl Iterator<Item = &'a Value>,
    mut right: impl Iterator<Item = &'a Value>,
) -> Result<Ordering, Error> {
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ok(Ordering::Equal),
            (None, Some(_)) => return Ok(Ordering::Less),
            (Some(_), None) => return Ok(Ordering::Greater),
            (Some(l), Some(r)) => {
                let order = compare(l, r)?;
                if order != Ordering::Equal {
                    return Ok(order);
                }
            }
        }
    }
}

/// Bounded ranges compare element by element. Half-open ranges have no
/// elements of their own and cannot be ordered.
fn compare_ranges(lhs: &Value, rhs: &Value, l: &RangeType, r: &RangeType) -> Result<Ordering, Error> {
    match (l.elements(), r.elements()) {
        (Some(left), Some(right)) => Ok(left.cmp(right)),
        _ => Err(Error::evaluation(format!(
            "{}: unbounded ranges cannot be compared",
            compare_message(lhs, rhs)
        ))),
    }
}

fn compare_message(lhs: &Value, rhs: &Value) -> String {
    format!(
        "Cannot compare value '{}' of type '{}' to value '{}' of type '{}'",
        lhs.describe(),
        lhs.type_name(),
        rhs.describe(),
        rhs.type_name()
    )
}

/// Applies a comparison operator. An undefined operand yields `Undefined`.
pub fn evaluate_comparison(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, Error> {
    if lhs.is_undefined() || rhs.is_undefined() {
        return Ok(Value::Undefined);
    }
    let order = compare(lhs, rhs)?;
    let result = match op {
        BinaryOp::Less => order == Ordering::Less,
        BinaryOp::LessOrEqual => order != Ordering::Greater,
        BinaryOp::Greater => order == Ordering::Greater,
        BinaryOp::GreaterOrEqual => order != Ordering::Less,
        BinaryOp::Equal => order == Ordering::Equal,
        BinaryOp::NotEqual => order != Ordering::Equal,
        _ => return Err(Error::evaluation(format!("'{}' is not a comparison operator", op))),
    };
    Ok(Value::Boolean(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArrayType;

    #[test]
    fn cross_type_table() {
        assert_eq!(compare(&Value::from(true), &Value::from(1.0)).unwrap(), Ordering::Equal);
        assert_eq!(compare(&Value::from(false), &Value::from("x")).unwrap(), Ordering::Less);
        assert_eq!(compare(&Value::from(2.0), &Value::from("10")).unwrap(), Ordering::Less);
        assert_eq!(compare(&Value::from("b"), &Value::from("a")).unwrap(), Ordering::Greater);
        assert_eq!(compare(&Value::null(), &Value::from(0.0)).unwrap(), Ordering::Less);
        assert_eq!(compare(&Value::from(0.0), &Value::undefined()).unwrap(), Ordering::Greater);
        assert_eq!(compare(&Value::null(), &Value::null()).unwrap(), Ordering::Equal);
        assert_eq!(compare(&Value::null(), &Value::undefined()).unwrap(), Ordering::Less);
    }

    #[test]
    fn containers_compare_lexicographically() {
        let a = Value::from(vec![Value::from(1.0), Value::from(2.0)]);
        let b = Value::from(vec![Value::from(1.0), Value::from(3.0)]);
        let c = Value::from(vec![Value::from(1.0)]);
        assert_eq!(compare(&a, &b).unwrap(), Ordering::Less);
        assert_eq!(compare(&c, &a).unwrap(), Ordering::Less);
        assert_eq!(compare(&a, &a).unwrap(), Ordering::Equal);
    }

    #[test]
    fn range_comparison() {
        let r = |f, l| Value::from(RangeType::bounded(f, l));
        assert_eq!(compare(&r(1, 3), &r(1, 3)).unwrap(), Ordering::Equal);
        assert_eq!(compare(&r(1, 2), &r(1, 3)).unwrap(), Ordering::Less);
        assert_eq!(compare(&r(3, 1), &r(1, 3)).unwrap(), Ordering::Greater);
        let open = Value::from(RangeType::LeftBounded { first: 1 });
        assert_eq!(compare(&open, &r(1, 3)).unwrap_err().kind, ErrorKind::Evaluation);
    }

    #[test]
    fn failed_coercion_is_rewrapped() {
        let err = compare(&Value::from(1.0), &Value::from("abc")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Evaluation);
        assert!(err.message.starts_with("Cannot compare value '1' of type 'Number' to value '\"abc\"'"));
        assert!(err.message.contains("Cannot convert value"));
    }

    #[test]
    fn unlisted_pairs_fail() {
        let err = compare(&Value::from(1.0), &Value::from(ArrayType::new())).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Evaluation);
    }
}
