use crate::ast::{BinaryOp, UnaryOp};
use crate::error::Error;
use crate::types::{ArrayType, RangeType, Value, ValueType};

fn operands(lhs: &Value, rhs: &Value) -> String {
    format!(
        "'{}' of type '{}' and '{}' of type '{}'",
        lhs.describe(),
        lhs.type_name(),
        rhs.describe(),
        rhs.type_name()
    )
}

fn number_of(value: &Value) -> Result<f64, Error> {
    value.convert_to(ValueType::Number)?.number_value()
}

/// Coerces both operands to numbers when the pair allows it: booleans and
/// numbers always do, a string only when paired with one of those and
/// parseable as a number.
fn numeric_pair(lhs: &Value, rhs: &Value) -> Result<Option<(f64, f64)>, Error> {
    let scalar = [ValueType::Boolean, ValueType::Number];
    if lhs.has_type(&scalar) && rhs.has_type(&scalar) {
        return Ok(Some((number_of(lhs)?, number_of(rhs)?)));
    }
    if lhs.has_type(&scalar) && rhs.has_type(&[ValueType::String]) {
        if let Some(r) = rhs.try_convert_to(ValueType::Number) {
            return Ok(Some((number_of(lhs)?, r.number_value()?)));
        }
    }
    if lhs.has_type(&[ValueType::String]) && rhs.has_type(&scalar) {
        if let Some(l) = lhs.try_convert_to(ValueType::Number) {
            return Ok(Some((l.number_value()?, number_of(rhs)?)));
        }
    }
    Ok(None)
}

/// Addition, subtraction, multiplication, division and modulus.
pub fn exec_arithmetic(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, Error> {
    if lhs.is_undefined() || rhs.is_undefined() {
        return Ok(Value::Undefined);
    }
    if let Some((a, b)) = numeric_pair(lhs, rhs)? {
        let n = match op {
            BinaryOp::Addition => a + b,
            BinaryOp::Subtraction => a - b,
            BinaryOp::Multiplication => a * b,
            BinaryOp::Division => a / b,
            BinaryOp::Modulus => a % b,
            _ => return Err(Error::evaluation(format!("'{}' is not an arithmetic operator", op))),
        };
        return Ok(Value::Number(n));
    }
    if op == BinaryOp::Addition {
        match (lhs, rhs) {
            (Value::String(a), Value::String(b)) => return Ok(Value::from(format!("{}{}", a, b))),
            (Value::Array(a), Value::Array(b)) => {
                let mut items: ArrayType = Vec::with_capacity(a.len() + b.len());
                items.extend(a.iter().cloned());
                items.extend(b.iter().cloned());
                return Ok(Value::from(items));
            }
            (Value::Map(a), Value::Map(b)) => {
                let mut map = (**a).clone();
                map.extend(b.iter().map(|(k, v)| (k.clone(), v.clone())));
                return Ok(Value::from(map));
            }
            _ => {}
        }
    }
    let message = match op {
        BinaryOp::Addition => format!("Cannot add {}", operands(lhs, rhs)),
        BinaryOp::Subtraction => format!("Cannot subtract {}", operands(lhs, rhs)),
        BinaryOp::Multiplication => format!("Cannot multiply {}", operands(lhs, rhs)),
        BinaryOp::Division => format!("Cannot divide {}", operands(lhs, rhs)),
        _ => format!("Cannot apply operator {} to {}", op, operands(lhs, rhs)),
    };
    Err(Error::evaluation(message))
}

/// Bitwise operators on the integer truncation of both operands.
pub fn exec_bitwise(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, Error> {
    if lhs.is_undefined() || rhs.is_undefined() {
        return Ok(Value::Undefined);
    }
    if !lhs.convertible_to(ValueType::Number) || !rhs.convertible_to(ValueType::Number) {
        return Err(Error::evaluation(format!(
            "Cannot apply operator {} to {}",
            op,
            operands(lhs, rhs)
        )));
    }
    let a = number_of(lhs)? as i64;
    let b = number_of(rhs)? as i64;
    let n = match op {
        BinaryOp::BitwiseAnd => a & b,
        BinaryOp::BitwiseXOr => a ^ b,
        BinaryOp::BitwiseOr => a | b,
        BinaryOp::BitwiseShiftLeft => a.wrapping_shl(b as u32),
        BinaryOp::BitwiseShiftRight => a.wrapping_shr(b as u32),
        _ => return Err(Error::evaluation(format!("'{}' is not a bitwise operator", op))),
    };
    Ok(Value::Number(n as f64))
}

/// The `..` operator. Both bounds are truncated to integers.
pub fn exec_range(lhs: &Value, rhs: &Value) -> Result<Value, Error> {
    if lhs.is_undefined() || rhs.is_undefined() {
        return Ok(Value::Undefined);
    }
    let first = number_of(lhs)? as i64;
    let last = number_of(rhs)? as i64;
    Ok(Value::Range(RangeType::bounded(first, last)))
}

pub fn exec_unary(op: UnaryOp, operand: Value) -> Result<Value, Error> {
    if operand.is_undefined() {
        return Ok(Value::Undefined);
    }
    let numeric = match &operand {
        Value::Boolean(_) | Value::Number(_) => Some(number_of(&operand)?),
        Value::String(_) => operand.try_convert_to(ValueType::Number).map(|n| n.number_value()).transpose()?,
        _ => None,
    };
    let result = match op {
        UnaryOp::Plus => numeric.map(Value::Number),
        UnaryOp::Minus => numeric.map(|n| Value::Number(-n)),
        UnaryOp::LogicalNegation => match operand {
            Value::Boolean(b) => Some(Value::Boolean(!b)),
            _ => None,
        },
        UnaryOp::BitwiseNegation => match operand {
            Value::Number(_) | Value::String(_) => numeric.map(|n| Value::Number(!(n as i64) as f64)),
            _ => None,
        },
        UnaryOp::Group => return Ok(operand),
        UnaryOp::LeftBoundedRange => {
            let first = number_of(&operand)? as i64;
            Some(Value::Range(RangeType::LeftBounded { first }))
        }
        UnaryOp::RightBoundedRange => {
            let last = number_of(&operand)? as i64;
            Some(Value::Range(RangeType::RightBounded { last }))
        }
    };
    result.ok_or_else(|| {
        let what = match op {
            UnaryOp::Plus => "unary plus",
            UnaryOp::Minus => "unary minus",
            UnaryOp::LogicalNegation => "logical negation",
            _ => "bitwise negation",
        };
        Error::evaluation(format!(
            "Cannot apply {} to value '{}' of type '{}'",
            what,
            operand.describe(),
            operand.type_name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn numeric_coercions() {
        let add = |a: Value, b: Value| exec_arithmetic(BinaryOp::Addition, &a, &b).unwrap();
        assert_eq!(add(Value::from(true), Value::from(2.0)), Value::from(3.0));
        assert_eq!(add(Value::from(1.0), Value::from("2")), Value::from(3.0));
        assert_eq!(add(Value::from("2"), Value::from(false)), Value::from(2.0));
        assert_eq!(add(Value::from("2"), Value::from("3")), Value::from("23"));
        assert!(exec_arithmetic(BinaryOp::Addition, &Value::from(1.0), &Value::from("x")).is_err());
    }

    #[test]
    fn division_and_modulus_are_floating() {
        let div = exec_arithmetic(BinaryOp::Division, &Value::from(7.0), &Value::from(2.0)).unwrap();
        assert_eq!(div, Value::from(3.5));
        let rem = exec_arithmetic(BinaryOp::Modulus, &Value::from(-7.5), &Value::from(2.0)).unwrap();
        assert_eq!(rem, Value::from(-1.5));
    }

    #[test]
    fn error_names_both_operands() {
        let err = exec_arithmetic(BinaryOp::Subtraction, &Value::from("a"), &Value::null()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Evaluation);
        assert_eq!(err.message, "Cannot subtract '\"a\"' of type 'String' and 'null' of type 'Null'");
    }

    #[test]
    fn bitwise_truncates() {
        let and = exec_bitwise(BinaryOp::BitwiseAnd, &Value::from(7.9), &Value::from(3.2)).unwrap();
        assert_eq!(and, Value::from(3.0));
        let shl = exec_bitwise(BinaryOp::BitwiseShiftLeft, &Value::from(1.0), &Value::from(4.0)).unwrap();
        assert_eq!(shl, Value::from(16.0));
        let null = exec_bitwise(BinaryOp::BitwiseOr, &Value::null(), &Value::from(2.0)).unwrap();
        assert_eq!(null, Value::from(2.0));
        assert!(exec_bitwise(BinaryOp::BitwiseXOr, &Value::from("x"), &Value::from(1.0)).is_err());
    }

    #[test]
    fn unary_operators() {
        assert_eq!(exec_unary(UnaryOp::Minus, Value::from("4")).unwrap(), Value::from(-4.0));
        assert_eq!(exec_unary(UnaryOp::Plus, Value::from(true)).unwrap(), Value::from(1.0));
        assert_eq!(exec_unary(UnaryOp::BitwiseNegation, Value::from(0.0)).unwrap(), Value::from(-1.0));
        assert!(exec_unary(UnaryOp::BitwiseNegation, Value::from(true)).is_err());
        assert!(exec_unary(UnaryOp::LogicalNegation, Value::from(1.0)).is_err());
        assert_eq!(exec_unary(UnaryOp::Minus, Value::undefined()).unwrap(), Value::undefined());
        assert_eq!(
            exec_unary(UnaryOp::LeftBoundedRange, Value::from(2.7)).unwrap(),
            Value::from(RangeType::LeftBounded { first: 2 })
        );
    }
}
