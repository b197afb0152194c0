use crate::ast::BinaryOp;
use crate::error::Error;
use crate::types::{Value, ValueType};

fn truthy(value: &Value) -> Result<bool, Error> {
    value.convert_to(ValueType::Boolean)?.boolean_value()
}

/// `&&` and `||` with short-circuiting. The right operand is only
/// evaluated when the left one does not decide the outcome.
pub fn exec_logical<L, R>(op: BinaryOp, lhs: L, rhs: R) -> Result<Value, Error>
where
    L: FnOnce() -> Result<Value, Error>,
    R: FnOnce() -> Result<Value, Error>,
{
    let decisive = match op {
        BinaryOp::LogicalAnd => false,
        BinaryOp::LogicalOr => true,
        _ => return Err(Error::evaluation(format!("'{}' is not a logical operator", op))),
    };
    let logical = [ValueType::Boolean, ValueType::Null];

    let lhs = lhs()?;
    if lhs.is_undefined() {
        return Ok(Value::Undefined);
    }

    let rhs = if lhs.has_type(&logical) {
        if truthy(&lhs)? == decisive {
            return Ok(Value::Boolean(decisive));
        }
        let rhs = rhs()?;
        if rhs.has_type(&logical) {
            return Ok(Value::Boolean(truthy(&rhs)?));
        }
        rhs
    } else {
        rhs()?
    };

    if rhs.is_undefined() {
        return Ok(Value::Undefined);
    }
    Err(Error::evaluation(format!(
        "Cannot apply operator {} to '{}' of type '{}' and '{}' of type '{}'",
        op,
        lhs.describe(),
        lhs.type_name(),
        rhs.describe(),
        rhs.type_name()
    )))
}

/// `cond -> result`: the result when the condition holds, else `Undefined`.
/// The result is not evaluated otherwise.
pub fn exec_case<L, R>(lhs: L, rhs: R) -> Result<Value, Error>
where
    L: FnOnce() -> Result<Value, Error>,
    R: FnOnce() -> Result<Value, Error>,
{
    let condition = lhs()?;
    if !condition.is_undefined() && truthy(&condition)? {
        rhs()
    } else {
        Ok(Value::Undefined)
    }
}
