use crate::ast::{BinaryOp, Expression, ExpressionNode};
use crate::error::Error;
use crate::runtime::arithmetic::{exec_arithmetic, exec_bitwise, exec_range, exec_unary};
use crate::runtime::comparison::evaluate_comparison;
use crate::runtime::logical::{exec_case, exec_logical};
use crate::types::{ArrayType, MapType, Value};
use std::borrow::Cow;
use std::collections::HashMap;

/// Bound to `length - 1` of the subscripted value while its index is evaluated.
pub const AUTO_RANGE_PARAMETER: &str = "__AutoRangeParameter";

/// Variable lookup for evaluation. Unbound names yield `Undefined`.
pub trait EvaluationContext {
    fn variable_value(&self, name: &str) -> Value;
}

/// Context without any variables
pub struct EmptyContext;

impl EvaluationContext for EmptyContext {
    fn variable_value(&self, _name: &str) -> Value {
        Value::Undefined
    }
}

pub struct VariableContext<'a> {
    variables: Cow<'a, HashMap<String, Value>>,
}

impl<'a> VariableContext<'a> {
    pub fn new(vars: &'a HashMap<String, Value>) -> Self {
        Self { variables: Cow::Borrowed(vars) }
    }

    pub fn with_owned(vars: HashMap<String, Value>) -> Self {
        Self { variables: Cow::Owned(vars) }
    }
}

impl<'a> EvaluationContext for VariableContext<'a> {
    fn variable_value(&self, name: &str) -> Value {
        self.variables.get(name).cloned().unwrap_or(Value::Undefined)
    }
}

/// Shadows a parent context with locally declared variables.
pub struct EvaluationStack<'a> {
    parent: &'a dyn EvaluationContext,
    variables: HashMap<String, Value>,
}

impl<'a> EvaluationStack<'a> {
    pub fn new(parent: &'a dyn EvaluationContext) -> Self {
        Self { parent, variables: HashMap::new() }
    }

    pub fn declare_variable<S: Into<String>>(&mut self, name: S, value: Value) {
        self.variables.insert(name.into(), value);
    }
}

impl<'a> EvaluationContext for EvaluationStack<'a> {
    fn variable_value(&self, name: &str) -> Value {
        match self.variables.get(name) {
            Some(value) => value.clone(),
            None => self.parent.variable_value(name),
        }
    }
}

pub struct Evaluator;

impl Evaluator {
    pub fn eval<C: EvaluationContext>(node: &ExpressionNode, context: &C) -> Result<Value, Error> {
        Self::eval_node(node, context)
    }

    /// Errors leaving a node carry its position unless a deeper node set one.
    pub fn eval_node(node: &ExpressionNode, context: &dyn EvaluationContext) -> Result<Value, Error> {
        Self::eval_expression(node.expression(), context).map_err(|e| e.at(node.position()))
    }

    fn eval_expression(expr: &Expression, context: &dyn EvaluationContext) -> Result<Value, Error> {
        match expr {
            Expression::Literal(value) => Ok(value.clone()),

            Expression::Variable(name) => Ok(context.variable_value(name)),

            Expression::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    splice_into(&mut items, Self::eval_node(element, context)?)?;
                }
                Ok(Value::from(items))
            }

            Expression::Map(entries) => {
                let mut map = MapType::new();
                for (key, element) in entries {
                    map.insert(key.clone(), Self::eval_node(element, context)?);
                }
                Ok(Value::from(map))
            }

            Expression::Unary(op, operand) => {
                let value = Self::eval_node(operand, context)?;
                exec_unary(*op, value)
            }

            Expression::Binary(left, op, right) => Self::eval_binary(
                *op,
                || Self::eval_node(left, context),
                || Self::eval_node(right, context),
            ),

            Expression::Subscript { target, index } => {
                let target_value = Self::eval_node(target, context)?;
                let mut stack = EvaluationStack::new(context);
                stack.declare_variable(AUTO_RANGE_PARAMETER, auto_range_bound(&target_value));
                let index_value = Self::eval_node(index, &stack)?;
                target_value.at(&index_value)
            }

            Expression::Switch(cases) => {
                for case in cases {
                    let value = Self::eval_node(case, context)?;
                    if !value.is_undefined() {
                        return Ok(value);
                    }
                }
                Ok(Value::Undefined)
            }
        }
    }

    /// Applies a binary operator to lazily evaluated operands.
    pub fn eval_binary<L, R>(op: BinaryOp, lhs: L, rhs: R) -> Result<Value, Error>
    where
        L: FnOnce() -> Result<Value, Error>,
        R: FnOnce() -> Result<Value, Error>,
    {
        match op {
            BinaryOp::Addition
            | BinaryOp::Subtraction
            | BinaryOp::Multiplication
            | BinaryOp::Division
            | BinaryOp::Modulus => {
                let (a, b) = (lhs()?, rhs()?);
                exec_arithmetic(op, &a, &b)
            }
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr => exec_logical(op, lhs, rhs),
            BinaryOp::BitwiseAnd
            | BinaryOp::BitwiseXOr
            | BinaryOp::BitwiseOr
            | BinaryOp::BitwiseShiftLeft
            | BinaryOp::BitwiseShiftRight => {
                let (a, b) = (lhs()?, rhs()?);
                exec_bitwise(op, &a, &b)
            }
            BinaryOp::Less
            | BinaryOp::LessOrEqual
            | BinaryOp::Greater
            | BinaryOp::GreaterOrEqual
            | BinaryOp::Equal
            | BinaryOp::NotEqual => {
                let (a, b) = (lhs()?, rhs()?);
                evaluate_comparison(op, &a, &b)
            }
            BinaryOp::BoundedRange => {
                let (a, b) = (lhs()?, rhs()?);
                exec_range(&a, &b)
            }
            BinaryOp::Case => exec_case(lhs, rhs),
        }
    }
}

/// Value of the auto range parameter for `target`; `-1` when it is empty.
pub(crate) fn auto_range_bound(target: &Value) -> Value {
    Value::Number(target.length() as f64 - 1.0)
}

/// Appends `value` to an array under construction, expanding bounded ranges
/// into their elements.
pub(crate) fn splice_into(items: &mut ArrayType, value: Value) -> Result<(), Error> {
    match value {
        Value::Range(range) => match range.elements() {
            Some(elements) => {
                items.extend(elements.map(|n| Value::Number(n as f64)));
                Ok(())
            }
            None => Err(Error::evaluation(format!(
                "Cannot splice unbounded range '{}' into an array",
                range
            ))),
        },
        other => {
            items.push(other);
            Ok(())
        }
    }
}
