pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod types;

pub use ast::{BinaryOp, Expression, ExpressionNode, UnaryOp};
pub use error::{Error, ErrorKind};
pub use runtime::{compare, EmptyContext, EvaluationContext, EvaluationStack, VariableContext};
pub use types::{ArrayType, MapType, RangeType, Value, ValueType};

use std::collections::HashMap;
use tracing::debug;

/// Parse EL source (optional leading '=') into an expression tree.
pub fn parse(input: &str) -> Result<ExpressionNode, Error> {
    // Allow optional leading '=' after whitespace; offsets stay relative to `input`
    let trimmed = input.trim_start();
    let offset = input.len() - trimmed.len();
    let (source, shift) = match trimmed.strip_prefix('=') {
        Some(rest) => (rest, offset + 1),
        None => (input, 0),
    };
    let mut parser = parser::Parser::new(source).map_err(|e| shift_error(e, shift))?;
    parser.parse().map_err(|e| shift_error(e, shift))
}

fn shift_error(mut e: Error, shift: usize) -> Error {
    e.position = e.position.map(|p| p + shift);
    e
}

/// Evaluate an expression without variables.
pub fn evaluate(input: &str) -> Result<Value, Error> {
    parse(input)?.evaluate(&EmptyContext)
}

/// Evaluate with a map of variables.
pub fn evaluate_with(input: &str, vars: &HashMap<String, Value>) -> Result<Value, Error> {
    parse(input)?.evaluate(&VariableContext::new(vars))
}

/// Evaluate with variables provided as a JSON object.
/// JSON format: {"var1": "value1", "var2": 42, "var3": [true, null]}
pub fn evaluate_with_json(input: &str, json_vars: &str) -> Result<Value, Error> {
    let vars = json_variables(json_vars)?;
    evaluate_with(input, &vars)
}

/// Reads a JSON object into a variable map.
pub fn json_variables(json_vars: &str) -> Result<HashMap<String, Value>, Error> {
    let json_value: serde_json::Value = serde_json::from_str(json_vars)
        .map_err(|e| Error::new(ErrorKind::Conversion, format!("Invalid JSON: {}", e), None))?;

    match json_value {
        serde_json::Value::Object(map) => Ok(map.into_iter().map(|(k, v)| (k, json_to_value(v))).collect()),
        _ => Err(Error::new(
            ErrorKind::Conversion,
            "JSON must be an object with key-value pairs",
            None,
        )),
    }
}

/// Evaluates `node`, turning evaluation-family errors into `Undefined`.
/// Conversion and parse errors are still returned.
pub fn try_evaluate<C: EvaluationContext>(node: &ExpressionNode, context: &C) -> Result<Value, Error> {
    match node.evaluate(context) {
        Err(e) if e.kind.is_evaluation_error() => {
            debug!(expression = %node, error = %e, "evaluation failed, yielding undefined");
            Ok(Value::Undefined)
        }
        other => other,
    }
}

/// Constant-folds `node`.
pub fn optimize(node: &ExpressionNode) -> ExpressionNode {
    runtime::optimize(node)
}

/// Convert serde_json::Value to Value; objects become maps.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        // every JSON number fits an f64, possibly rounded
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::from(s),
        serde_json::Value::Array(arr) => Value::from(arr.into_iter().map(json_to_value).collect::<ArrayType>()),
        serde_json::Value::Object(map) => {
            Value::from(map.into_iter().map(|(k, v)| (k, json_to_value(v))).collect::<MapType>())
        }
    }
}

/// Convert a Value to JSON. Unbounded ranges and undefined have no JSON form.
pub fn value_to_json(value: &Value) -> Result<serde_json::Value, Error> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect::<Result<Vec<_>, Error>>()?),
        Value::Map(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), value_to_json(v)?)))
                .collect::<Result<serde_json::Map<_, _>, Error>>()?,
        ),
        Value::Range(range) => match range.elements() {
            Some(elements) => serde_json::Value::Array(elements.map(serde_json::Value::from).collect()),
            None => return Err(Error::conversion(value, ValueType::Array)),
        },
        Value::Undefined => return Err(Error::conversion(value, ValueType::Null)),
    })
}
