use std::cell::Cell;

use tracing::trace;

use crate::ast::{Expression, ExpressionNode};
use crate::error::Error;
use crate::runtime::evaluator::{splice_into, EvaluationContext, Evaluator};
use crate::types::{MapType, Value};

/// Empty context that remembers whether anything asked it for a variable.
#[derive(Default)]
struct TrialContext {
    looked_up: Cell<bool>,
}

impl EvaluationContext for TrialContext {
    fn variable_value(&self, _name: &str) -> Value {
        self.looked_up.set(true);
        Value::Undefined
    }
}

impl TrialContext {
    /// A trial result is foldable if it is defined and needed no variable.
    fn accept(&self, node: &ExpressionNode, result: Result<Value, Error>) -> Option<Value> {
        match result {
            Ok(value) if !value.is_undefined() && !self.looked_up.get() => Some(value),
            Ok(_) => None,
            Err(e) => {
                trace!(expression = %node, error = %e, "not foldable");
                None
            }
        }
    }
}

fn folded(node: &ExpressionNode, value: Value) -> ExpressionNode {
    trace!(expression = %node, value = %value, "folded into literal");
    ExpressionNode::new(Expression::Literal(value), node.position())
}

/// Returns a tree where every constant subtree is replaced by its value.
/// Unchanged leaves are shared with the input tree.
pub fn optimize(node: &ExpressionNode) -> ExpressionNode {
    match node.expression() {
        Expression::Literal(_) | Expression::Variable(_) => node.clone(),

        Expression::Array(elements) => {
            let elements: Vec<ExpressionNode> = elements.iter().map(optimize).collect();
            let candidate = ExpressionNode::new(Expression::Array(elements), node.position());
            match fold_array(&candidate) {
                Some(value) => folded(node, value),
                None => candidate,
            }
        }

        Expression::Map(entries) => {
            let entries: Vec<(String, ExpressionNode)> =
                entries.iter().map(|(k, e)| (k.clone(), optimize(e))).collect();
            let candidate = ExpressionNode::new(Expression::Map(entries), node.position());
            match fold_map(&candidate) {
                Some(value) => folded(node, value),
                None => candidate,
            }
        }

        Expression::Unary(op, operand) => {
            let candidate = ExpressionNode::new(Expression::Unary(*op, optimize(operand)), node.position());
            fold_or_keep(node, candidate)
        }

        Expression::Binary(left, op, right) => {
            let context = TrialContext::default();
            let mut optimized_left = None;
            let mut optimized_right = None;
            let result = Evaluator::eval_binary(
                *op,
                || {
                    let optimized = optimize(left);
                    let value = Evaluator::eval(&optimized, &context);
                    optimized_left = Some(optimized);
                    value
                },
                || {
                    let optimized = optimize(right);
                    let value = Evaluator::eval(&optimized, &context);
                    optimized_right = Some(optimized);
                    value
                },
            );
            if let Some(value) = context.accept(node, result) {
                return folded(node, value);
            }
            // Children keep their precedence or become literals, so the
            // order below this node still holds.
            ExpressionNode::new(
                Expression::Binary(
                    optimized_left.unwrap_or_else(|| optimize(left)),
                    *op,
                    optimized_right.unwrap_or_else(|| optimize(right)),
                ),
                node.position(),
            )
        }

        Expression::Subscript { target, index } => {
            let candidate = ExpressionNode::new(
                Expression::Subscript { target: optimize(target), index: optimize(index) },
                node.position(),
            );
            fold_or_keep(node, candidate)
        }

        Expression::Switch(cases) => {
            if cases.is_empty() {
                return node.clone();
            }
            let cases: Vec<ExpressionNode> = cases.iter().map(optimize).collect();
            let context = TrialContext::default();
            let first = Evaluator::eval(&cases[0], &context);
            match context.accept(node, first) {
                Some(value) => folded(node, value),
                None => ExpressionNode::new(Expression::Switch(cases), node.position()),
            }
        }
    }
}

fn fold_or_keep(node: &ExpressionNode, candidate: ExpressionNode) -> ExpressionNode {
    let context = TrialContext::default();
    let result = Evaluator::eval(&candidate, &context);
    match context.accept(node, result) {
        Some(value) => folded(node, value),
        None => candidate,
    }
}

/// Folds an array only if every element has a defined constant value.
fn fold_array(candidate: &ExpressionNode) -> Option<Value> {
    let elements = match candidate.expression() {
        Expression::Array(elements) => elements,
        _ => return None,
    };
    let mut items = Vec::with_capacity(elements.len());
    for element in elements {
        let context = TrialContext::default();
        let value = context.accept(element, Evaluator::eval(element, &context))?;
        if let Err(e) = splice_into(&mut items, value) {
            trace!(expression = %candidate, error = %e, "not foldable");
            return None;
        }
    }
    Some(Value::from(items))
}

fn fold_map(candidate: &ExpressionNode) -> Option<Value> {
    let entries = match candidate.expression() {
        Expression::Map(entries) => entries,
        _ => return None,
    };
    let mut map = MapType::new();
    for (key, element) in entries {
        let context = TrialContext::default();
        let value = context.accept(element, Evaluator::eval(element, &context))?;
        map.insert(key.clone(), value);
    }
    Some(Value::from(map))
}
