use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::error::Error;
use crate::runtime::evaluator::{EvaluationContext, Evaluator};
use crate::runtime::optimizer;
use crate::runtime::utils::escape_string;
use crate::types::Value;

/// Precedence of every node that is not a binary operator.
pub const ATOMIC_PRECEDENCE: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    LogicalNegation,
    BitwiseNegation,
    Group,
    LeftBoundedRange,
    RightBoundedRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulus,
    LogicalAnd,
    LogicalOr,
    BitwiseAnd,
    BitwiseXOr,
    BitwiseOr,
    BitwiseShiftLeft,
    BitwiseShiftRight,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
    BoundedRange,
    Case,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 20] = [
        BinaryOp::Addition,
        BinaryOp::Subtraction,
        BinaryOp::Multiplication,
        BinaryOp::Division,
        BinaryOp::Modulus,
        BinaryOp::LogicalAnd,
        BinaryOp::LogicalOr,
        BinaryOp::BitwiseAnd,
        BinaryOp::BitwiseXOr,
        BinaryOp::BitwiseOr,
        BinaryOp::BitwiseShiftLeft,
        BinaryOp::BitwiseShiftRight,
        BinaryOp::Less,
        BinaryOp::LessOrEqual,
        BinaryOp::Greater,
        BinaryOp::GreaterOrEqual,
        BinaryOp::Equal,
        BinaryOp::NotEqual,
        BinaryOp::BoundedRange,
        BinaryOp::Case,
    ];

    /// Higher binds tighter.
    pub fn precedence(self) -> usize {
        match self {
            BinaryOp::Multiplication | BinaryOp::Division | BinaryOp::Modulus => 12,
            BinaryOp::Addition | BinaryOp::Subtraction => 11,
            BinaryOp::BitwiseShiftLeft | BinaryOp::BitwiseShiftRight => 10,
            BinaryOp::Less | BinaryOp::LessOrEqual | BinaryOp::Greater | BinaryOp::GreaterOrEqual => 9,
            BinaryOp::Equal | BinaryOp::NotEqual => 8,
            BinaryOp::BitwiseAnd => 7,
            BinaryOp::BitwiseXOr => 6,
            BinaryOp::BitwiseOr => 5,
            BinaryOp::LogicalAnd => 4,
            BinaryOp::LogicalOr => 3,
            BinaryOp::BoundedRange => 2,
            BinaryOp::Case => 1,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Addition => "+",
            BinaryOp::Subtraction => "-",
            BinaryOp::Multiplication => "*",
            BinaryOp::Division => "/",
            BinaryOp::Modulus => "%",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::BitwiseAnd => "&",
            BinaryOp::BitwiseXOr => "^",
            BinaryOp::BitwiseOr => "|",
            BinaryOp::BitwiseShiftLeft => "<<",
            BinaryOp::BitwiseShiftRight => ">>",
            BinaryOp::Less => "<",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::BoundedRange => "..",
            BinaryOp::Case => "->",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Less
                | BinaryOp::LessOrEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterOrEqual
                | BinaryOp::Equal
                | BinaryOp::NotEqual
        )
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Value),
    Variable(String),
    /// Range elements are spliced into the result.
    Array(Vec<ExpressionNode>),
    /// Later entries win over earlier ones with the same key.
    Map(Vec<(String, ExpressionNode)>),
    Unary(UnaryOp, ExpressionNode),
    Binary(ExpressionNode, BinaryOp, ExpressionNode),
    Subscript { target: ExpressionNode, index: ExpressionNode },
    Switch(Vec<ExpressionNode>),
}

impl Expression {
    pub fn precedence(&self) -> usize {
        match self {
            Expression::Binary(_, op, _) => op.precedence(),
            _ => ATOMIC_PRECEDENCE,
        }
    }
}

/// A shared, immutable tree node with an optional source offset.
///
/// Equality is structural and ignores the source offset.
#[derive(Debug, Clone)]
pub struct ExpressionNode {
    expression: Arc<Expression>,
    position: Option<usize>,
}

impl PartialEq for ExpressionNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.expression, &other.expression) || self.expression == other.expression
    }
}

impl ExpressionNode {
    pub fn new(expression: Expression, position: Option<usize>) -> Self {
        Self { expression: Arc::new(expression), position }
    }

    pub fn literal<V: Into<Value>>(value: V) -> Self {
        Self::new(Expression::Literal(value.into()), None)
    }

    pub fn variable<S: Into<String>>(name: S) -> Self {
        Self::new(Expression::Variable(name.into()), None)
    }

    pub fn array(elements: Vec<ExpressionNode>) -> Self {
        Self::new(Expression::Array(elements), None)
    }

    pub fn map(entries: Vec<(String, ExpressionNode)>) -> Self {
        Self::new(Expression::Map(entries), None)
    }

    pub fn unary(op: UnaryOp, operand: ExpressionNode) -> Self {
        Self::new(Expression::Unary(op, operand), None)
    }

    /// Builds a binary node and restores the precedence order of the
    /// subtree it roots.
    pub fn binary(op: BinaryOp, left: ExpressionNode, right: ExpressionNode) -> Self {
        rebalance(op, left, right)
    }

    /// Builds a binary node as given. Callers must keep the precedence
    /// order intact themselves.
    pub fn binary_unbalanced(op: BinaryOp, left: ExpressionNode, right: ExpressionNode) -> Self {
        let position = left.position;
        Self::new(Expression::Binary(left, op, right), position)
    }

    pub fn subscript(target: ExpressionNode, index: ExpressionNode) -> Self {
        Self::new(Expression::Subscript { target, index }, None)
    }

    pub fn switch(cases: Vec<ExpressionNode>) -> Self {
        Self::new(Expression::Switch(cases), None)
    }

    /// Sets the source offset of this node.
    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn precedence(&self) -> usize {
        self.expression.precedence()
    }

    pub fn is_literal(&self) -> bool {
        matches!(*self.expression, Expression::Literal(_))
    }

    pub fn evaluate<C: EvaluationContext>(&self, context: &C) -> Result<Value, Error> {
        Evaluator::eval(self, context)
    }

    /// Folds every constant subtree into a literal. Never fails.
    pub fn optimize(&self) -> ExpressionNode {
        optimizer::optimize(self)
    }
}

/// Rotates a freshly built binary node down until no binary child binds
/// looser than its parent. Ties rotate the right child up.
fn rebalance(op: BinaryOp, left: ExpressionNode, right: ExpressionNode) -> ExpressionNode {
    let p = op.precedence();
    let pl = left.precedence();
    let pr = right.precedence();
    if p <= pl.min(pr) {
        return ExpressionNode::binary_unbalanced(op, left, right);
    }

    if pl < pr {
        if let Expression::Binary(ll, lop, lr) = left.expression() {
            let pushed = rebalance(op, lr.clone(), right);
            return ExpressionNode::binary_unbalanced(*lop, ll.clone(), pushed);
        }
    } else if let Expression::Binary(rl, rop, rr) = right.expression() {
        let pushed = rebalance(op, left, rl.clone());
        return ExpressionNode::binary_unbalanced(*rop, pushed, rr.clone());
    }
    ExpressionNode::binary_unbalanced(op, left, right)
}

impl Display for ExpressionNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.expression.fmt(f)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Variable(name) => f.write_str(name),
            Expression::Array(elements) => {
                if elements.is_empty() {
                    return f.write_str("[]");
                }
                f.write_str("[ ")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                f.write_str(" ]")
            }
            Expression::Map(entries) => {
                if entries.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (key, element)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{}\": {}", escape_string(key), element)?;
                }
                f.write_str(" }")
            }
            Expression::Unary(op, operand) => match op {
                UnaryOp::Plus => write!(f, "+{}", operand),
                UnaryOp::Minus => write!(f, "-{}", operand),
                UnaryOp::LogicalNegation => write!(f, "!{}", operand),
                UnaryOp::BitwiseNegation => write!(f, "~{}", operand),
                UnaryOp::Group => write!(f, "( {} )", operand),
                UnaryOp::LeftBoundedRange => write!(f, "{}..", operand),
                UnaryOp::RightBoundedRange => write!(f, "..{}", operand),
            },
            Expression::Binary(left, BinaryOp::BoundedRange, right) => write!(f, "{}..{}", left, right),
            Expression::Binary(left, op, right) => write!(f, "{} {} {}", left, op, right),
            Expression::Subscript { target, index } => write!(f, "{}[{}]", target, index),
            Expression::Switch(cases) => {
                f.write_str("{{ ")?;
                for (i, case) in cases.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", case)?;
                }
                f.write_str(" }}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: f64) -> ExpressionNode {
        ExpressionNode::literal(n)
    }

    fn heap_ordered(node: &ExpressionNode) -> bool {
        match node.expression() {
            Expression::Binary(l, op, r) => {
                op.precedence() <= l.precedence()
                    && op.precedence() <= r.precedence()
                    && heap_ordered(l)
                    && heap_ordered(r)
            }
            Expression::Unary(_, operand) => heap_ordered(operand),
            Expression::Subscript { target, index } => heap_ordered(target) && heap_ordered(index),
            Expression::Array(items) | Expression::Switch(items) => items.iter().all(heap_ordered),
            Expression::Map(entries) => entries.iter().all(|(_, e)| heap_ordered(e)),
            Expression::Literal(_) | Expression::Variable(_) => true,
        }
    }

    #[test]
    fn multiplication_is_pushed_below_addition() {
        // (1 + 2) * 3 as a naive left chain
        let sum = ExpressionNode::binary(BinaryOp::Addition, lit(1.0), lit(2.0));
        let node = ExpressionNode::binary(BinaryOp::Multiplication, sum, lit(3.0));
        let expected = ExpressionNode::binary_unbalanced(
            BinaryOp::Addition,
            lit(1.0),
            ExpressionNode::binary_unbalanced(BinaryOp::Multiplication, lit(2.0), lit(3.0)),
        );
        assert_eq!(node, expected);
        assert_eq!(node.to_string(), "1 + 2 * 3");
    }

    #[test]
    fn balanced_nodes_are_kept() {
        let product = ExpressionNode::binary(BinaryOp::Multiplication, lit(1.0), lit(2.0));
        let node = ExpressionNode::binary(BinaryOp::Addition, product.clone(), lit(3.0));
        assert_eq!(node, ExpressionNode::binary_unbalanced(BinaryOp::Addition, product, lit(3.0)));
    }

    #[test]
    fn every_operator_pair_keeps_heap_order() {
        for outer in BinaryOp::ALL {
            for inner in BinaryOp::ALL {
                for last in BinaryOp::ALL {
                    let first = ExpressionNode::binary(inner, lit(1.0), lit(2.0));
                    let second = ExpressionNode::binary(outer, first, lit(3.0));
                    let third = ExpressionNode::binary(last, second, lit(4.0));
                    assert!(heap_ordered(&third), "{} {} {}: {}", inner, outer, last, third);
                    let right = ExpressionNode::binary(inner, lit(2.0), lit(3.0));
                    let nested = ExpressionNode::binary(outer, lit(1.0), right);
                    assert!(heap_ordered(&nested), "{} {}: {}", outer, inner, nested);
                }
            }
        }
    }

    #[test]
    fn groups_are_atomic() {
        let sum = ExpressionNode::binary(BinaryOp::Addition, lit(1.0), lit(2.0));
        let group = ExpressionNode::unary(UnaryOp::Group, sum);
        let node = ExpressionNode::binary(BinaryOp::Multiplication, group, lit(3.0));
        assert!(matches!(node.expression(), Expression::Binary(_, BinaryOp::Multiplication, _)));
        assert_eq!(node.to_string(), "( 1 + 2 ) * 3");
    }

    #[test]
    fn rendering() {
        let range = ExpressionNode::binary(BinaryOp::BoundedRange, lit(1.0), ExpressionNode::variable("n"));
        assert_eq!(range.to_string(), "1..n");
        let case = ExpressionNode::binary(BinaryOp::Case, ExpressionNode::literal(true), lit(2.0));
        assert_eq!(ExpressionNode::switch(vec![case]).to_string(), "{{ true -> 2 }}");
        let sub = ExpressionNode::subscript(
            ExpressionNode::variable("a"),
            ExpressionNode::unary(UnaryOp::LeftBoundedRange, lit(1.0)),
        );
        assert_eq!(sub.to_string(), "a[1..]");
        let map = ExpressionNode::map(vec![("k".to_string(), ExpressionNode::literal("v"))]);
        assert_eq!(map.to_string(), "{ \"k\": \"v\" }");
        assert_eq!(ExpressionNode::array(vec![]).to_string(), "[]");
    }

    #[test]
    fn equality_ignores_position() {
        assert_eq!(lit(1.0).at(3), lit(1.0).at(9));
        assert_ne!(lit(1.0), lit(2.0));
    }
}
