use el::{evaluate, parse, BinaryOp, EmptyContext, Expression, ExpressionNode, Value, ast::ATOMIC_PRECEDENCE};

fn lit(n: f64) -> ExpressionNode {
    ExpressionNode::literal(n)
}

/// Every binary node binds no tighter than its binary children.
fn heap_ordered(node: &ExpressionNode) -> bool {
    match node.expression() {
        Expression::Binary(left, op, right) => {
            op.precedence() <= left.precedence()
                && op.precedence() <= right.precedence()
                && heap_ordered(left)
                && heap_ordered(right)
        }
        Expression::Unary(_, operand) => heap_ordered(operand),
        Expression::Subscript { target, index } => heap_ordered(target) && heap_ordered(index),
        Expression::Array(items) | Expression::Switch(items) => items.iter().all(heap_ordered),
        Expression::Map(entries) => entries.iter().all(|(_, e)| heap_ordered(e)),
        Expression::Literal(_) | Expression::Variable(_) => true,
    }
}

#[test]
fn flat_chain_is_rebalanced() {
    // (1 + 2) * 3 built naively, i.e. without a group
    let naive = ExpressionNode::binary(
        BinaryOp::Multiplication,
        ExpressionNode::binary(BinaryOp::Addition, lit(1.0), lit(2.0)),
        lit(3.0),
    );
    assert!(heap_ordered(&naive));
    assert_eq!(naive.evaluate(&EmptyContext).unwrap(), Value::from(7.0));
}

#[test]
fn groups_are_atomic() {
    assert_eq!(evaluate("(1 + 2) * 3").unwrap(), Value::from(9.0));
    assert_eq!(parse("(1 + 2) * 3").unwrap().to_string(), "( 1 + 2 ) * 3");
    assert_eq!(parse("(1)").unwrap().precedence(), ATOMIC_PRECEDENCE);
}

#[test]
fn table_order() {
    assert_eq!(evaluate("1 + 2 << 1").unwrap(), Value::from(6.0));
    assert_eq!(evaluate("1 << 2 < 5").unwrap(), Value::from(true));
    assert_eq!(evaluate("1 < 2 == 2 < 3").unwrap(), Value::from(true));
    assert_eq!(evaluate("6 & 3 == 3").unwrap(), Value::from(0.0));
    assert_eq!(evaluate("1 | 6 ^ 3 & 5").unwrap(), Value::from(7.0));
    assert_eq!(evaluate("true || false && false").unwrap(), Value::from(true));
    assert_eq!(evaluate("2 * 3 % 4").unwrap(), Value::from(2.0));
}

#[test]
fn long_chains_stay_heap_ordered() {
    let sources = [
        "1 + 2 * 3 - 4 / 5 % 6",
        "a || b && c | d ^ e & f == g < h << i + j * k",
        "a * b + c << d < e == f & g ^ h | i && j || k .. l -> m",
        "a -> b .. c || d && e | f ^ g & h == i < j << k + l * m",
        "x[1 + 2 * 3] - -y * (z + 1) .. 10",
    ];
    for source in sources {
        let node = parse(source).unwrap();
        assert!(heap_ordered(&node), "{} parsed as {}", source, node);
    }
}

#[test]
fn every_operator_triple_is_ordered() {
    for a in BinaryOp::ALL {
        for b in BinaryOp::ALL {
            for c in BinaryOp::ALL {
                let left = ExpressionNode::binary(a, ExpressionNode::variable("x"), ExpressionNode::variable("y"));
                let inner = ExpressionNode::binary(b, left, ExpressionNode::variable("z"));
                let node = ExpressionNode::binary(c, inner, ExpressionNode::variable("w"));
                assert!(heap_ordered(&node), "{:?} {:?} {:?} gave {}", a, b, c, node);
            }
        }
    }
}

#[test]
fn equal_precedence_associates_left() {
    assert_eq!(evaluate("8 - 4 - 2").unwrap(), Value::from(2.0));
    assert_eq!(evaluate("16 / 4 / 2").unwrap(), Value::from(2.0));
}
