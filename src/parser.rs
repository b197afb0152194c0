use crate::ast::{BinaryOp, ExpressionNode, UnaryOp};
use crate::error::Error;
use crate::lexer::{Lexer, Token};
use crate::runtime::evaluator::AUTO_RANGE_PARAMETER;

/// Reads EL source into an expression tree.
///
/// Binary operators are collected strictly left to right; operator
/// precedence comes from the rebalancing done by `ExpressionNode::binary`.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Token,
    look_pos: usize,
}

fn binary_op(tok: &Token) -> Option<BinaryOp> {
    Some(match tok {
        Token::Plus => BinaryOp::Addition,
        Token::Minus => BinaryOp::Subtraction,
        Token::Star => BinaryOp::Multiplication,
        Token::Slash => BinaryOp::Division,
        Token::Percent => BinaryOp::Modulus,
        Token::AndAnd => BinaryOp::LogicalAnd,
        Token::OrOr => BinaryOp::LogicalOr,
        Token::Amp => BinaryOp::BitwiseAnd,
        Token::Caret => BinaryOp::BitwiseXOr,
        Token::Pipe => BinaryOp::BitwiseOr,
        Token::ShiftLeft => BinaryOp::BitwiseShiftLeft,
        Token::ShiftRight => BinaryOp::BitwiseShiftRight,
        Token::Less => BinaryOp::Less,
        Token::Le => BinaryOp::LessOrEqual,
        Token::Greater => BinaryOp::Greater,
        Token::Ge => BinaryOp::GreaterOrEqual,
        Token::EqEq => BinaryOp::Equal,
        Token::NotEq => BinaryOp::NotEqual,
        Token::DotDot => BinaryOp::BoundedRange,
        Token::Arrow => BinaryOp::Case,
        _ => return None,
    })
}

/// Tokens that may follow a complete expression.
fn is_closer(tok: &Token) -> bool {
    matches!(tok, Token::RBracket | Token::RParen | Token::RBrace | Token::Comma | Token::Eof)
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self, Error> {
        let mut lexer = Lexer::new(input);
        let lookahead = lexer.next_token()?;
        let look_pos = lexer.last_start();
        Ok(Self { lexer, lookahead, look_pos })
    }

    fn bump(&mut self) -> Result<(), Error> {
        self.lookahead = self.lexer.next_token()?;
        self.look_pos = self.lexer.last_start();
        Ok(())
    }

    fn expect(&mut self, tok: Token, what: &str) -> Result<(), Error> {
        if self.lookahead == tok {
            self.bump()
        } else {
            self.err_here(&format!("Expected {}", what))
        }
    }

    fn err_here<T>(&self, msg: &str) -> Result<T, Error> {
        Err(Error::parse(msg, self.look_pos))
    }

    pub fn parse(&mut self) -> Result<ExpressionNode, Error> {
        let expr = self.parse_expr()?;
        if self.lookahead != Token::Eof {
            return self.err_here(&format!("Unexpected token {:?}", self.lookahead));
        }
        Ok(expr)
    }

    fn parse_expr(&mut self) -> Result<ExpressionNode, Error> {
        let mut node = self.parse_operand()?;
        while let Some(op) = binary_op(&self.lookahead) {
            let pos = self.look_pos;
            self.bump()?;
            if op == BinaryOp::BoundedRange && is_closer(&self.lookahead) {
                // `a..` runs to the end of whatever it indexes
                node = ExpressionNode::unary(UnaryOp::LeftBoundedRange, node).at(pos);
                break;
            }
            let rhs = self.parse_operand()?;
            node = ExpressionNode::binary(op, node, rhs);
        }
        Ok(node)
    }

    /// One operand of a binary chain, including a leading `..`.
    fn parse_operand(&mut self) -> Result<ExpressionNode, Error> {
        if self.lookahead != Token::DotDot {
            return self.parse_unary();
        }
        let pos = self.look_pos;
        self.bump()?;
        if is_closer(&self.lookahead) {
            // bare `..` covers everything
            let first = ExpressionNode::literal(0.0).at(pos);
            let last = ExpressionNode::variable(AUTO_RANGE_PARAMETER).at(pos);
            return Ok(ExpressionNode::binary(BinaryOp::BoundedRange, first, last));
        }
        let last = self.parse_unary()?;
        Ok(ExpressionNode::unary(UnaryOp::RightBoundedRange, last).at(pos))
    }

    fn parse_unary(&mut self) -> Result<ExpressionNode, Error> {
        let op = match self.lookahead {
            Token::Plus => UnaryOp::Plus,
            Token::Minus => UnaryOp::Minus,
            Token::Bang => UnaryOp::LogicalNegation,
            Token::Tilde => UnaryOp::BitwiseNegation,
            _ => return self.parse_postfix(),
        };
        let pos = self.look_pos;
        self.bump()?;
        let operand = self.parse_unary()?;
        Ok(ExpressionNode::unary(op, operand).at(pos))
    }

    fn parse_postfix(&mut self) -> Result<ExpressionNode, Error> {
        let pos = self.look_pos;
        let mut node = self.parse_atom()?;
        while self.lookahead == Token::LBracket {
            self.bump()?; // '['
            if self.lookahead == Token::RBracket {
                return self.err_here("Empty index '[]' not allowed");
            }
            let index = self.parse_expr()?;
            self.expect(Token::RBracket, "']' to close subscript")?;
            node = ExpressionNode::subscript(node, index).at(pos);
        }
        Ok(node)
    }

    fn parse_atom(&mut self) -> Result<ExpressionNode, Error> {
        let pos = self.look_pos;
        let node = match self.lookahead.clone() {
            Token::Number(n) => {
                self.bump()?;
                ExpressionNode::literal(n)
            }
            Token::String(s) => {
                self.bump()?;
                ExpressionNode::literal(s)
            }
            Token::True => {
                self.bump()?;
                ExpressionNode::literal(true)
            }
            Token::False => {
                self.bump()?;
                ExpressionNode::literal(false)
            }
            Token::Null => {
                self.bump()?;
                ExpressionNode::literal(crate::types::Value::Null)
            }
            Token::Identifier(name) => {
                self.bump()?;
                ExpressionNode::variable(name)
            }
            Token::LParen => {
                self.bump()?;
                let expr = self.parse_expr()?;
                self.expect(Token::RParen, "')'")?;
                ExpressionNode::unary(UnaryOp::Group, expr)
            }
            Token::LBracket => {
                self.bump()?; // '['
                let items = self.parse_list(Token::RBracket, "',' or ']' in array")?;
                self.bump()?; // ']'
                ExpressionNode::array(items)
            }
            Token::LBrace => {
                self.bump()?; // '{'
                ExpressionNode::map(self.parse_map_entries()?)
            }
            Token::DoubleLBrace => {
                self.bump()?; // '{{'
                let cases = self.parse_list(Token::RBrace, "',' or '}}' in switch")?;
                self.bump()?; // '}'
                self.expect(Token::RBrace, "'}}' to close switch")?;
                ExpressionNode::switch(cases)
            }
            other => return Err(Error::parse(format!("Unexpected token: {:?}", other), pos)),
        };
        Ok(node.at(pos))
    }

    /// Comma separated expressions up to (not including) `close`.
    fn parse_list(&mut self, close: Token, what: &str) -> Result<Vec<ExpressionNode>, Error> {
        let mut items = Vec::new();
        if self.lookahead == close {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expr()?);
            if self.lookahead == Token::Comma {
                self.bump()?;
            } else if self.lookahead == close {
                return Ok(items);
            } else {
                return self.err_here(&format!("Expected {}", what));
            }
        }
    }

    fn parse_map_entries(&mut self) -> Result<Vec<(String, ExpressionNode)>, Error> {
        let mut entries = Vec::new();
        if self.lookahead == Token::RBrace {
            self.bump()?;
            return Ok(entries);
        }
        loop {
            let key = match self.lookahead.clone() {
                Token::Identifier(s) | Token::String(s) => s,
                _ => return self.err_here("Expected map key"),
            };
            self.bump()?;
            self.expect(Token::Colon, "':' after map key")?;
            let value = self.parse_expr()?;
            entries.push((key, value));
            match self.lookahead {
                Token::Comma => self.bump()?,
                Token::RBrace => {
                    self.bump()?;
                    return Ok(entries);
                }
                _ => return self.err_here("Expected ',' or '}' in map"),
            }
        }
    }
}
