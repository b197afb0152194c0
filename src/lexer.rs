use crate::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Identifier(String),
    String(String),
    True,
    False,
    Null,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Tilde,
    Amp,
    Pipe,
    Caret,
    AndAnd,
    OrOr,
    ShiftLeft,
    ShiftRight,
    Greater,
    Less,
    Ge,
    Le,
    EqEq,
    NotEq,
    DotDot,
    Arrow,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    /// `{{`, opens a switch
    DoubleLBrace,
    RBrace,
    Comma,
    Colon,
    Eof,
}

#[derive(Clone)]
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    last_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input: input.as_bytes(), pos: 0, last_start: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Consumes `next` if it follows.
    fn eat(&mut self, next: u8) -> bool {
        if self.peek() == Some(next) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn text(&self, start: usize, end: usize) -> Result<&'a str, Error> {
        std::str::from_utf8(&self.input[start..end]).map_err(|_| Error::parse("Invalid UTF-8", start))
    }

    fn number(&mut self, start: usize) -> Result<Token, Error> {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        // a dot is a decimal point only when a digit follows; `1..2` is a range
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.pos += 1;
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some(b'+' | b'-')));
            if matches!(self.peek_at(1 + sign), Some(b'0'..=b'9')) {
                self.pos += 1 + sign;
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
            }
        }
        let n: f64 = self
            .text(start, self.pos)?
            .parse()
            .map_err(|_| Error::parse("Invalid number", start))?;
        Ok(Token::Number(n))
    }

    fn identifier(&mut self, start: usize) -> Result<Token, Error> {
        while matches!(self.peek(), Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')) {
            self.pos += 1;
        }
        Ok(match self.text(start, self.pos)? {
            "true" => Token::True,
            "false" => Token::False,
            "null" => Token::Null,
            name => Token::Identifier(name.to_string()),
        })
    }

    fn string(&mut self, start: usize, quote: u8) -> Result<Token, Error> {
        // escapes \" \' \\ \n \t; UTF-8 bytes are kept as is
        let mut buf: Vec<u8> = Vec::new();
        while let Some(c) = self.bump() {
            if c == quote {
                return String::from_utf8(buf)
                    .map(Token::String)
                    .map_err(|_| Error::parse("Invalid UTF-8 in string", start));
            }
            if c == b'\\' {
                match self.bump() {
                    Some(b'n') => buf.push(b'\n'),
                    Some(b't') => buf.push(b'\t'),
                    Some(x) => buf.push(x),
                    None => return Err(Error::parse("Unterminated escape in string", self.pos)),
                }
            } else {
                buf.push(c);
            }
        }
        Err(Error::parse("Unterminated string literal", start))
    }

    pub fn next_token(&mut self) -> Result<Token, Error> {
        self.skip_ws();
        let start = self.pos;
        self.last_start = start;
        let ch = match self.bump() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let tok = match ch {
            b'0'..=b'9' => return self.number(start),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => return self.identifier(start),
            b'"' | b'\'' => return self.string(start, ch),
            b'.' => {
                if self.eat(b'.') {
                    Token::DotDot
                } else if matches!(self.peek(), Some(b'0'..=b'9')) {
                    return self.number(start);
                } else {
                    return Err(Error::parse("Unexpected '.'", start));
                }
            }
            b'+' => Token::Plus,
            b'-' => {
                if self.eat(b'>') {
                    Token::Arrow
                } else {
                    Token::Minus
                }
            }
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'%' => Token::Percent,
            b'~' => Token::Tilde,
            b'^' => Token::Caret,
            b'!' => {
                if self.eat(b'=') {
                    Token::NotEq
                } else {
                    Token::Bang
                }
            }
            b'=' => {
                if self.eat(b'=') {
                    Token::EqEq
                } else {
                    return Err(Error::parse("Unexpected '=', did you mean '=='?", start));
                }
            }
            b'&' => {
                if self.eat(b'&') {
                    Token::AndAnd
                } else {
                    Token::Amp
                }
            }
            b'|' => {
                if self.eat(b'|') {
                    Token::OrOr
                } else {
                    Token::Pipe
                }
            }
            b'<' => {
                if self.eat(b'=') {
                    Token::Le
                } else if self.eat(b'<') {
                    Token::ShiftLeft
                } else {
                    Token::Less
                }
            }
            b'>' => {
                if self.eat(b'=') {
                    Token::Ge
                } else if self.eat(b'>') {
                    Token::ShiftRight
                } else {
                    Token::Greater
                }
            }
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'[' => Token::LBracket,
            b']' => Token::RBracket,
            b'{' => {
                if self.eat(b'{') {
                    Token::DoubleLBrace
                } else {
                    Token::LBrace
                }
            }
            b'}' => Token::RBrace,
            b',' => Token::Comma,
            b':' => Token::Colon,
            _ => return Err(Error::parse("Unexpected character", start)),
        };
        Ok(tok)
    }

    /// Byte offset where the last returned token starts.
    pub fn last_start(&self) -> usize {
        self.last_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().unwrap();
            if tok == Token::Eof {
                return out;
            }
            out.push(tok);
        }
    }

    #[test]
    fn ranges_are_not_decimals() {
        assert_eq!(tokens("1..2"), vec![Token::Number(1.0), Token::DotDot, Token::Number(2.0)]);
        assert_eq!(tokens("1.5..-.5"), vec![Token::Number(1.5), Token::DotDot, Token::Minus, Token::Number(0.5)]);
        assert_eq!(tokens("2e3 1E-2"), vec![Token::Number(2000.0), Token::Number(0.01)]);
    }

    #[test]
    fn operators() {
        assert_eq!(
            tokens("<< >> <= -> && & || | != ~ {{ {"),
            vec![
                Token::ShiftLeft,
                Token::ShiftRight,
                Token::Le,
                Token::Arrow,
                Token::AndAnd,
                Token::Amp,
                Token::OrOr,
                Token::Pipe,
                Token::NotEq,
                Token::Tilde,
                Token::DoubleLBrace,
                Token::LBrace,
            ]
        );
    }

    #[test]
    fn strings_and_keywords() {
        assert_eq!(
            tokens(r#"'it\'s' "a\"b" true null x_1"#),
            vec![
                Token::String("it's".to_string()),
                Token::String("a\"b".to_string()),
                Token::True,
                Token::Null,
                Token::Identifier("x_1".to_string()),
            ]
        );
    }

    #[test]
    fn errors_report_offsets() {
        let mut lexer = Lexer::new("1 + \"abc");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.position, Some(4));
        assert_eq!(err.kind, crate::error::ErrorKind::Parse);
    }
}
