use std::fmt::{Display, Formatter};

use crate::types::{Value, ValueType};

/// What went wrong. `Index` and `IndexOutOfBounds` are evaluation errors too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ErrorKind {
    #[error("conversion error")]
    Conversion,
    #[error("dereference error")]
    Dereference,
    #[error("evaluation error")]
    Evaluation,
    #[error("index error")]
    Index,
    #[error("index out of bounds")]
    IndexOutOfBounds,
    #[error("parse error")]
    Parse,
}

impl ErrorKind {
    pub fn is_evaluation_error(self) -> bool {
        matches!(self, ErrorKind::Evaluation | ErrorKind::Index | ErrorKind::IndexOutOfBounds)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub position: Option<usize>,
}

impl Error {
    pub fn new<M: Into<String>>(kind: ErrorKind, message: M, position: Option<usize>) -> Self {
        Self { kind, message: message.into(), position }
    }

    pub fn evaluation<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::Evaluation, message, None)
    }

    pub fn parse<M: Into<String>>(message: M, position: usize) -> Self {
        Self::new(ErrorKind::Parse, message, Some(position))
    }

    pub fn conversion(value: &Value, to: ValueType) -> Self {
        Self::new(
            ErrorKind::Conversion,
            format!(
                "Cannot convert value '{}' of type '{}' to type '{}'",
                value.describe(),
                value.type_name(),
                to
            ),
            None,
        )
    }

    pub fn dereference(value: &Value, to: ValueType) -> Self {
        Self::new(
            ErrorKind::Dereference,
            format!(
                "Cannot dereference value '{}' of type '{}' as type '{}'",
                value.describe(),
                value.type_name(),
                to
            ),
            None,
        )
    }

    pub fn index(indexable: &Value, index: &Value) -> Self {
        Self::new(ErrorKind::Index, index_message(indexable, index), None)
    }

    pub fn index_out_of_bounds(indexable: &Value, index: &Value, out_of_bounds: usize) -> Self {
        Self::new(
            ErrorKind::IndexOutOfBounds,
            format!(
                "{}: Index value {} is out of bounds",
                index_message(indexable, index),
                out_of_bounds
            ),
            None,
        )
    }

    pub fn key_not_found(indexable: &Value, key: &str) -> Self {
        Self::new(
            ErrorKind::IndexOutOfBounds,
            format!(
                "{}: Key '{}' not found",
                index_message(indexable, &Value::from(key)),
                key
            ),
            None,
        )
    }

    /// Attaches a source position unless the error already carries one.
    pub fn at(mut self, position: Option<usize>) -> Self {
        if self.position.is_none() {
            self.position = position;
        }
        self
    }
}

fn index_message(indexable: &Value, index: &Value) -> String {
    format!(
        "Cannot index value '{}' of type '{}' with '{}' of type '{}'",
        indexable.describe(),
        indexable.type_name(),
        index.describe(),
        index.type_name()
    )
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{} at position {}", self.message, pos),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_attached_once() {
        let err = Error::evaluation("boom").at(Some(3)).at(Some(7));
        assert_eq!(err.position, Some(3));
        assert_eq!(err.to_string(), "boom at position 3");
    }

    #[test]
    fn index_kinds_are_evaluation_errors() {
        assert!(ErrorKind::Index.is_evaluation_error());
        assert!(ErrorKind::IndexOutOfBounds.is_evaluation_error());
        assert!(!ErrorKind::Conversion.is_evaluation_error());
        assert!(!ErrorKind::Parse.is_evaluation_error());
    }

    #[test]
    fn out_of_bounds_message_names_both_operands() {
        let err = Error::index_out_of_bounds(&Value::from(vec![Value::from(1.0)]), &Value::from(4.0), 1);
        assert_eq!(
            err.message,
            "Cannot index value '[ 1 ]' of type 'Array' with '4' of type 'Number': Index value 1 is out of bounds"
        );
    }
}
