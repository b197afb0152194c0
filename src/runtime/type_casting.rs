use crate::error::Error;
use crate::runtime::utils::{is_blank, parse_number_prefix};
use crate::types::{ArrayType, MapType, Value, ValueType};

impl Value {
    pub fn convertible_to(&self, to: ValueType) -> bool {
        match self {
            Value::Boolean(_) | Value::Number(_) => {
                matches!(to, ValueType::Boolean | ValueType::String | ValueType::Number)
            }
            Value::String(s) => match to {
                ValueType::Boolean | ValueType::String => true,
                ValueType::Number => is_blank(s) || parse_number_prefix(s).is_some(),
                _ => false,
            },
            Value::Array(_) => to == ValueType::Array,
            Value::Map(_) => to == ValueType::Map,
            Value::Range(_) => to == ValueType::Range,
            Value::Null => !matches!(to, ValueType::Range | ValueType::Undefined),
            Value::Undefined => to == ValueType::Undefined,
        }
    }

    /// Converts to `to`, failing with a conversion error when the payload
    /// has no representation there.
    pub fn convert_to(&self, to: ValueType) -> Result<Value, Error> {
        if self.value_type() == to {
            return Ok(self.clone());
        }
        let converted = match (self, to) {
            (Value::Boolean(b), ValueType::String) => Value::from(if *b { "true" } else { "false" }),
            (Value::Boolean(b), ValueType::Number) => Value::Number(if *b { 1.0 } else { 0.0 }),
            (Value::Number(n), ValueType::Boolean) => Value::Boolean(*n != 0.0),
            (Value::Number(_), ValueType::String) => Value::from(self.describe()),
            (Value::String(s), ValueType::Boolean) => Value::Boolean(!s.is_empty() && &**s != "false"),
            (Value::String(s), ValueType::Number) => {
                if is_blank(s) {
                    Value::Number(0.0)
                } else {
                    match parse_number_prefix(s) {
                        Some(n) => Value::Number(n),
                        None => return Err(Error::conversion(self, to)),
                    }
                }
            }
            (Value::Null, ValueType::Boolean) => Value::Boolean(false),
            (Value::Null, ValueType::Number) => Value::Number(0.0),
            (Value::Null, ValueType::String) => Value::from(""),
            (Value::Null, ValueType::Array) => Value::from(ArrayType::new()),
            (Value::Null, ValueType::Map) => Value::from(MapType::new()),
            _ => return Err(Error::conversion(self, to)),
        };
        Ok(converted)
    }

    pub fn try_convert_to(&self, to: ValueType) -> Option<Value> {
        self.convert_to(to).ok()
    }
}
