use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::error::Error;
use crate::runtime::utils::{escape_string, format_number};

pub type ArrayType = Vec<Value>;
pub type MapType = BTreeMap<String, Value>;

lazy_static::lazy_static! {
    static ref EMPTY_MAP: MapType = MapType::new();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Boolean,
    String,
    Number,
    Array,
    Map,
    Range,
    Null,
    Undefined,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Boolean => "Boolean",
            ValueType::String => "String",
            ValueType::Number => "Number",
            ValueType::Array => "Array",
            ValueType::Map => "Map",
            ValueType::Range => "Range",
            ValueType::Null => "Null",
            ValueType::Undefined => "Undefined",
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An integer interval. Only a bounded range knows its own elements; the
/// half-open variants are resolved against the length of whatever they index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeType {
    Bounded { first: i64, last: i64 },
    LeftBounded { first: i64 },
    RightBounded { last: i64 },
}

impl RangeType {
    pub fn bounded(first: i64, last: i64) -> Self {
        RangeType::Bounded { first, last }
    }

    /// Number of elements of a bounded range, `None` for half-open ranges.
    /// The full `i64` domain holds one more element than `u64` can count.
    pub fn element_count(&self) -> Option<u128> {
        match *self {
            RangeType::Bounded { first, last } => Some(u128::from(first.abs_diff(last)) + 1),
            RangeType::LeftBounded { .. } | RangeType::RightBounded { .. } => None,
        }
    }

    /// Elements of a bounded range in range order; descending when `first > last`.
    pub fn elements(&self) -> Option<impl Iterator<Item = i64>> {
        match *self {
            RangeType::Bounded { first, last } => Some(bounded_elements(first, last)),
            RangeType::LeftBounded { .. } | RangeType::RightBounded { .. } => None,
        }
    }

    /// Resolves the range against an indexable of `size` elements, giving
    /// its `(first, last)` in range order or `None` when it is empty.
    ///
    /// `first..` runs up to the last element (`-1` when `first` is negative),
    /// `..last` starts at the first element (`-size` when `last` is negative).
    /// A half-open range whose anchor lies past its implicit end is empty.
    pub fn bounds_for(&self, size: usize) -> Option<(i64, i64)> {
        let size = i64::try_from(size).unwrap_or(i64::MAX);
        let (first, last) = match *self {
            RangeType::Bounded { first, last } => return Some((first, last)),
            RangeType::LeftBounded { first } => (first, if first >= 0 { size - 1 } else { -1 }),
            RangeType::RightBounded { last } => (if last >= 0 { 0 } else { -size }, last),
        };
        (first <= last).then_some((first, last))
    }
}

fn bounded_elements(first: i64, last: i64) -> impl Iterator<Item = i64> {
    let ascending = first <= last;
    // every offset stays inside the range, so the wrapping step is exact
    (0..=first.abs_diff(last)).map(move |i| {
        if ascending {
            first.wrapping_add(i as i64)
        } else {
            first.wrapping_sub(i as i64)
        }
    })
}

impl Display for RangeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeType::Bounded { first, last } => write!(f, "{}..{}", first, last),
            RangeType::LeftBounded { first } => write!(f, "{}..", first),
            RangeType::RightBounded { last } => write!(f, "..{}", last),
        }
    }
}

/// A runtime value. Container payloads are shared, so cloning is cheap.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    String(Arc<str>),
    Number(f64),
    Array(Arc<ArrayType>),
    Map(Arc<MapType>),
    Range(RangeType),
    Null,
    Undefined,
}

impl Value {
    pub fn null() -> Self {
        Value::Null
    }

    pub fn undefined() -> Self {
        Value::Undefined
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Boolean(_) => ValueType::Boolean,
            Value::String(_) => ValueType::String,
            Value::Number(_) => ValueType::Number,
            Value::Array(_) => ValueType::Array,
            Value::Map(_) => ValueType::Map,
            Value::Range(_) => ValueType::Range,
            Value::Null => ValueType::Null,
            Value::Undefined => ValueType::Undefined,
        }
    }

    pub fn has_type(&self, types: &[ValueType]) -> bool {
        types.contains(&self.value_type())
    }

    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn boolean_value(&self) -> Result<bool, Error> {
        match self {
            Value::Boolean(b) => Ok(*b),
            Value::Null => Ok(false),
            _ => Err(Error::dereference(self, ValueType::Boolean)),
        }
    }

    pub fn string_value(&self) -> Result<&str, Error> {
        match self {
            Value::String(s) => Ok(s),
            Value::Null => Ok(""),
            _ => Err(Error::dereference(self, ValueType::String)),
        }
    }

    pub fn number_value(&self) -> Result<f64, Error> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Null => Ok(0.0),
            _ => Err(Error::dereference(self, ValueType::Number)),
        }
    }

    /// The number truncated toward zero.
    pub fn integer_value(&self) -> Result<i64, Error> {
        Ok(self.number_value()? as i64)
    }

    pub fn array_value(&self) -> Result<&[Value], Error> {
        match self {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(&[]),
            _ => Err(Error::dereference(self, ValueType::Array)),
        }
    }

    pub fn map_value(&self) -> Result<&MapType, Error> {
        match self {
            Value::Map(map) => Ok(map),
            Value::Null => Ok(&EMPTY_MAP),
            _ => Err(Error::dereference(self, ValueType::Map)),
        }
    }

    pub fn range_value(&self) -> Result<&RangeType, Error> {
        match self {
            Value::Range(range) => Ok(range),
            _ => Err(Error::dereference(self, ValueType::Range)),
        }
    }

    /// Array elements converted to strings.
    pub fn as_string_list(&self) -> Result<Vec<String>, Error> {
        self.array_value()?
            .iter()
            .map(|item| Ok(item.convert_to(ValueType::String)?.string_value()?.to_string()))
            .collect()
    }

    pub fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.map_value()?.keys().cloned().collect())
    }

    pub fn length(&self) -> usize {
        match self {
            Value::Boolean(_) | Value::Number(_) => 1,
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            Value::Map(map) => map.len(),
            Value::Range(_) => 2,
            Value::Null | Value::Undefined => 0,
        }
    }

    /// Single-line canonical rendering.
    pub fn describe(&self) -> String {
        self.as_string(false)
    }

    pub fn as_string(&self, multiline: bool) -> String {
        let mut out = String::new();
        self.append_to(&mut out, multiline, "");
        out
    }

    fn append_to(&self, out: &mut String, multiline: bool, indent: &str) {
        match self {
            Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::String(s) => {
                out.push('"');
                out.push_str(&escape_string(s));
                out.push('"');
            }
            Value::Number(n) => out.push_str(&format_number(*n)),
            Value::Array(items) => {
                if items.is_empty() {
                    out.push_str("[]");
                    return;
                }
                let child_indent = if multiline { format!("{}\t", indent) } else { String::new() };
                out.push('[');
                out.push_str(if multiline { "\n" } else { " " });
                for (i, item) in items.iter().enumerate() {
                    out.push_str(&child_indent);
                    item.append_to(out, multiline, &child_indent);
                    close_entry(out, multiline, i + 1 < items.len());
                }
                out.push_str(if multiline { indent } else { " " });
                out.push(']');
            }
            Value::Map(map) => {
                if map.is_empty() {
                    out.push_str("{}");
                    return;
                }
                let child_indent = if multiline { format!("{}\t", indent) } else { String::new() };
                out.push('{');
                out.push_str(if multiline { "\n" } else { " " });
                for (i, (key, item)) in map.iter().enumerate() {
                    out.push_str(&child_indent);
                    out.push('"');
                    out.push_str(&escape_string(key));
                    out.push_str("\": ");
                    item.append_to(out, multiline, &child_indent);
                    close_entry(out, multiline, i + 1 < map.len());
                }
                out.push_str(if multiline { indent } else { " " });
                out.push('}');
            }
            Value::Range(range) => out.push_str(&range.to_string()),
            Value::Null => out.push_str("null"),
            Value::Undefined => out.push_str("undefined"),
        }
    }
}

fn close_entry(out: &mut String, multiline: bool, more: bool) {
    if more {
        out.push(',');
        if !multiline {
            out.push(' ');
        }
    }
    if multiline {
        out.push('\n');
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<ArrayType> for Value {
    fn from(value: ArrayType) -> Self {
        Value::Array(Arc::new(value))
    }
}

impl From<MapType> for Value {
    fn from(value: MapType) -> Self {
        Value::Map(Arc::new(value))
    }
}

impl From<RangeType> for Value {
    fn from(value: RangeType) -> Self {
        Value::Range(value)
    }
}
