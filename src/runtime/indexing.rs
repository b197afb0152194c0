use crate::error::Error;
use crate::runtime::utils::{compute_index_array, compute_index_of};
use crate::types::{MapType, Value, ValueType};

impl Value {
    /// Indexes `self` by `index`.
    ///
    /// Strings tolerate out of range indices, arrays do not. A missing map
    /// key yields `Undefined`; a key list selects the present keys only.
    pub fn at(&self, index: &Value) -> Result<Value, Error> {
        match (self, index) {
            (Value::String(s), Value::Boolean(_) | Value::Number(_)) => {
                let chars: Vec<char> = s.chars().collect();
                let i = compute_index_of(index, chars.len())?;
                Ok(Value::from(chars.get(i).map(|c| c.to_string()).unwrap_or_default()))
            }
            (Value::String(s), Value::Array(_) | Value::Range(_)) => {
                let chars: Vec<char> = s.chars().collect();
                let result: String = compute_index_array(index, chars.len())?
                    .into_iter()
                    .filter_map(|i| chars.get(i))
                    .collect();
                Ok(Value::from(result))
            }
            (Value::Array(items), Value::Boolean(_) | Value::Number(_)) => {
                let i = compute_index_of(index, items.len())?;
                items
                    .get(i)
                    .cloned()
                    .ok_or_else(|| Error::index_out_of_bounds(self, index, i))
            }
            (Value::Array(items), Value::Array(_) | Value::Range(_)) => {
                let indices = compute_index_array(index, items.len())?;
                let mut result = Vec::with_capacity(indices.len());
                for i in indices {
                    match items.get(i) {
                        Some(item) => result.push(item.clone()),
                        None => return Err(Error::index_out_of_bounds(self, index, i)),
                    }
                }
                Ok(Value::from(result))
            }
            (Value::Map(map), Value::String(key)) => Ok(map.get(&**key).cloned().unwrap_or(Value::Undefined)),
            (Value::Map(map), Value::Array(keys)) => {
                let mut result = MapType::new();
                for key in keys.iter() {
                    let key = match key {
                        Value::String(k) => k,
                        other => return Err(Error::conversion(other, ValueType::String)),
                    };
                    if let Some(item) = map.get(&**key) {
                        result.insert(key.to_string(), item.clone());
                    }
                }
                Ok(Value::from(result))
            }
            _ => Err(Error::index(self, index)),
        }
    }

    /// Non-throwing probe: true if `at(index)` would find something.
    pub fn contains(&self, index: &Value) -> bool {
        match (self, index) {
            (Value::String(_) | Value::Array(_), Value::Boolean(_) | Value::Number(_)) => {
                let size = self.length();
                compute_index_of(index, size).map(|i| i < size).unwrap_or(false)
            }
            (Value::String(_) | Value::Array(_), Value::Array(_) | Value::Range(_)) => {
                let size = self.length();
                compute_index_array(index, size)
                    .map(|indices| indices.iter().all(|i| *i < size))
                    .unwrap_or(false)
            }
            (Value::Map(map), Value::String(key)) => map.contains_key(&**key),
            (Value::Map(map), Value::Array(keys)) => keys.iter().all(|key| match key {
                Value::String(k) => map.contains_key(&**k),
                _ => false,
            }),
            _ => false,
        }
    }

    pub fn at_or_default(&self, index: &Value, default: Value) -> Value {
        if !self.contains(index) {
            return default;
        }
        self.at(index).unwrap_or(default)
    }

    pub fn at_position(&self, position: usize) -> Result<Value, Error> {
        let index = Value::from(position);
        match self {
            Value::String(s) => s
                .chars()
                .nth(position)
                .map(|c| Value::from(c.to_string()))
                .ok_or_else(|| Error::index_out_of_bounds(self, &index, position)),
            Value::Array(items) => items
                .get(position)
                .cloned()
                .ok_or_else(|| Error::index_out_of_bounds(self, &index, position)),
            _ => Err(Error::index(self, &index)),
        }
    }

    pub fn at_key(&self, key: &str) -> Result<Value, Error> {
        match self {
            Value::Map(map) => map.get(key).cloned().ok_or_else(|| Error::key_not_found(self, key)),
            _ => Err(Error::index(self, &Value::from(key))),
        }
    }

    pub fn contains_position(&self, position: usize) -> bool {
        match self {
            Value::String(_) | Value::Array(_) => position < self.length(),
            _ => false,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        match self {
            Value::Map(map) => map.contains_key(key),
            _ => false,
        }
    }
}
