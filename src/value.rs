//! # Value and Tuple types
//!
//! A tuple field is either a parsed 64-bit signed integer or raw text. Scan
//! retains text as-is; the value is only coerced to an integer the first
//! time an arithmetic or comparison operation demands it, at which point a
//! non-numeric field is a [`crate::error::EngineError::Type`] error.

use std::fmt;

/// One field of a [`Tuple`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    /// A field that parsed cleanly as a signed 64-bit integer.
    Int(i64),
    /// A field retained as text because it did not parse as an integer.
    Text(String),
}

impl Value {
    /// Parse a raw CSV field: integers become [`Value::Int`], everything
    /// else is kept as [`Value::Text`].
    pub fn from_field(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Text(trimmed.to_string()),
        }
    }

    /// View this value as a signed integer, if it is (or can be parsed as) one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Text(s) => s.parse::<i64>().ok(),
        }
    }

    /// Canonical textual form, used by `DuplicateElimination` and for output.
    pub fn to_text(&self) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

/// An ordered sequence of field values: one row produced by an operator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tuple {
    fields: Vec<Value>,
}

impl Tuple {
    /// Build a tuple from its fields.
    pub fn new(fields: Vec<Value>) -> Self {
        Tuple { fields }
    }

    /// Number of fields in this tuple.
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Borrow the field at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.fields.get(index)
    }

    /// Borrow all fields in order.
    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    /// Consume this tuple, yielding its fields.
    pub fn into_fields(self) -> Vec<Value> {
        self.fields
    }

    /// Concatenate two tuples left-then-right, as `Join` does.
    pub fn concat(left: &Tuple, right: &Tuple) -> Tuple {
        let mut fields = Vec::with_capacity(left.arity() + right.arity());
        fields.extend(left.fields.iter().cloned());
        fields.extend(right.fields.iter().cloned());
        Tuple::new(fields)
    }

    /// Build a new tuple by picking fields at the given indices, in order.
    /// Used by `Projection`.
    pub fn project(&self, indices: &[usize]) -> Tuple {
        Tuple::new(indices.iter().map(|&i| self.fields[i].clone()).collect())
    }

    /// Append one field, as the literal-SUM rewrite step does.
    pub fn with_appended(&self, value: Value) -> Tuple {
        let mut fields = self.fields.clone();
        fields.push(value);
        Tuple::new(fields)
    }

    /// Canonical textual form used by `DuplicateElimination`: fields joined
    /// by a delimiter that cannot occur inside a single CSV field.
    pub fn canonical_key(&self) -> String {
        self.fields
            .iter()
            .map(Value::to_text)
            .collect::<Vec<_>>()
            .join("\u{1f}")
    }

    /// Render this tuple as one output CSV line: fields separated by `", "`.
    pub fn to_csv_line(&self) -> String {
        self.fields
            .iter()
            .map(Value::to_text)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integers_and_text() {
        assert_eq!(Value::from_field(" 42 "), Value::Int(42));
        assert_eq!(Value::from_field("hello"), Value::Text("hello".into()));
    }

    #[test]
    fn concat_sums_arity() {
        let l = Tuple::new(vec![Value::Int(1), Value::Int(2)]);
        let r = Tuple::new(vec![Value::Int(3)]);
        let c = Tuple::concat(&l, &r);
        assert_eq!(c.arity(), 3);
        assert_eq!(c.get(2), Some(&Value::Int(3)));
    }

    #[test]
    fn project_reorders_fields() {
        let t = Tuple::new(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let p = t.project(&[2, 0]);
        assert_eq!(p.fields(), &[Value::Int(3), Value::Int(1)]);
    }

    #[test]
    fn canonical_key_distinguishes_rows() {
        // Without a delimiter, ("1", "23") and ("12", "3") would both
        // stringify to "123"; the delimiter keeps them apart.
        let a = Tuple::new(vec![Value::Int(1), Value::Int(23)]);
        let b = Tuple::new(vec![Value::Int(12), Value::Int(3)]);
        assert_ne!(a.canonical_key(), b.canonical_key());
    }
}
