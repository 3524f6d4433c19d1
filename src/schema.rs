//! # Schema mapping
//!
//! The immutable contract an operator exposes to its parent: a map from
//! fully qualified column name (`Table.Column`) to a zero-based index into
//! the tuples the operator produces. Every rewrite (pushdown, join-tree
//! construction, literal-SUM rewriting, projection, aggregation) produces a
//! *new* mapping rather than mutating one in place — getting this wrong in
//! any single operator misaligns every downstream column reference.

use std::collections::HashMap;
use std::fmt;

use crate::error::{EngineError, EngineResult};

/// An immutable name-to-index mapping, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaMapping {
    order: Vec<String>,
    index: HashMap<String, usize>,
}

impl SchemaMapping {
    /// Build a mapping from an ordered list of qualified column names.
    /// Panics (a programmer error, not a user-facing one) if a name repeats.
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order = Vec::new();
        let mut index = HashMap::new();
        for (i, name) in columns.into_iter().enumerate() {
            let name = name.into();
            assert!(
                !index.contains_key(&name),
                "duplicate column name in schema mapping: {name}"
            );
            index.insert(name.clone(), i);
            order.push(name);
        }
        SchemaMapping { order, index }
    }

    /// A table's local mapping: `{ "Table.Col1" -> 0, "Table.Col2" -> 1, ... }`.
    pub fn for_table(table: &str, columns: &[String]) -> Self {
        Self::from_columns(columns.iter().map(|c| format!("{table}.{c}")))
    }

    /// Resolve a qualified column name to its index.
    pub fn index_of(&self, qualified: &str) -> Option<usize> {
        self.index.get(qualified).copied()
    }

    /// Resolve or produce a plan error naming the column and the operator.
    pub fn require(&self, qualified: &str, context: &str) -> EngineResult<usize> {
        self.index_of(qualified).ok_or_else(|| {
            EngineError::Plan(format!(
                "column '{qualified}' is not visible to {context} (available: {})",
                self.order.join(", ")
            ))
        })
    }

    /// All qualified column names, in index order.
    pub fn columns(&self) -> &[String] {
        &self.order
    }

    /// Number of columns this mapping describes — the arity every tuple
    /// produced under it must have.
    pub fn arity(&self) -> usize {
        self.order.len()
    }

    /// Combine two mappings as `Join` does: left columns first, right
    /// columns shifted by `|left|`.
    pub fn combine(left: &SchemaMapping, right: &SchemaMapping) -> SchemaMapping {
        let shift = left.arity();
        let mut order = left.order.clone();
        let mut index = left.index.clone();
        for name in &right.order {
            let shifted = right.index[name] + shift;
            order.push(name.clone());
            index.insert(name.clone(), shifted);
        }
        SchemaMapping { order, index }
    }

    /// A new mapping with one extra column appended at the next free index —
    /// used by the literal-SUM rewrite to expose the appended constant field.
    pub fn with_appended(&self, name: impl Into<String>) -> SchemaMapping {
        let mut order = self.order.clone();
        let mut index = self.index.clone();
        let name = name.into();
        index.insert(name.clone(), order.len());
        order.push(name);
        SchemaMapping { order, index }
    }

    /// Find the unique table (by prefix `Table.`) that contains unqualified
    /// column `column`. Used to resolve bare column references in the query
    /// text. Errors if zero or more than one table qualifies.
    pub fn resolve_unqualified(&self, column: &str) -> EngineResult<String> {
        let suffix = format!(".{column}");
        let matches: Vec<&String> = self.order.iter().filter(|q| q.ends_with(&suffix)).collect();
        match matches.len() {
            0 => Err(EngineError::Plan(format!(
                "column '{column}' does not exist in any table in scope"
            ))),
            1 => Ok(matches[0].clone()),
            _ => Err(EngineError::Plan(format!(
                "column '{column}' is ambiguous; qualify it as Table.{column}"
            ))),
        }
    }
}

impl fmt::Display for SchemaMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.order.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_shifts_right_indices() {
        let left = SchemaMapping::for_table("R", &["A".into(), "B".into()]);
        let right = SchemaMapping::for_table("S", &["C".into()]);
        let combined = SchemaMapping::combine(&left, &right);
        assert_eq!(combined.index_of("R.A"), Some(0));
        assert_eq!(combined.index_of("R.B"), Some(1));
        assert_eq!(combined.index_of("S.C"), Some(2));
        assert_eq!(combined.arity(), 3);
    }

    #[test]
    fn resolve_unqualified_requires_uniqueness() {
        let left = SchemaMapping::for_table("R", &["A".into()]);
        let right = SchemaMapping::for_table("S", &["A".into()]);
        let combined = SchemaMapping::combine(&left, &right);
        assert!(combined.resolve_unqualified("A").is_err());
        assert!(combined.resolve_unqualified("B").is_err());
    }

    #[test]
    fn with_appended_adds_at_next_index() {
        let m = SchemaMapping::for_table("R", &["A".into()]);
        let m2 = m.with_appended("LITERAL_SUM_0");
        assert_eq!(m2.index_of("LITERAL_SUM_0"), Some(1));
        assert_eq!(m2.arity(), 2);
    }
}
