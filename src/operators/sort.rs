//! Sort: blocking operator. Buffers the child on first `next()`, then
//! total-orders by the ORDER BY keys and streams from the buffer.

use std::cmp::Ordering;

use super::{BoxOperator, Operator};
use crate::error::{EngineError, EngineResult};
use crate::schema::SchemaMapping;
use crate::value::Tuple;

/// One ORDER BY key: a resolved field index plus direction.
#[derive(Debug, Clone, Copy)]
pub struct SortKey {
    pub index: usize,
    pub descending: bool,
}

/// Blocking sort over one or more [`SortKey`]s, compared as signed integers.
/// Multi-key order is lexicographic in key order; direction inverts the
/// comparison for that key only.
pub struct Sort {
    child: BoxOperator,
    keys: Vec<SortKey>,
    schema: SchemaMapping,
    buffer: Vec<Tuple>,
    materialized: bool,
    cursor: usize,
}

impl Sort {
    /// Build a sort over `keys`, which must already be resolved field
    /// indices into `child`'s mapping (the planner rewrites non-column
    /// ORDER BY expressions before constructing this).
    pub fn new(child: BoxOperator, keys: Vec<SortKey>) -> Self {
        let schema = child.schema().clone();
        Sort {
            child,
            keys,
            schema,
            buffer: Vec::new(),
            materialized: false,
            cursor: 0,
        }
    }

    fn materialize(&mut self) -> EngineResult<()> {
        if self.materialized {
            return Ok(());
        }
        let rows = super::drain_all(self.child.as_mut())?;

        // Sort keys are evaluated up front (and any type error raised here,
        // before `Vec::sort_by` runs) since the comparator itself has no way
        // to propagate a `Result` out of the sort.
        let mut keyed: Vec<(Vec<i64>, Tuple)> = Vec::with_capacity(rows.len());
        for tuple in rows {
            let mut key = Vec::with_capacity(self.keys.len());
            for sort_key in &self.keys {
                let value = tuple.get(sort_key.index).ok_or_else(|| {
                    EngineError::Type(format!("tuple missing field {}", sort_key.index))
                })?;
                key.push(value.as_int().ok_or_else(|| {
                    EngineError::Type(format!(
                        "ORDER BY column at index {} is not an integer",
                        sort_key.index
                    ))
                })?);
            }
            keyed.push((key, tuple));
        }

        let keys = &self.keys;
        keyed.sort_by(|a, b| compare_rows(&a.0, &b.0, keys));
        self.buffer = keyed.into_iter().map(|(_, tuple)| tuple).collect();
        self.materialized = true;
        self.cursor = 0;
        Ok(())
    }
}

fn compare_rows(a: &[i64], b: &[i64], keys: &[SortKey]) -> Ordering {
    for (i, key) in keys.iter().enumerate() {
        let ordering = a[i].cmp(&b[i]);
        let ordering = if key.descending {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl Operator for Sort {
    fn next(&mut self) -> EngineResult<Option<Tuple>> {
        self.materialize()?;
        if self.cursor >= self.buffer.len() {
            return Ok(None);
        }
        let tuple = self.buffer[self.cursor].clone();
        self.cursor += 1;
        Ok(Some(tuple))
    }

    fn reset(&mut self) -> EngineResult<()> {
        // Rewind the cursor over the materialized buffer without re-running
        // the child or re-sorting.
        self.cursor = 0;
        Ok(())
    }

    fn schema(&self) -> &SchemaMapping {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{drain_all, Scan};
    use std::io::Write;

    fn scan(contents: &str) -> Scan {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        let path = file.into_temp_path().keep().unwrap();
        Scan::open("R", &["A".into(), "B".into()], path).unwrap()
    }

    #[test]
    fn sorts_ascending_by_default() {
        let mut sort = Sort::new(
            Box::new(scan("3,1\n1,2\n2,3\n")),
            vec![SortKey { index: 0, descending: false }],
        );
        let rows = drain_all(&mut sort).unwrap();
        let got: Vec<i64> = rows.iter().map(|t| t.get(0).unwrap().as_int().unwrap()).collect();
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[test]
    fn descending_key_inverts_only_that_key() {
        let mut sort = Sort::new(
            Box::new(scan("1,3\n1,1\n1,2\n")),
            vec![
                SortKey { index: 0, descending: false },
                SortKey { index: 1, descending: true },
            ],
        );
        let rows = drain_all(&mut sort).unwrap();
        let got: Vec<i64> = rows.iter().map(|t| t.get(1).unwrap().as_int().unwrap()).collect();
        assert_eq!(got, vec![3, 2, 1]);
    }

    #[test]
    fn reset_replays_materialized_order_without_rereading_child() {
        let mut sort = Sort::new(
            Box::new(scan("3,1\n1,2\n")),
            vec![SortKey { index: 0, descending: false }],
        );
        let first = drain_all(&mut sort).unwrap();
        sort.reset().unwrap();
        let second = drain_all(&mut sort).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn sorting_a_non_integer_column_is_a_type_error() {
        let mut sort = Sort::new(
            Box::new(scan("1,abc\n2,def\n")),
            vec![SortKey { index: 1, descending: false }],
        );
        assert!(matches!(drain_all(&mut sort), Err(EngineError::Type(_))));
    }
}
