//! DuplicateElimination: streaming distinct via a seen-set of canonical
//! tuple field vectors (not a textual hash of `Debug`/`Display` output).

use std::collections::HashSet;

use super::{BoxOperator, Operator};
use crate::error::EngineResult;
use crate::schema::SchemaMapping;
use crate::value::Tuple;

/// Emits only tuples not already seen, preserving first-occurrence order.
pub struct DuplicateElimination {
    child: BoxOperator,
    seen: HashSet<String>,
}

impl DuplicateElimination {
    /// Wrap `child` in a streaming distinct.
    pub fn new(child: BoxOperator) -> Self {
        DuplicateElimination {
            child,
            seen: HashSet::new(),
        }
    }
}

impl Operator for DuplicateElimination {
    fn next(&mut self) -> EngineResult<Option<Tuple>> {
        while let Some(tuple) = self.child.next()? {
            if self.seen.insert(tuple.canonical_key()) {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }

    fn reset(&mut self) -> EngineResult<()> {
        self.seen.clear();
        self.child.reset()
    }

    fn schema(&self) -> &SchemaMapping {
        self.child.schema()
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
        Scan::open("R", &["A".into()], path).unwrap()
    }

    #[test]
    fn drops_repeats_preserving_first_occurrence_order() {
        let mut distinct = DuplicateElimination::new(Box::new(scan("1\n2\n1\n3\n2\n")));
        let rows = drain_all(&mut distinct).unwrap();
        let got: Vec<i64> = rows.iter().map(|t| t.get(0).unwrap().as_int().unwrap()).collect();
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[test]
    fn is_idempotent() {
        let mut once = DuplicateElimination::new(Box::new(scan("1\n1\n2\n")));
        let single_pass: Vec<_> = drain_all(&mut once).unwrap();

        let mut twice = DuplicateElimination::new(Box::new(DuplicateElimination::new(Box::new(
            scan("1\n1\n2\n"),
        ))));
        let double_pass: Vec<_> = drain_all(&mut twice).unwrap();

        assert_eq!(single_pass, double_pass);
    }

    #[test]
    fn reset_clears_the_seen_set() {
        let mut distinct = DuplicateElimination::new(Box::new(scan("1\n1\n")));
        assert_eq!(drain_all(&mut distinct).unwrap().len(), 1);
        distinct.reset().unwrap();
        assert_eq!(drain_all(&mut distinct).unwrap().len(), 1);
    }
}
