//! Projection: rearranges/prunes fields per an ordered column list.

use super::{BoxOperator, Operator};
use crate::error::EngineResult;
use crate::schema::SchemaMapping;
use crate::value::Tuple;

/// Projects the child's tuples onto a (deduplicated) ordered column list.
pub struct Projection {
    child: BoxOperator,
    indices: Vec<usize>,
    schema: SchemaMapping,
}

impl Projection {
    /// Build a projection over `columns` — duplicate names are dropped,
    /// keeping first occurrence order. Each name must resolve against the
    /// child's mapping.
    pub fn new(child: BoxOperator, columns: &[String]) -> EngineResult<Self> {
        let mut seen = std::collections::HashSet::new();
        let mut deduped = Vec::new();
        for column in columns {
            if seen.insert(column.clone()) {
                deduped.push(column.clone());
            }
        }

        let mut indices = Vec::with_capacity(deduped.len());
        for column in &deduped {
            indices.push(child.schema().require(column, "Projection")?);
        }

        let schema = SchemaMapping::from_columns(deduped);
        Ok(Projection {
            child,
            indices,
            schema,
        })
    }
}

impl Operator for Projection {
    fn next(&mut self) -> EngineResult<Option<Tuple>> {
        match self.child.next()? {
            Some(tuple) => {
                if tuple.arity() == self.indices.len()
                    && self.indices.iter().enumerate().all(|(i, &idx)| i == idx)
                {
                    Ok(Some(tuple))
                } else {
                    Ok(Some(tuple.project(&self.indices)))
                }
            }
            None => Ok(None),
        }
    }

    fn reset(&mut self) -> EngineResult<()> {
        self.child.reset()
    }

    fn schema(&self) -> &SchemaMapping {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{drain_all, Scan};
    use crate::value::Value;
    use std::io::Write;

    fn scan(contents: &str) -> Scan {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        let path = file.into_temp_path().keep().unwrap();
        Scan::open("R", &["A".into(), "B".into(), "C".into()], path).unwrap()
    }

    #[test]
    fn reorders_and_dedups_columns() {
        let mut proj = Projection::new(
            Box::new(scan("1,2,3\n")),
            &["R.C".into(), "R.A".into(), "R.A".into()],
        )
        .unwrap();
        let rows = drain_all(&mut proj).unwrap();
        assert_eq!(rows[0].fields(), &[Value::Int(3), Value::Int(1)]);
        assert_eq!(proj.schema().columns(), &["R.C", "R.A"]);
    }

    #[test]
    fn passthrough_when_arity_already_matches() {
        let proj = Projection::new(
            Box::new(scan("1,2,3\n")),
            &["R.A".into(), "R.B".into(), "R.C".into()],
        )
        .unwrap();
        assert_eq!(proj.indices, vec![0, 1, 2]);
    }
}
