//! LiteralAppend: appends a constant integer field to every input tuple.
//!
//! The planner inserts this above the current root when a `SUM(k)` with
//! constant `k` needs a synthetic `LITERAL_SUM_i` column to feed into
//! [`super::Sum`] — this keeps Sum's "evaluate an expression against a
//! tuple" contract uniform instead of special-casing literal arguments.

use super::{BoxOperator, Operator};
use crate::error::EngineResult;
use crate::schema::SchemaMapping;
use crate::value::{Tuple, Value};

/// Wraps a child, appending one constant field named `alias` to every tuple.
pub struct LiteralAppend {
    child: BoxOperator,
    literal: i64,
    schema: SchemaMapping,
}

impl LiteralAppend {
    /// Build the wrapper; `alias` (e.g. `LITERAL_SUM_0`) is added to the
    /// child's mapping at the next free index.
    pub fn new(child: BoxOperator, literal: i64, alias: impl Into<String>) -> Self {
        let schema = child.schema().with_appended(alias);
        LiteralAppend {
            child,
            literal,
            schema,
        }
    }
}

impl Operator for LiteralAppend {
    fn next(&mut self) -> EngineResult<Option<Tuple>> {
        match self.child.next()? {
            Some(tuple) => Ok(Some(tuple.with_appended(Value::Int(self.literal)))),
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
    use std::io::Write;

    #[test]
    fn appends_constant_to_every_tuple() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "1\n2\n").unwrap();
        let path = file.into_temp_path().keep().unwrap();
        let scan = Scan::open("R", &["A".into()], path).unwrap();
        let mut wrapped = LiteralAppend::new(Box::new(scan), 7, "LITERAL_SUM_0");
        assert_eq!(wrapped.schema().index_of("LITERAL_SUM_0"), Some(1));
        let rows = drain_all(&mut wrapped).unwrap();
        assert_eq!(rows[0].get(1), Some(&Value::Int(7)));
        assert_eq!(rows[1].get(1), Some(&Value::Int(7)));
    }
}
