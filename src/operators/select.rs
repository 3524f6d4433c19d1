//! Select: filters a child's tuples by a predicate expression.

use super::{BoxOperator, Operator};
use crate::error::EngineResult;
use crate::expr::Expr;
use crate::schema::SchemaMapping;
use crate::value::Tuple;

/// Wraps a child and a predicate; pulls until the predicate is true or the
/// child is exhausted.
pub struct Select {
    child: BoxOperator,
    predicate: Expr,
}

impl Select {
    /// Construct a `Select`. The predicate must already resolve against
    /// `child`'s schema mapping — a construction-time plan error, not a
    /// per-tuple failure.
    pub fn new(child: BoxOperator, predicate: Expr) -> EngineResult<Self> {
        predicate.check_resolvable(child.schema(), "Select")?;
        Ok(Select { child, predicate })
    }
}

impl Operator for Select {
    fn next(&mut self) -> EngineResult<Option<Tuple>> {
        while let Some(tuple) = self.child.next()? {
            if self.predicate.eval_bool(&tuple, self.child.schema())? {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }

    fn reset(&mut self) -> EngineResult<()> {
        self.child.reset()
    }

    fn schema(&self) -> &SchemaMapping {
        self.child.schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{CompareOp, Expr};
    use crate::operators::{drain_all, Scan};
    use std::io::Write;

    fn scan(contents: &str) -> Scan {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        let path = file.into_temp_path().keep().unwrap();
        Scan::open("R", &["A".into(), "B".into()], path).unwrap()
    }

    #[test]
    fn filters_by_predicate() {
        let predicate = Expr::Compare(
            Box::new(Expr::Column("R.A".into())),
            CompareOp::Gt,
            Box::new(Expr::Literal(2)),
        );
        let mut select = Select::new(Box::new(scan("1,2\n3,4\n5,6\n")), predicate).unwrap();
        let rows = drain_all(&mut select).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn unresolvable_predicate_is_a_construction_error() {
        let predicate = Expr::Compare(
            Box::new(Expr::Column("R.Missing".into())),
            CompareOp::Eq,
            Box::new(Expr::Literal(1)),
        );
        assert!(Select::new(Box::new(scan("1,2\n")), predicate).is_err());
    }
}
