//! Join: tuple-nested-loop join over an outer (left) and inner (right) child.

use super::{BoxOperator, Operator};
use crate::error::EngineResult;
use crate::expr::Expr;
use crate::schema::SchemaMapping;
use crate::value::Tuple;

/// Binary join operator. For each outer tuple, the inner child is fully
/// reset and re-iterated; output arity is `|left| + |right|`.
pub struct Join {
    left: BoxOperator,
    right: BoxOperator,
    predicate: Option<Expr>,
    schema: SchemaMapping,
    current_outer: Option<Tuple>,
    outer_exhausted: bool,
}

impl Join {
    /// Build a join over `left` (outer) and `right` (inner) with an optional
    /// predicate — absent means a Cartesian product. The predicate must
    /// already resolve against the combined mapping.
    pub fn new(left: BoxOperator, right: BoxOperator, predicate: Option<Expr>) -> EngineResult<Self> {
        let schema = SchemaMapping::combine(left.schema(), right.schema());
        if let Some(p) = &predicate {
            p.check_resolvable(&schema, "Join")?;
        }
        Ok(Join {
            left,
            right,
            predicate,
            schema,
            current_outer: None,
            outer_exhausted: false,
        })
    }

    fn advance_outer(&mut self) -> EngineResult<bool> {
        match self.left.next()? {
            Some(tuple) => {
                self.current_outer = Some(tuple);
                self.right.reset()?;
                Ok(true)
            }
            None => {
                self.outer_exhausted = true;
                Ok(false)
            }
        }
    }
}

impl Operator for Join {
    fn next(&mut self) -> EngineResult<Option<Tuple>> {
        if self.outer_exhausted {
            return Ok(None);
        }
        if self.current_outer.is_none() && !self.advance_outer()? {
            return Ok(None);
        }

        loop {
            let outer = self.current_outer.clone().expect("outer set above");
            match self.right.next()? {
                Some(inner) => {
                    let combined = Tuple::concat(&outer, &inner);
                    let keep = match &self.predicate {
                        Some(p) => p.eval_bool(&combined, &self.schema)?,
                        None => true,
                    };
                    if keep {
                        return Ok(Some(combined));
                    }
                }
                None => {
                    if !self.advance_outer()? {
                        return Ok(None);
                    }
                }
            }
        }
    }

    fn reset(&mut self) -> EngineResult<()> {
        self.left.reset()?;
        self.right.reset()?;
        self.current_outer = None;
        self.outer_exhausted = false;
        Ok(())
    }

    fn schema(&self) -> &SchemaMapping {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::CompareOp;
    use crate::operators::{drain_all, Scan};
    use std::io::Write;

    fn scan(table: &str, columns: &[&str], contents: &str) -> Scan {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        let path = file.into_temp_path().keep().unwrap();
        Scan::open(
            table,
            &columns.iter().map(ToString::to_string).collect::<Vec<_>>(),
            path,
        )
        .unwrap()
    }

    #[test]
    fn cartesian_product_without_predicate() {
        let left = scan("R", &["A"], "1\n2\n");
        let right = scan("S", &["B"], "10\n20\n");
        let mut join = Join::new(Box::new(left), Box::new(right), None).unwrap();
        let rows = drain_all(&mut join).unwrap();
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn equi_join_filters_and_preserves_outer_major_order() {
        let left = scan("R", &["A", "B"], "1,2\n3,4\n5,6\n");
        let right = scan("S", &["C", "D"], "2,10\n4,20\n7,30\n");
        let predicate = Expr::Compare(
            Box::new(Expr::Column("R.B".into())),
            CompareOp::Eq,
            Box::new(Expr::Column("S.C".into())),
        );
        let mut join = Join::new(Box::new(left), Box::new(right), Some(predicate)).unwrap();
        let rows = drain_all(&mut join).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(0), Some(&crate::value::Value::Int(1)));
        assert_eq!(rows[1].get(0), Some(&crate::value::Value::Int(3)));
    }

    #[test]
    fn reset_rewinds_both_children() {
        let left = scan("R", &["A"], "1\n2\n");
        let right = scan("S", &["B"], "10\n");
        let mut join = Join::new(Box::new(left), Box::new(right), None).unwrap();
        let first = drain_all(&mut join).unwrap();
        join.reset().unwrap();
        let second = drain_all(&mut join).unwrap();
        assert_eq!(first, second);
    }
}
