//! Sum: blocking group-by aggregation, with optional global aggregation
//! when the group-by list is empty.

use std::collections::HashMap;

use super::{BoxOperator, Operator};
use crate::error::EngineResult;
use crate::expr::Expr;
use crate::schema::SchemaMapping;
use crate::value::{Tuple, Value};

/// Group-by aggregation. Output mapping: group-by columns labeled `Group`
/// (`Group_i` when there is more than one), followed by `SUM_i` for each
/// SUM expression, in order.
pub struct Sum {
    child: BoxOperator,
    group_by: Vec<Expr>,
    sums: Vec<Expr>,
    schema: SchemaMapping,
    rows: Vec<Tuple>,
    materialized: bool,
    cursor: usize,
}

impl Sum {
    /// Build a `Sum` over `child`. Each `group_by`/`sums` expression must
    /// already resolve against `child`'s mapping.
    pub fn new(child: BoxOperator, group_by: Vec<Expr>, sums: Vec<Expr>) -> EngineResult<Self> {
        for expr in group_by.iter().chain(sums.iter()) {
            expr.check_resolvable(child.schema(), "Sum")?;
        }

        let mut columns = Vec::new();
        if group_by.len() == 1 {
            columns.push("Group".to_string());
        } else {
            for i in 0..group_by.len() {
                columns.push(format!("Group_{i}"));
            }
        }
        for i in 0..sums.len() {
            columns.push(format!("SUM_{i}"));
        }

        Ok(Sum {
            child,
            group_by,
            sums,
            schema: SchemaMapping::from_columns(columns),
            rows: Vec::new(),
            materialized: false,
            cursor: 0,
        })
    }

    fn group_key(&self, tuple: &Tuple, mapping: &SchemaMapping) -> EngineResult<Vec<i64>> {
        self.group_by
            .iter()
            .map(|expr| expr.eval_int(tuple, mapping))
            .collect()
    }

    fn materialize(&mut self) -> EngineResult<()> {
        if self.materialized {
            return Ok(());
        }
        let mapping = self.child.schema().clone();

        if self.group_by.is_empty() {
            let mut accumulators = vec![0i64; self.sums.len()];
            while let Some(tuple) = self.child.next()? {
                for (i, expr) in self.sums.iter().enumerate() {
                    accumulators[i] += expr.eval_int(&tuple, &mapping)?;
                }
            }
            self.rows
                .push(Tuple::new(accumulators.into_iter().map(Value::Int).collect()));
        } else {
            let mut groups: HashMap<Vec<i64>, Vec<i64>> = HashMap::new();
            while let Some(tuple) = self.child.next()? {
                let key = self.group_key(&tuple, &mapping)?;
                let accumulators = groups
                    .entry(key)
                    .or_insert_with(|| vec![0i64; self.sums.len()]);
                for (i, expr) in self.sums.iter().enumerate() {
                    accumulators[i] += expr.eval_int(&tuple, &mapping)?;
                }
            }
            for (key, accumulators) in groups {
                let mut fields: Vec<Value> = key.into_iter().map(Value::Int).collect();
                fields.extend(accumulators.into_iter().map(Value::Int));
                self.rows.push(Tuple::new(fields));
            }
        }

        self.materialized = true;
        self.cursor = 0;
        Ok(())
    }
}

impl Operator for Sum {
    fn next(&mut self) -> EngineResult<Option<Tuple>> {
        self.materialize()?;
        if self.cursor >= self.rows.len() {
            return Ok(None);
        }
        let tuple = self.rows[self.cursor].clone();
        self.cursor += 1;
        Ok(Some(tuple))
    }

    fn reset(&mut self) -> EngineResult<()> {
        self.cursor = 0;
        Ok(())
    }

    fn schema(&self) -> &SchemaMapping {
        &self.schema
    }
}
