//! # Expression evaluator
//!
//! A tagged sum over expression node kinds (the target-language replacement
//! for the source's visitor-pattern expression tree) plus one recursive
//! evaluator. Unsupported constructs are rejected by the parser; anything
//! that slips through as a non-integer operand at runtime is a
//! [`crate::error::EngineError::Type`] error, never a panic.

use crate::error::{EngineError, EngineResult};
use crate::schema::SchemaMapping;
use crate::value::Tuple;

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// An arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Mul,
}

/// An expression tree: column references, integer literals, arithmetic,
/// comparisons, and conjunction/disjunction of predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A qualified column reference, e.g. `R.A`.
    Column(String),
    /// An integer literal.
    Literal(i64),
    /// `lhs <op> rhs` arithmetic.
    Arith(Box<Expr>, ArithOp, Box<Expr>),
    /// `lhs <op> rhs` comparison, evaluating to a boolean predicate.
    Compare(Box<Expr>, CompareOp, Box<Expr>),
    /// `lhs AND rhs`.
    And(Box<Expr>, Box<Expr>),
    /// `lhs OR rhs` — never decomposed by the planner, evaluated whole.
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Every qualified column this expression references, in encounter order
    /// (not deduplicated by the caller's choice, but this helper dedups since
    /// every known use is as a set).
    pub fn columns(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns(&self, out: &mut Vec<String>) {
        match self {
            Expr::Column(c) => {
                if !out.contains(c) {
                    out.push(c.clone());
                }
            }
            Expr::Literal(_) => {}
            Expr::Arith(l, _, r) | Expr::Compare(l, _, r) | Expr::And(l, r) | Expr::Or(l, r) => {
                l.collect_columns(out);
                r.collect_columns(out);
            }
        }
    }

    /// True if this expression is a bare column reference.
    pub fn as_column(&self) -> Option<&str> {
        match self {
            Expr::Column(c) => Some(c.as_str()),
            _ => None,
        }
    }

    /// True if this expression is a constant integer.
    pub fn as_literal(&self) -> Option<i64> {
        match self {
            Expr::Literal(n) => Some(*n),
            _ => None,
        }
    }

    /// Check, at construction time, that every column this expression
    /// references is visible in `mapping`. Returns a plan error naming the
    /// first offender.
    pub fn check_resolvable(&self, mapping: &SchemaMapping, context: &str) -> EngineResult<()> {
        for column in self.columns() {
            mapping.require(&column, context)?;
        }
        Ok(())
    }

    /// Resolve every unqualified column reference in this expression to
    /// `Table.Column` form by consulting `mapping` (which must cover the
    /// full FROM scope). Already-qualified references pass through
    /// unchanged.
    pub fn qualify(&self, mapping: &SchemaMapping) -> EngineResult<Expr> {
        Ok(match self {
            Expr::Column(c) => {
                if c.contains('.') {
                    Expr::Column(c.clone())
                } else {
                    Expr::Column(mapping.resolve_unqualified(c)?)
                }
            }
            Expr::Literal(n) => Expr::Literal(*n),
            Expr::Arith(l, op, r) => {
                Expr::Arith(Box::new(l.qualify(mapping)?), *op, Box::new(r.qualify(mapping)?))
            }
            Expr::Compare(l, op, r) => {
                Expr::Compare(Box::new(l.qualify(mapping)?), *op, Box::new(r.qualify(mapping)?))
            }
            Expr::And(l, r) => Expr::And(Box::new(l.qualify(mapping)?), Box::new(r.qualify(mapping)?)),
            Expr::Or(l, r) => Expr::Or(Box::new(l.qualify(mapping)?), Box::new(r.qualify(mapping)?)),
        })
    }

    /// Evaluate this expression to an integer against `tuple` under `mapping`.
    pub fn eval_int(&self, tuple: &Tuple, mapping: &SchemaMapping) -> EngineResult<i64> {
        match self {
            Expr::Column(name) => {
                let idx = mapping
                    .index_of(name)
                    .ok_or_else(|| EngineError::Plan(format!("unresolved column '{name}'")))?;
                let value = tuple
                    .get(idx)
                    .ok_or_else(|| EngineError::Type(format!("tuple missing field {idx}")))?;
                value
                    .as_int()
                    .ok_or_else(|| EngineError::Type(format!("column '{name}' is not an integer")))
            }
            Expr::Literal(n) => Ok(*n),
            Expr::Arith(l, op, r) => {
                let a = l.eval_int(tuple, mapping)?;
                let b = r.eval_int(tuple, mapping)?;
                Ok(match op {
                    ArithOp::Add => a + b,
                    ArithOp::Mul => a * b,
                })
            }
            Expr::Compare(..) | Expr::And(..) | Expr::Or(..) => Err(EngineError::Type(
                "a boolean expression cannot be evaluated as an integer".into(),
            )),
        }
    }

    /// Evaluate this expression as a predicate against `tuple` under `mapping`.
    pub fn eval_bool(&self, tuple: &Tuple, mapping: &SchemaMapping) -> EngineResult<bool> {
        match self {
            Expr::Compare(l, op, r) => {
                let a = l.eval_int(tuple, mapping)?;
                let b = r.eval_int(tuple, mapping)?;
                Ok(match op {
                    CompareOp::Eq => a == b,
                    CompareOp::Ne => a != b,
                    CompareOp::Lt => a < b,
                    CompareOp::Le => a <= b,
                    CompareOp::Gt => a > b,
                    CompareOp::Ge => a >= b,
                })
            }
            Expr::And(l, r) => Ok(l.eval_bool(tuple, mapping)? && r.eval_bool(tuple, mapping)?),
            Expr::Or(l, r) => Ok(l.eval_bool(tuple, mapping)? || r.eval_bool(tuple, mapping)?),
            Expr::Column(_) | Expr::Literal(_) | Expr::Arith(..) => Err(EngineError::Type(
                "an integer expression cannot be evaluated as a predicate".into(),
            )),
        }
    }

    /// Flatten top-level `AND` conjunctions into a flat list of atoms.
    /// `OR` and any other combinator is never decomposed and appears as a
    /// single atom.
    pub fn flatten_conjunction(self) -> Vec<Expr> {
        match self {
            Expr::And(l, r) => {
                let mut out = l.flatten_conjunction();
                out.extend(r.flatten_conjunction());
                out
            }
            other => vec![other],
        }
    }

    /// Conjoin a list of atoms back into a single expression, or `None` if
    /// the list is empty.
    pub fn conjoin(atoms: Vec<Expr>) -> Option<Expr> {
        let mut iter = atoms.into_iter();
        let first = iter.next()?;
        Some(iter.fold(first, |acc, atom| Expr::And(Box::new(acc), Box::new(atom))))
    }

    /// A normalized textual form, used to case-insensitively match a bare
    /// `SUM(expr)` in ORDER BY against the same expression that appeared in
    /// the SELECT list's SUM.
    pub fn to_text_form(&self) -> String {
        match self {
            Expr::Column(c) => c.to_lowercase(),
            Expr::Literal(n) => n.to_string(),
            Expr::Arith(l, op, r) => {
                let op = match op {
                    ArithOp::Add => "+",
                    ArithOp::Mul => "*",
                };
                format!("({}{op}{})", l.to_text_form(), r.to_text_form())
            }
            Expr::Compare(l, op, r) => {
                let op = match op {
                    CompareOp::Eq => "=",
                    CompareOp::Ne => "!=",
                    CompareOp::Lt => "<",
                    CompareOp::Le => "<=",
                    CompareOp::Gt => ">",
                    CompareOp::Ge => ">=",
                };
                format!("({}{op}{})", l.to_text_form(), r.to_text_form())
            }
            Expr::And(l, r) => format!("({} and {})", l.to_text_form(), r.to_text_form()),
            Expr::Or(l, r) => format!("({} or {})", l.to_text_form(), r.to_text_form()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn col(name: &str) -> Expr {
        Expr::Column(name.to_string())
    }

    #[test]
    fn evaluates_arithmetic_and_comparison() {
        let mapping = SchemaMapping::for_table("R", &["A".into(), "B".into()]);
        let tuple = Tuple::new(vec![Value::Int(3), Value::Int(4)]);
        let expr = Expr::Compare(
            Box::new(Expr::Arith(
                Box::new(col("R.A")),
                ArithOp::Add,
                Box::new(col("R.B")),
            )),
            CompareOp::Eq,
            Box::new(Expr::Literal(7)),
        );
        assert!(expr.eval_bool(&tuple, &mapping).unwrap());
    }

    #[test]
    fn flattens_and_reconjoins_conjunctions() {
        let atoms = vec![
            Expr::Compare(Box::new(col("R.A")), CompareOp::Gt, Box::new(Expr::Literal(1))),
            Expr::Compare(Box::new(col("R.B")), CompareOp::Lt, Box::new(Expr::Literal(9))),
        ];
        let conjoined = Expr::conjoin(atoms.clone()).unwrap();
        let flattened = conjoined.flatten_conjunction();
        assert_eq!(flattened, atoms);
    }

    #[test]
    fn unresolved_column_is_a_plan_error() {
        let mapping = SchemaMapping::for_table("R", &["A".into()]);
        let expr = col("R.Missing");
        assert!(expr.check_resolvable(&mapping, "Select").is_err());
    }
}
