//! The parsed shape of a supported SELECT statement, before planning.

use crate::expr::Expr;

/// A column reference as written in the query — possibly unqualified.
pub type RawColumn = String;

/// One item in the projection list.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// `*`
    Star,
    /// A (possibly unqualified) column reference.
    Column(RawColumn),
    /// `SUM(expr)`.
    Sum(Expr),
}

/// One ORDER BY key's target: a plain column, or a `SUM(expr)` matched
/// against a synthetic aggregate column by inner-expression textual form.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderTarget {
    Column(RawColumn),
    Sum(Expr),
}

/// One ORDER BY key.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub target: OrderTarget,
    pub descending: bool,
}

/// A fully parsed SELECT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub distinct: bool,
    pub items: Vec<SelectItem>,
    pub from: Vec<String>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<RawColumn>,
    pub order_by: Vec<OrderByItem>,
}
