//! # Planner
//!
//! Turns a parsed [`crate::sql::SelectStatement`] into a tree of physical
//! operators. This is where the schema-mapping discipline actually earns
//! its keep: every rewrite below (predicate pushdown, join-tree
//! construction, literal-SUM rewriting, aggregation, projection,
//! duplicate elimination, ordering) produces tuples under a mapping the
//! *next* step can trust, and a mistake in any one step misaligns every
//! column reference downstream of it.
//!
//! Physical pipeline, closest to the source first:
//! `Scan(s) -> [Select] -> Join* (left-deep) -> [LiteralAppend*] -> [Sum]
//!  -> [Projection] -> [DuplicateElimination] -> [Sort] -> [Projection]`.
//! The trailing `Projection` only appears when ORDER BY needs a column
//! that is not in the user's SELECT list; it trims back to exactly what
//! was asked for.

use crate::catalog::Catalog;
use crate::error::{EngineError, EngineResult};
use crate::expr::Expr;
use crate::operators::{
    BoxOperator, DuplicateElimination, Join, LiteralAppend, Projection, Scan, Select, Sort,
    SortKey, Sum,
};
use crate::schema::SchemaMapping;
use crate::sql::{OrderByItem, OrderTarget, SelectItem, SelectStatement};

/// Build the physical operator tree for `stmt` against `catalog`.
pub fn plan(catalog: &Catalog, stmt: &SelectStatement) -> EngineResult<BoxOperator> {
    if stmt.from.is_empty() {
        return Err(EngineError::Plan("FROM clause cannot be empty".into()));
    }

    let from_mapping = from_scope_mapping(catalog, &stmt.from)?;

    let where_atoms: Vec<Expr> = match &stmt.where_clause {
        Some(expr) => expr.qualify(&from_mapping)?.flatten_conjunction(),
        None => Vec::new(),
    };

    let (local_atoms, mut join_atoms) = partition_atoms(where_atoms, &stmt.from);

    let mut root = build_join_tree(catalog, &stmt.from, local_atoms, &mut join_atoms)?;

    if !join_atoms.is_empty() {
        return Err(EngineError::Plan(format!(
            "WHERE predicate references tables outside the FROM clause: {} atom(s) unattached",
            join_atoms.len()
        )));
    }

    let group_by: Vec<Expr> = stmt
        .group_by
        .iter()
        .map(|c| Expr::Column(c.clone()).qualify(&from_mapping))
        .collect::<EngineResult<_>>()?;

    let sum_items: Vec<Expr> = stmt
        .items
        .iter()
        .filter_map(|item| match item {
            SelectItem::Sum(e) => Some(e.clone()),
            _ => None,
        })
        .map(|e| e.qualify(&from_mapping))
        .collect::<EngineResult<_>>()?;

    let aggregated = !group_by.is_empty() || !sum_items.is_empty();

    // Text forms for ORDER BY's case-insensitive SUM() matching must be
    // captured before the literal-SUM rewrite replaces `Literal` nodes with
    // synthetic column references.
    let sum_text_forms: Vec<String> = sum_items.iter().map(Expr::to_text_form).collect();

    if aggregated {
        let mut rewritten_sums = Vec::with_capacity(sum_items.len());
        let mut literal_index = 0usize;
        for expr in sum_items {
            if let Some(k) = expr.as_literal() {
                let alias = format!("LITERAL_SUM_{literal_index}");
                literal_index += 1;
                root = Box::new(LiteralAppend::new(root, k, alias.clone()));
                rewritten_sums.push(Expr::Column(alias));
            } else {
                rewritten_sums.push(expr);
            }
        }
        root = Box::new(Sum::new(root, group_by.clone(), rewritten_sums)?);
    }

    // Required-columns analysis: the labels the user's SELECT list needs,
    // plus any extra labels ORDER BY needs that aren't already among them.
    let select_labels = select_item_labels(
        &stmt.items,
        &stmt.group_by,
        &from_mapping,
        aggregated,
        root.schema(),
    )?;

    let order_keys = resolve_order_by(
        &stmt.order_by,
        &from_mapping,
        &stmt.group_by,
        &sum_text_forms,
        aggregated,
    )?;

    let mut projection_labels = select_labels.clone();
    for (label, _) in &order_keys {
        if !projection_labels.contains(label) {
            projection_labels.push(label.clone());
        }
    }

    let needs_trim = projection_labels != select_labels;
    let is_star = matches!(stmt.items.as_slice(), [SelectItem::Star]);

    if !is_star || needs_trim {
        root = Box::new(Projection::new(root, &projection_labels)?);
    }

    if stmt.distinct || !stmt.group_by.is_empty() {
        root = Box::new(DuplicateElimination::new(root));
    }

    if !order_keys.is_empty() {
        let keys = order_keys
            .iter()
            .map(|(label, descending)| {
                root.schema()
                    .require(label, "Sort")
                    .map(|index| SortKey { index, descending: *descending })
            })
            .collect::<EngineResult<Vec<_>>>()?;
        root = Box::new(Sort::new(root, keys));
    }

    if needs_trim {
        root = Box::new(Projection::new(root, &select_labels)?);
    }

    Ok(root)
}

/// Resolve a raw (possibly unqualified) column name against `mapping`,
/// without round-tripping through an `Expr::Column` node.
fn qualify_name(raw: &str, mapping: &SchemaMapping) -> EngineResult<String> {
    if raw.contains('.') {
        Ok(raw.to_string())
    } else {
        mapping.resolve_unqualified(raw)
    }
}

/// The combined mapping of every table in FROM, in FROM order — used only
/// to resolve unqualified column references against the whole query scope.
fn from_scope_mapping(catalog: &Catalog, from: &[String]) -> EngineResult<SchemaMapping> {
    let mut mapping = SchemaMapping::default();
    for table in from {
        let info = catalog.resolve(table)?;
        mapping = SchemaMapping::combine(&mapping, &SchemaMapping::for_table(table, &info.columns));
    }
    Ok(mapping)
}

/// Split WHERE atoms into ones local to a single FROM table (pushed down
/// onto that table's scan) and ones spanning two or more tables (attached
/// during join-tree construction).
fn partition_atoms(atoms: Vec<Expr>, from: &[String]) -> (Vec<Vec<Expr>>, Vec<Expr>) {
    let mut local: Vec<Vec<Expr>> = from.iter().map(|_| Vec::new()).collect();
    let mut join_atoms = Vec::new();

    'atom: for atom in atoms {
        let tables = referenced_tables(&atom);
        if let [table] = tables.as_slice() {
            for (i, name) in from.iter().enumerate() {
                if name == table {
                    local[i].push(atom);
                    continue 'atom;
                }
            }
        }
        join_atoms.push(atom);
    }

    (local, join_atoms)
}

/// The set of table names (qualifiers) an expression's columns belong to.
fn referenced_tables(expr: &Expr) -> Vec<String> {
    let mut tables = Vec::new();
    for column in expr.columns() {
        if let Some((table, _)) = column.split_once('.') {
            if !tables.iter().any(|t| t == table) {
                tables.push(table.to_string());
            }
        }
    }
    tables
}

/// Build the left-deep join tree: one scan per FROM table, with local
/// predicates pushed onto the scan and join atoms attached to the
/// shallowest join whose combined mapping fully covers their columns. An
/// atom referencing three or more tables is attached the first time all of
/// them are present — the deepest join that actually needs it.
fn build_join_tree(
    catalog: &Catalog,
    from: &[String],
    mut local_atoms: Vec<Vec<Expr>>,
    join_atoms: &mut Vec<Expr>,
) -> EngineResult<BoxOperator> {
    let mut tables = from.iter();
    let first_table = tables.next().expect("FROM has at least one table");
    let mut root = build_scan(catalog, first_table, local_atoms.remove(0))?;

    for table in tables {
        let local = local_atoms.remove(0);
        let right = build_scan(catalog, table, local)?;
        let combined_mapping = SchemaMapping::combine(root.schema(), right.schema());

        let mut attached = Vec::new();
        let mut remaining = Vec::new();
        for atom in join_atoms.drain(..) {
            if atom.columns().iter().all(|c| combined_mapping.index_of(c).is_some()) {
                attached.push(atom);
            } else {
                remaining.push(atom);
            }
        }
        *join_atoms = remaining;

        let predicate = Expr::conjoin(attached);
        root = Box::new(Join::new(root, right, predicate)?);
    }

    Ok(root)
}

fn build_scan(catalog: &Catalog, table: &str, local_atoms: Vec<Expr>) -> EngineResult<BoxOperator> {
    let info = catalog.resolve(table)?;
    let mut scan: BoxOperator = Box::new(Scan::open(table, &info.columns, info.file_path.clone())?);
    if let Some(predicate) = Expr::conjoin(local_atoms) {
        scan = Box::new(Select::new(scan, predicate)?);
    }
    Ok(scan)
}

/// The output label each SELECT item resolves to. For a non-aggregated
/// query this is just the item's qualified column name (or every FROM
/// column, for `*`). For an aggregated query, a plain column must be one
/// of the GROUP BY keys and is translated to its `Group`/`Group_i` label;
/// a `SUM(expr)` item is translated to its `SUM_i` label in SELECT order.
fn select_item_labels(
    items: &[SelectItem],
    group_by_raw: &[String],
    from_mapping: &SchemaMapping,
    aggregated: bool,
    post_agg_mapping: &SchemaMapping,
) -> EngineResult<Vec<String>> {
    if matches!(items, [SelectItem::Star]) {
        let mapping = if aggregated { post_agg_mapping } else { from_mapping };
        return Ok(mapping.columns().to_vec());
    }

    let group_by_qualified: Vec<String> = group_by_raw
        .iter()
        .map(|c| qualify_name(c, from_mapping))
        .collect::<EngineResult<_>>()?;

    let mut sum_index = 0usize;
    let mut labels = Vec::with_capacity(items.len());
    for item in items {
        match item {
            SelectItem::Star => {
                return Err(EngineError::Plan("'*' cannot be mixed with other SELECT items".into()))
            }
            SelectItem::Column(raw) => {
                let qualified = qualify_name(raw, from_mapping)?;
                if aggregated {
                    let pos = group_by_qualified.iter().position(|g| *g == qualified).ok_or_else(|| {
                        EngineError::Plan(format!(
                            "column '{raw}' in an aggregated SELECT must appear in GROUP BY"
                        ))
                    })?;
                    labels.push(group_label(pos, group_by_qualified.len()));
                } else {
                    labels.push(qualified);
                }
            }
            SelectItem::Sum(_) => {
                labels.push(format!("SUM_{sum_index}"));
                sum_index += 1;
            }
        }
    }
    Ok(labels)
}

fn group_label(pos: usize, count: usize) -> String {
    if count == 1 {
        "Group".to_string()
    } else {
        format!("Group_{pos}")
    }
}

/// Resolve each ORDER BY key to the output label and sort direction it
/// implies, before the final projection is built so the label can be
/// threaded through it.
fn resolve_order_by(
    order_by: &[OrderByItem],
    from_mapping: &SchemaMapping,
    group_by_raw: &[String],
    sum_text_forms: &[String],
    aggregated: bool,
) -> EngineResult<Vec<(String, bool)>> {
    let group_by_qualified: Vec<String> = group_by_raw
        .iter()
        .map(|c| qualify_name(c, from_mapping))
        .collect::<EngineResult<_>>()?;

    let mut out = Vec::with_capacity(order_by.len());
    for item in order_by {
        let label = match &item.target {
            OrderTarget::Column(raw) => {
                let qualified = qualify_name(raw, from_mapping)?;
                if aggregated {
                    let pos = group_by_qualified.iter().position(|g| *g == qualified).ok_or_else(|| {
                        EngineError::Plan(format!(
                            "ORDER BY column '{raw}' must be a GROUP BY key in an aggregated query"
                        ))
                    })?;
                    group_label(pos, group_by_qualified.len())
                } else {
                    qualified
                }
            }
            OrderTarget::Sum(expr) => {
                let qualified = expr.clone().qualify(from_mapping)?;
                let text = qualified.to_text_form();
                let pos = sum_text_forms
                    .iter()
                    .position(|f| f.eq_ignore_ascii_case(&text))
                    .ok_or_else(|| {
                        EngineError::Plan(
                            "ORDER BY SUM(...) does not match any SUM in the SELECT list".into(),
                        )
                    })?;
                format!("SUM_{pos}")
            }
        };
        out.push((label, item.descending));
    }
    Ok(out)
}
