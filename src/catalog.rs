//! Catalog: maps a table name to its data file path and ordered column list.
//!
//! Built once from a database directory (`<db>/schema.txt` plus
//! `<db>/data/<Table>.csv`) and read-only for the rest of the query.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{EngineError, EngineResult};

/// One table's entry: where its data lives and its column order.
#[derive(Debug, Clone)]
pub struct TableInfo {
    /// Path to the table's CSV data file.
    pub file_path: PathBuf,
    /// Column names, in the order authoritative for this table's tuples.
    pub columns: Vec<String>,
}

/// Process-wide, read-only table directory.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<String, TableInfo>,
}

impl Catalog {
    /// Load a catalog from a database directory by parsing `schema.txt`.
    /// Each line is `TableName Col1 Col2 ... ColN`, whitespace-separated;
    /// the table's data file is expected at `<db>/data/<TableName>.csv`.
    pub fn load(db_dir: &Path) -> EngineResult<Self> {
        let schema_path = db_dir.join("schema.txt");
        let contents = std::fs::read_to_string(&schema_path).map_err(|e| {
            EngineError::Catalog(format!(
                "cannot read schema file {}: {e}",
                schema_path.display()
            ))
        })?;

        let mut tables = HashMap::new();
        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let table = parts.next().ok_or_else(|| {
                EngineError::Catalog(format!(
                    "{}:{}: missing table name",
                    schema_path.display(),
                    lineno + 1
                ))
            })?;
            let columns: Vec<String> = parts.map(str::to_string).collect();
            if columns.is_empty() {
                return Err(EngineError::Catalog(format!(
                    "{}:{}: table '{table}' has no columns",
                    schema_path.display(),
                    lineno + 1
                )));
            }
            let file_path = db_dir.join("data").join(format!("{table}.csv"));
            tables.insert(
                table.to_string(),
                TableInfo {
                    file_path,
                    columns,
                },
            );
        }

        Ok(Catalog { tables })
    }

    /// Resolve a table name to its file path and column list.
    pub fn resolve(&self, table_name: &str) -> EngineResult<&TableInfo> {
        self.tables
            .get(table_name)
            .ok_or_else(|| EngineError::Catalog(format!("no such table: '{table_name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_schema_and_resolves_tables() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("schema.txt"), "R A B\nS C D\n").unwrap();
        fs::write(dir.path().join("data/R.csv"), "1,2\n").unwrap();

        let catalog = Catalog::load(dir.path()).unwrap();
        let r = catalog.resolve("R").unwrap();
        assert_eq!(r.columns, vec!["A".to_string(), "B".to_string()]);
        assert!(catalog.resolve("T").is_err());
    }
}
