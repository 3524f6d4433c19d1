//! Scan: streams tuples from a table's CSV file, one per non-empty line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use super::Operator;
use crate::error::{EngineError, EngineResult};
use crate::schema::SchemaMapping;
use crate::value::{Tuple, Value};

/// Leaf operator: one open file handle over a table's CSV data.
pub struct Scan {
    path: PathBuf,
    schema: SchemaMapping,
    reader: BufReader<File>,
}

impl Scan {
    /// Open `path` and build a scan whose output mapping is `table`'s local
    /// schema mapping. Fails with a catalog error if the file is missing.
    pub fn open(table: &str, columns: &[String], path: PathBuf) -> EngineResult<Self> {
        let file = File::open(&path).map_err(|e| {
            EngineError::Catalog(format!("table '{table}' data file {}: {e}", path.display()))
        })?;
        Ok(Scan {
            schema: SchemaMapping::for_table(table, columns),
            reader: BufReader::new(file),
            path,
        })
    }

    fn reopen(&mut self) -> EngineResult<()> {
        let file = File::open(&self.path)?;
        self.reader = BufReader::new(file);
        Ok(())
    }
}

impl Operator for Scan {
    fn next(&mut self) -> EngineResult<Option<Tuple>> {
        loop {
            let mut line = String::new();
            let bytes_read = self.reader.read_line(&mut line)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }
            let fields = line.split(',').map(Value::from_field).collect();
            return Ok(Some(Tuple::new(fields)));
        }
    }

    fn reset(&mut self) -> EngineResult<()> {
        self.reopen()
    }

    fn schema(&self) -> &SchemaMapping {
        &self.schema
    }
}
