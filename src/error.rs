//! # Engine error taxonomy
//!
//! One enum for every fatal error kind in the engine: catalog, parse, plan,
//! type, and I/O errors. All are fatal to the current query — there is no
//! retry path, per the single-query execution model.

use thiserror::Error;

/// Errors produced anywhere in the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Missing table file, missing/malformed `schema.txt` entry.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Invalid SQL or an unsupported construct.
    #[error("parse error: {0}")]
    Parse(String),

    /// Unresolvable column reference, ambiguous unqualified column, ORDER BY
    /// over an unknown synthetic column, etc. Raised at plan/construction
    /// time, never per-tuple.
    #[error("plan error: {0}")]
    Plan(String),

    /// A non-integer operand reached an arithmetic or comparison operator
    /// at runtime.
    #[error("type error: {0}")]
    Type(String),

    /// Read failure mid-scan or write failure on output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;
