//! # sqlcsv
//!
//! A single-process, read-only SQL query engine over CSV-resident tables.
//! A database is a directory: `schema.txt` declares each table's columns,
//! and `data/<Table>.csv` holds its rows. The engine parses one SELECT
//! statement, plans a tree of pull-based physical operators against the
//! catalog, and drains the root to produce CSV output.
//!
//! ## Pipeline
//!
//! ```text
//! schema.txt + data/*.csv
//!     |
//! [Catalog::load]
//!     |
//! [sql::parse_select]           query text -> SelectStatement
//!     |
//! [planner::plan]                SelectStatement -> operator tree
//!     |
//! [operators::drain_all]         operator tree -> Vec<Tuple>
//!     |
//! CSV output
//! ```
//!
//! Every operator exposes a [`schema::SchemaMapping`] describing exactly
//! the tuples it produces; the planner is the one place responsible for
//! keeping that mapping correct across every rewrite.

pub mod catalog;
pub mod config;
pub mod error;
pub mod expr;
pub mod operators;
pub mod planner;
pub mod schema;
pub mod sql;
pub mod value;

pub use catalog::Catalog;
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use value::{Tuple, Value};
