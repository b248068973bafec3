// minisql - a minimal in-memory relational store driven by a small SQL dialect
// This is the library root that exposes the public API

pub mod error;
pub mod format;
pub mod logging;
pub mod query;
pub mod seed;
pub mod shared;
pub mod storage;

// Re-export commonly used types for convenience
pub use error::{DbError, ErrorKind, Result};
pub use format::OutputFormat;
pub use query::{Database, QueryParser, QueryResult, RowSet, Statement};
pub use seed::seed_default_tables;
pub use shared::SharedDatabase;
pub use storage::{Column, DataType, Row, Schema, Value};
