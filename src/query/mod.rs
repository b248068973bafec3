// Query module - handles SQL tokenizing, parsing and execution
pub mod executor;
pub mod lexer;
pub mod parser;

pub use executor::{Database, QueryResult, Record, RowSet};
pub use parser::{QueryParser, Statement};
