// Error types
// Every failure a statement can produce is a DbError; nothing else escapes the engine

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, DbError>;

/// Broad classification of a DbError, for callers that only care about the category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Statement does not match the shape expected for its command
    Syntax,
    /// A referenced table, row or column does not exist
    NotFound,
    /// Schema rules were broken (missing primary key, name collision)
    Validation,
    /// A value could not be parsed as the column's declared type
    TypeCoercion,
    /// A WHERE predicate targets something other than the primary key
    UnsupportedPredicate,
    /// Anything else
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DbError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Table '{0}' does not exist.")]
    TableNotFound(String),

    #[error("Row with id {id} not found in '{table}'.")]
    RowNotFound { table: String, id: i64 },

    #[error("Column '{column}' does not exist in '{table}'.")]
    ColumnNotFound { table: String, column: String },

    #[error("Table already exists.")]
    TableExists(String),

    #[error("Column '{0}' is declared more than once.")]
    DuplicateColumn(String),

    #[error("Table must declare an 'id' column of type int.")]
    MissingPrimaryKey,

    #[error("Invalid integer value '{value}' for column '{column}'.")]
    TypeCoercion { column: String, value: String },

    #[error("Unsupported predicate on '{0}': only id=<value> is supported.")]
    UnsupportedPredicate(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DbError {
    /// Shorthand for building a syntax error from anything displayable
    pub fn syntax(msg: impl Into<String>) -> Self {
        DbError::Syntax(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Syntax(_) => ErrorKind::Syntax,
            DbError::TableNotFound(_)
            | DbError::RowNotFound { .. }
            | DbError::ColumnNotFound { .. } => ErrorKind::NotFound,
            DbError::TableExists(_) | DbError::DuplicateColumn(_) | DbError::MissingPrimaryKey => {
                ErrorKind::Validation
            }
            DbError::TypeCoercion { .. } => ErrorKind::TypeCoercion,
            DbError::UnsupportedPredicate(_) => ErrorKind::UnsupportedPredicate,
            DbError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<sqlparser::tokenizer::TokenizerError> for DbError {
    fn from(e: sqlparser::tokenizer::TokenizerError) -> Self {
        DbError::Syntax(e.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::Internal(e.to_string())
    }
}
