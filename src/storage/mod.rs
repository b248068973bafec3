// Storage module - schemas, typed values and the in-memory row stores
// Nothing here knows about SQL text; the query module feeds it typed data

pub mod catalog;
pub mod table;

use crate::error::{DbError, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Name of the mandatory primary key column
pub const PRIMARY_KEY: &str = "id";

/// A single cell value
/// Closed over the two kinds a column can declare
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Text(String),
}

impl Value {
    /// Coerce a raw literal into a value of the given type
    ///
    /// Surrounding whitespace and quote characters are stripped first, so
    /// `"Rex"`, `'Rex'` and `Rex` all become the same text value.
    pub fn coerce(raw: &str, data_type: DataType, column: &str) -> Result<Value> {
        let cleaned = strip_quotes(raw);
        match data_type {
            DataType::Integer => cleaned
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| DbError::TypeCoercion {
                    column: column.to_string(),
                    value: cleaned.to_string(),
                }),
            DataType::Text => Ok(Value::Text(cleaned.to_string())),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Text(_) => None,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::Integer(_) => DataType::Integer,
            Value::Text(_) => DataType::Text,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

fn strip_quotes(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

/// The data types a column can declare
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Text,
}

impl DataType {
    /// Map a type token from CREATE TABLE to a data type
    /// Only `int` means Integer; every other token is stored as Text
    pub fn from_type_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("int") {
            DataType::Integer
        } else {
            DataType::Text
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "int"),
            DataType::Text => write!(f, "text"),
        }
    }
}

/// Represents a single column definition
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub primary_key: bool,
}

impl Column {
    /// Build a column; the primary key flag is derived from the name and type
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        let name = name.into();
        let primary_key = name == PRIMARY_KEY && data_type == DataType::Integer;
        Self {
            name,
            data_type,
            primary_key,
        }
    }
}

/// Ordered column definitions of a table
/// The order decides how INSERT values bind to columns
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
    primary_key: usize,
}

impl Schema {
    /// Create a schema, rejecting duplicate names and a missing integer `id` column
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DbError::DuplicateColumn(column.name.clone()));
            }
        }

        let primary_key = columns
            .iter()
            .position(|col| col.primary_key)
            .ok_or(DbError::MissingPrimaryKey)?;

        Ok(Self {
            columns,
            primary_key,
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Find the index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|col| col.name == name)
    }

    pub fn primary_key_index(&self) -> usize {
        self.primary_key
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cols: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.data_type))
            .collect();
        write!(f, "({})", cols.join(", "))
    }
}

/// Represents a single row in a table
/// `values` is aligned with the schema; `id` mirrors the primary key column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    id: i64,
    values: Vec<Value>,
}

impl Row {
    /// Build a row from typed values in schema order
    pub fn new(schema: &Schema, values: Vec<Value>) -> Result<Self> {
        if values.len() != schema.len() {
            return Err(DbError::syntax(format!(
                "expected {} values, got {}",
                schema.len(),
                values.len()
            )));
        }
        for (col, value) in schema.columns().iter().zip(&values) {
            if value.data_type() != col.data_type {
                return Err(DbError::TypeCoercion {
                    column: col.name.clone(),
                    value: value.to_string(),
                });
            }
        }

        let id = values[schema.primary_key_index()]
            .as_integer()
            .ok_or_else(|| DbError::Internal("primary key is not an integer".to_string()))?;

        Ok(Row { id, values })
    }

    /// Bind raw literals positionally to the schema columns
    pub fn from_literals(schema: &Schema, literals: &[String]) -> Result<Self> {
        if literals.len() < schema.len() {
            return Err(DbError::syntax(format!(
                "expected {} values, got {} (value index {} out of range)",
                schema.len(),
                literals.len(),
                literals.len()
            )));
        }
        if literals.len() > schema.len() {
            return Err(DbError::syntax(format!(
                "expected {} values, got {}",
                schema.len(),
                literals.len()
            )));
        }

        let values = schema
            .columns()
            .iter()
            .zip(literals)
            .map(|(col, raw)| Value::coerce(raw, col.data_type, &col.name))
            .collect::<Result<Vec<_>>>()?;

        Self::new(schema, values)
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pets() -> Schema {
        Schema::new(vec![
            Column::new("id", DataType::Integer),
            Column::new("name", DataType::Text),
        ])
        .unwrap()
    }

    #[test]
    fn test_coerce_strips_quotes() {
        assert_eq!(
            Value::coerce(" \"Rex\" ", DataType::Text, "name").unwrap(),
            Value::Text("Rex".to_string())
        );
        assert_eq!(
            Value::coerce("'42'", DataType::Integer, "id").unwrap(),
            Value::Integer(42)
        );
    }

    #[test]
    fn test_coerce_rejects_non_numeric() {
        let err = Value::coerce("abc", DataType::Integer, "age").unwrap_err();
        assert_eq!(
            err,
            DbError::TypeCoercion {
                column: "age".to_string(),
                value: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_type_names() {
        assert_eq!(DataType::from_type_name("int"), DataType::Integer);
        assert_eq!(DataType::from_type_name("INT"), DataType::Integer);
        assert_eq!(DataType::from_type_name("integer"), DataType::Text);
        assert_eq!(DataType::from_type_name("varchar"), DataType::Text);
    }

    #[test]
    fn test_schema_requires_integer_id() {
        let err = Schema::new(vec![Column::new("name", DataType::Text)]).unwrap_err();
        assert_eq!(err, DbError::MissingPrimaryKey);

        let err = Schema::new(vec![Column::new("id", DataType::Text)]).unwrap_err();
        assert_eq!(err, DbError::MissingPrimaryKey);
    }

    #[test]
    fn test_schema_rejects_duplicate_columns() {
        let err = Schema::new(vec![
            Column::new("id", DataType::Integer),
            Column::new("name", DataType::Text),
            Column::new("name", DataType::Integer),
        ])
        .unwrap_err();
        assert_eq!(err, DbError::DuplicateColumn("name".to_string()));
    }

    #[test]
    fn test_row_binding() {
        let schema = pets();
        let row = Row::from_literals(&schema, &["7".to_string(), "\"Rex\"".to_string()]).unwrap();
        assert_eq!(row.id(), 7);
        assert_eq!(row.values()[1], Value::Text("Rex".to_string()));

        let err = Row::from_literals(&schema, &["7".to_string()]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Syntax);
    }

    #[test]
    fn test_row_new_checks_shape() {
        let schema = pets();
        let err = Row::new(&schema, vec![Value::Integer(1)]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Syntax);

        let err = Row::new(&schema, vec![Value::Text("1".into()), Value::Text("Rex".into())])
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::TypeCoercion);

        let row = Row::new(&schema, vec![Value::Integer(3), Value::Text("Rex".into())]).unwrap();
        assert_eq!(row.id(), 3);
    }

    #[test]
    fn test_value_serializes_untagged() {
        let json = serde_json::to_string(&vec![Value::Integer(1), Value::Text("a".into())]).unwrap();
        assert_eq!(json, r#"[1,"a"]"#);
    }
}
