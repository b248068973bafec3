// Table implementation
// A table combines its schema with a row store keyed by primary key

use super::{Row, Schema, Value};
use crate::error::{DbError, Result};
use std::collections::BTreeMap;

/// Represents a database table
/// The table exclusively owns its rows
#[derive(Debug, Clone)]
pub struct Table {
    /// The name of the table
    pub name: String,
    /// The schema (column definitions)
    schema: Schema,
    /// Rows keyed by their primary key value
    /// BTreeMap keeps scans in ascending key order
    rows: BTreeMap<i64, Row>,
}

impl Table {
    /// Create a new, empty table with the given name and schema
    pub fn new(name: String, schema: Schema) -> Self {
        Self {
            name,
            schema,
            rows: BTreeMap::new(),
        }
    }

    /// Insert a row into the table
    /// An existing row with the same key is overwritten; returns true when that happened
    pub fn insert(&mut self, row: Row) -> Result<bool> {
        let shape_matches = row.values.len() == self.schema.len()
            && self
                .schema
                .columns()
                .iter()
                .zip(&row.values)
                .all(|(col, value)| value.data_type() == col.data_type);
        if !shape_matches {
            return Err(DbError::Internal(format!(
                "row {} does not match the schema of '{}'",
                row.id, self.name
            )));
        }
        Ok(self.rows.insert(row.id, row).is_some())
    }

    /// Exact-key lookup
    pub fn get(&self, id: i64) -> Option<&Row> {
        self.rows.get(&id)
    }

    /// All rows, in ascending primary key order
    pub fn scan(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    /// Overwrite columns of the row with the given key
    ///
    /// Assignments are column indexes paired with already-coerced values.
    /// Assignments to the primary key column are skipped so a row never
    /// moves to a different key.
    pub fn update(&mut self, id: i64, assignments: Vec<(usize, Value)>) -> Result<usize> {
        let pk_index = self.schema.primary_key_index();
        for (col_index, value) in &assignments {
            let column = self.schema.columns().get(*col_index).ok_or_else(|| {
                DbError::Internal(format!("column index {} out of range", col_index))
            })?;
            if value.data_type() != column.data_type {
                return Err(DbError::TypeCoercion {
                    column: column.name.clone(),
                    value: value.to_string(),
                });
            }
        }

        let row = self.rows.get_mut(&id).ok_or_else(|| DbError::RowNotFound {
            table: self.name.clone(),
            id,
        })?;

        let mut changed = 0;
        for (col_index, value) in assignments {
            if col_index == pk_index {
                continue;
            }
            row.values[col_index] = value;
            changed += 1;
        }

        Ok(changed)
    }

    /// Remove the row with the given key
    /// Returns whether a row was actually removed; a missing key is not an error
    pub fn delete(&mut self, id: i64) -> bool {
        self.rows.remove(&id).is_some()
    }

    /// Get the number of rows in the table
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the schema of the table
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}
