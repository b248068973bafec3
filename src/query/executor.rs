// Query Executor
// This module dispatches parsed statements to their handlers and applies them to the catalog

use super::parser::{Assignment, ColumnDef, KeyFilter, Projection, QueryParser, Statement};
use crate::error::{DbError, Result};
use crate::format;
use crate::storage::{catalog::Catalog, table::Table, Column, DataType, Row, Schema, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use tracing::{debug, warn};

/// Columns the fixed JOIN shape reads
const JOIN_LEFT_NAME: &str = "username";
const JOIN_RIGHT_KEY: &str = "user_id";
const JOIN_RIGHT_ITEM: &str = "item";

/// An in-memory database: a catalog of tables plus the statement interpreter
/// Each instance is independent; nothing is shared between them
#[derive(Debug, Default, Clone)]
pub struct Database {
    catalog: Catalog,
}

impl Database {
    /// Create a new database with no tables
    pub fn new() -> Self {
        Self {
            catalog: Catalog::new(),
        }
    }

    /// Parse and execute a single statement
    pub fn execute(&mut self, sql: &str) -> Result<QueryResult> {
        let statement = QueryParser::parse(sql)?;
        self.execute_statement(statement)
    }

    /// Execute one statement and render the outcome as a message
    /// Failures come back as `Error: ...` rather than as an Err
    pub fn run(&mut self, sql: &str) -> String {
        match self.execute(sql) {
            Ok(result) => result.to_string(),
            Err(e) => format!("Error: {}", e),
        }
    }

    /// Execute an already parsed statement
    pub fn execute_statement(&mut self, statement: Statement) -> Result<QueryResult> {
        match statement {
            Statement::CreateTable { name, columns } => self.create_table(name, columns),
            Statement::DropTable { name } => self.drop_table(name),
            Statement::Insert { table, values } => self.insert(table, values),
            Statement::Update {
                table,
                assignments,
                filter,
            } => self.update(table, assignments, filter),
            Statement::Delete { table, filter } => self.delete(table, filter),
            read => self.query(&read),
        }
    }

    /// Execute a statement that does not modify the database
    pub fn query(&self, statement: &Statement) -> Result<QueryResult> {
        match statement {
            Statement::Select {
                table,
                projection,
                filter,
            } => self.select(table, projection, *filter),
            Statement::Join { left, right, on } => self.join(left, right, on),
            Statement::Unknown { keyword } => {
                debug!(keyword = %keyword, "unknown command");
                Ok(QueryResult::UnknownCommand(keyword.clone()))
            }
            other => Err(DbError::Internal(format!(
                "statement is not read-only: {:?}",
                other
            ))),
        }
    }

    fn create_table(&mut self, name: String, defs: Vec<ColumnDef>) -> Result<QueryResult> {
        if self.catalog.contains(&name) {
            return Err(DbError::TableExists(name));
        }

        let columns = defs
            .into_iter()
            .map(|def| Column::new(def.name, DataType::from_type_name(&def.type_name)))
            .collect();
        let schema = Schema::new(columns)?;
        debug!(table = %name, schema = %schema, "creating table");

        self.catalog.create_table(&name, schema)?;
        Ok(QueryResult::TableCreated(name))
    }

    fn drop_table(&mut self, name: String) -> Result<QueryResult> {
        let table = self.catalog.drop_table(&name)?;
        debug!(table = %name, rows = table.row_count(), "dropped table");
        Ok(QueryResult::TableDropped(name))
    }

    fn insert(&mut self, table_name: String, literals: Vec<String>) -> Result<QueryResult> {
        let table = self.catalog.get_mut(&table_name)?;
        let row = Row::from_literals(table.schema(), &literals)?;
        let id = row.id();

        let replaced = table.insert(row)?;
        if replaced {
            warn!(table = %table_name, id, "insert overwrote an existing row");
        } else {
            debug!(table = %table_name, id, "inserted row");
        }

        Ok(QueryResult::Inserted {
            table: table_name,
            id,
            replaced,
        })
    }

    fn select(
        &self,
        table_name: &str,
        projection: &Projection,
        filter: Option<KeyFilter>,
    ) -> Result<QueryResult> {
        let table = self.catalog.get(table_name)?;
        let indexes = projection_indexes(table, projection)?;

        let rows: Vec<&Row> = match filter {
            Some(KeyFilter { id }) => table.get(id).into_iter().collect(),
            None => table.scan().collect(),
        };
        debug!(table = %table_name, returned = rows.len(), "select");

        let schema = table.schema();
        Ok(QueryResult::Rows(RowSet {
            columns: indexes
                .iter()
                .map(|&i| schema.columns()[i].name.clone())
                .collect(),
            rows: rows
                .into_iter()
                .map(|row| indexes.iter().map(|&i| row.values()[i].clone()).collect())
                .collect(),
        }))
    }

    /// Nested-loop join of `left.id` against `right.user_id`
    /// The ON clause is not consulted
    fn join(&self, left_name: &str, right_name: &str, on: &str) -> Result<QueryResult> {
        let left = self.catalog.get(left_name)?;
        let right = self.catalog.get(right_name)?;
        debug!(left = %left_name, right = %right_name, on = %on, "join ignores ON clause");

        let name_idx = column_index(left, JOIN_LEFT_NAME)?;
        let key_idx = column_index(right, JOIN_RIGHT_KEY)?;
        let item_idx = column_index(right, JOIN_RIGHT_ITEM)?;

        let mut lines = Vec::new();
        for l in left.scan() {
            for r in right.scan() {
                if r.values()[key_idx].as_integer() == Some(l.id()) {
                    lines.push(format!("{} bought {}", l.values()[name_idx], r.values()[item_idx]));
                }
            }
        }

        Ok(QueryResult::Joined(lines))
    }

    fn update(
        &mut self,
        table_name: String,
        assignments: Vec<Assignment>,
        filter: KeyFilter,
    ) -> Result<QueryResult> {
        let table = self.catalog.get_mut(&table_name)?;
        if table.get(filter.id).is_none() {
            return Err(DbError::RowNotFound {
                table: table_name,
                id: filter.id,
            });
        }

        // Coerce everything before touching the row; the primary key is never reassigned
        let pk_index = table.schema().primary_key_index();
        let mut changes = Vec::with_capacity(assignments.len());
        for Assignment { column, value } in assignments {
            let index = column_index(table, &column)?;
            if index == pk_index {
                continue;
            }
            let data_type = table.schema().columns()[index].data_type;
            changes.push((index, Value::coerce(&value, data_type, &column)?));
        }

        let changed = table.update(filter.id, changes)?;
        debug!(table = %table_name, id = filter.id, changed, "updated row");

        Ok(QueryResult::Updated {
            table: table_name,
            id: filter.id,
        })
    }

    fn delete(&mut self, table_name: String, filter: KeyFilter) -> Result<QueryResult> {
        let table = self.catalog.get_mut(&table_name)?;
        let removed = table.delete(filter.id);
        debug!(table = %table_name, id = filter.id, removed, "delete");

        Ok(QueryResult::Deleted {
            table: table_name,
            id: filter.id,
            removed,
        })
    }

    /// Get a reference to a table (useful for direct access)
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.catalog.get(name).ok()
    }

    /// List all tables in the database, sorted by name
    pub fn list_tables(&self) -> Vec<String> {
        self.catalog.table_names()
    }
}

fn column_index(table: &Table, column: &str) -> Result<usize> {
    table
        .schema()
        .column_index(column)
        .ok_or_else(|| DbError::ColumnNotFound {
            table: table.name.clone(),
            column: column.to_string(),
        })
}

fn projection_indexes(table: &Table, projection: &Projection) -> Result<Vec<usize>> {
    match projection {
        Projection::All => Ok((0..table.schema().len()).collect()),
        Projection::Columns(names) => names.iter().map(|n| column_index(table, n)).collect(),
    }
}

/// Represents the result of a statement execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    TableCreated(String),
    TableDropped(String),
    Inserted {
        table: String,
        id: i64,
        /// A row with the same key existed and was overwritten
        replaced: bool,
    },
    /// Rows returned from a SELECT
    Rows(RowSet),
    /// One line per matching pair from a JOIN
    Joined(Vec<String>),
    Updated {
        table: String,
        id: i64,
    },
    Deleted {
        table: String,
        id: i64,
        removed: bool,
    },
    UnknownCommand(String),
}

impl QueryResult {
    /// The row set, for SELECT results
    pub fn rows(&self) -> Option<&RowSet> {
        match self {
            QueryResult::Rows(set) => Some(set),
            _ => None,
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::TableCreated(name) => {
                write!(f, "Table '{}' created successfully.", name)
            }
            QueryResult::TableDropped(name) => {
                write!(f, "Table '{}' dropped successfully.", name)
            }
            QueryResult::Inserted { table, .. } => write!(f, "1 row inserted into '{}'.", table),
            QueryResult::Rows(set) if set.is_empty() => write!(f, "No results."),
            QueryResult::Rows(set) => {
                let lines = format::json_lines(set).map_err(|_| fmt::Error)?;
                write!(f, "{}", lines)
            }
            QueryResult::Joined(lines) if lines.is_empty() => write!(f, "No results."),
            QueryResult::Joined(lines) => write!(f, "{}", lines.join("\n")),
            QueryResult::Updated { table, .. } => write!(f, "1 row updated in '{}'.", table),
            QueryResult::Deleted { table, removed, .. } => write!(
                f,
                "{} row(s) deleted from '{}'.",
                usize::from(*removed),
                table
            ),
            QueryResult::UnknownCommand(_) => write!(f, "Unknown command."),
        }
    }
}

/// Rows returned by a SELECT, with the names of the returned columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of a named column in the given row
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(col)
    }

    /// Each row as a column name to value mapping
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(move |values| Record {
            columns: &self.columns,
            values,
        })
    }
}

/// One row viewed as a mapping; serializes as a map with keys in column order
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> Record<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}
