// Shared access to one database from several threads
// Statements are parsed outside the lock; SELECTs share it, everything else takes it exclusively

use crate::error::Result;
use crate::query::{Database, QueryParser, QueryResult};
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct SharedDatabase {
    inner: Arc<RwLock<Database>>,
}

impl SharedDatabase {
    pub fn new(db: Database) -> Self {
        Self {
            inner: Arc::new(RwLock::new(db)),
        }
    }

    /// Parse and execute a statement under the appropriate lock
    pub fn execute(&self, sql: &str) -> Result<QueryResult> {
        let statement = QueryParser::parse(sql)?;
        if statement.is_read_only() {
            self.inner.read().query(&statement)
        } else {
            self.inner.write().execute_statement(statement)
        }
    }

    /// Run a closure with shared access to the database
    pub fn with_read<T>(&self, f: impl FnOnce(&Database) -> T) -> T {
        f(&self.inner.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_inserts() {
        let db = SharedDatabase::default();
        db.execute("CREATE TABLE counters (id int, label text)").unwrap();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let db = db.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        let id = t * 100 + i;
                        db.execute(&format!("INSERT INTO counters VALUES ({}, 'c{}')", id, id))
                            .unwrap();
                        db.execute(&format!("SELECT * FROM counters WHERE id={}", id))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let count = db.with_read(|d| d.get_table("counters").map(|t| t.row_count()));
        assert_eq!(count, Some(100));
    }
}
