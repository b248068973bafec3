// Built-in tables created at start-up

use crate::error::Result;
use crate::query::Database;
use tracing::info;

const TABLES: &[(&str, &str)] = &[
    ("users", "CREATE TABLE users (id int, username text, age int)"),
    ("orders", "CREATE TABLE orders (id int, user_id int, item text)"),
];

const USERS: &[&str] = &[
    "INSERT INTO users VALUES (1, 'John Doe', 30)",
    "INSERT INTO users VALUES (2, 'Jane Smith', 25)",
];

const ORDERS: &[&str] = &["INSERT INTO orders VALUES (1, 1, 'Laptop')"];

/// Create `users` and `orders` if missing, and fill them if they are empty
pub fn seed_default_tables(db: &mut Database) -> Result<()> {
    for (name, ddl) in TABLES {
        if db.get_table(name).is_none() {
            db.execute(ddl)?;
        }
    }

    for (name, rows) in [("users", USERS), ("orders", ORDERS)] {
        if db.get_table(name).is_some_and(|t| t.is_empty()) {
            for sql in rows {
                db.execute(sql)?;
            }
            info!(table = name, rows = rows.len(), "seeded built-in table");
        }
    }

    Ok(())
}
