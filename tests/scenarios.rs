// End-to-end statement scenarios against a fresh database

use minisql::{logging, seed_default_tables, Database, DbError, ErrorKind, QueryResult, Value};
use proptest::prelude::*;

fn seeded() -> Database {
    logging::init_test();
    let mut db = Database::new();
    seed_default_tables(&mut db).unwrap();
    db
}

#[test]
fn pets_lifecycle() {
    let mut db = Database::new();

    assert_eq!(
        db.run("CREATE TABLE pets (id int, name text)"),
        "Table 'pets' created successfully."
    );
    assert_eq!(db.run("CREATE TABLE pets (id int, name text)"), "Error: Table already exists.");

    db.execute("INSERT INTO pets VALUES (1, \"Rex\")").unwrap();
    assert_eq!(db.run("SELECT * FROM pets WHERE id=1"), r#"{"id":1,"name":"Rex"}"#);

    db.execute("UPDATE pets SET name=Fido WHERE id=1").unwrap();
    let result = db.execute("SELECT * FROM pets WHERE id=1").unwrap();
    assert_eq!(
        result.rows().unwrap().value(0, "name"),
        Some(&Value::Text("Fido".to_string()))
    );

    db.execute("DELETE FROM pets WHERE id=1").unwrap();
    assert_eq!(db.run("SELECT * FROM pets WHERE id=1"), "No results.");

    db.execute("DROP TABLE pets").unwrap();
    assert_eq!(
        db.run("CREATE TABLE pets (id int)"),
        "Table 'pets' created successfully."
    );
}

#[test]
fn join_on_seed_data() {
    let mut db = seeded();
    let result = db
        .execute("SELECT * FROM users JOIN orders ON whatever")
        .unwrap();
    assert_eq!(
        result,
        QueryResult::Joined(vec!["John Doe bought Laptop".to_string()])
    );
}

#[test]
fn join_ignores_on_clause() {
    let mut db = seeded();
    db.execute("INSERT INTO orders VALUES (2, 2, 'Phone')").unwrap();
    db.execute("INSERT INTO orders VALUES (3, 7, 'Nothing')").unwrap();

    let result = db
        .execute("select users.username from users join orders on users.age = orders.id;")
        .unwrap();
    assert_eq!(
        result.to_string(),
        "John Doe bought Laptop\nJane Smith bought Phone"
    );
}

#[test]
fn join_unknown_table() {
    let mut db = seeded();
    let err = db
        .execute("SELECT * FROM users JOIN invoices ON users.id = invoices.user_id")
        .unwrap_err();
    assert_eq!(err, DbError::TableNotFound("invoices".to_string()));
}

#[test]
fn select_full_scan_on_seed_data() {
    let mut db = seeded();
    let result = db.execute("SELECT * FROM users").unwrap();
    assert_eq!(
        result.to_string(),
        "{\"id\":1,\"username\":\"John Doe\",\"age\":30}\n{\"id\":2,\"username\":\"Jane Smith\",\"age\":25}"
    );
}

#[test]
fn insert_with_missing_values_fails() {
    let mut db = seeded();
    let err = db.execute("INSERT INTO users VALUES (3, 'Ann')").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(db.get_table("users").unwrap().row_count(), 2);
}

#[test]
fn update_of_id_keeps_primary_key() {
    let mut db = seeded();
    db.execute("UPDATE users SET id=10, age=31 WHERE id=1").unwrap();
    assert_eq!(db.run("SELECT * FROM users WHERE id=10"), "No results.");
    assert_eq!(
        db.run("SELECT * FROM users WHERE id=1"),
        r#"{"id":1,"username":"John Doe","age":31}"#
    );
}

#[test]
fn delete_of_missing_key() {
    let mut db = seeded();
    db.execute("DELETE FROM users WHERE id=42").unwrap();
    assert_eq!(db.get_table("users").unwrap().row_count(), 2);
}

#[test]
fn drop_twice() {
    let mut db = seeded();
    assert_eq!(db.run("DROP TABLE orders"), "Table 'orders' dropped successfully.");
    assert_eq!(db.run("DROP TABLE orders"), "Error: Table 'orders' does not exist.");
    assert_eq!(db.run("DROP TABLE"), "Error: Syntax error: expected table name");
}

#[test]
fn unsupported_predicates() {
    let mut db = seeded();
    for sql in [
        "SELECT * FROM users WHERE username='John Doe'",
        "UPDATE users SET age=1 WHERE age=30",
        "DELETE FROM users WHERE username='John Doe'",
    ] {
        let err = db.execute(sql).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedPredicate, "{}", sql);
    }
}

#[test]
fn unknown_command_is_not_an_error() {
    let mut db = seeded();
    assert_eq!(db.run("TRUNCATE users"), "Unknown command.");
}

#[test]
fn unquoted_text_is_stored_as_written() {
    let mut db = Database::new();
    db.execute("CREATE TABLE pets (id int, name text)").unwrap();
    db.execute("INSERT INTO pets VALUES (1, Rex)").unwrap();
    db.execute("INSERT INTO pets VALUES (2, a@b.com)").unwrap();
    db.execute("INSERT INTO pets VALUES (3, John  Doe)").unwrap();
    db.execute("UPDATE pets SET name=Fido-2 WHERE id=1").unwrap();

    assert_eq!(
        db.run("SELECT * FROM pets"),
        "{\"id\":1,\"name\":\"Fido-2\"}\n{\"id\":2,\"name\":\"a@b.com\"}\n{\"id\":3,\"name\":\"John  Doe\"}"
    );
}

#[test]
fn unknown_command_with_unlexable_body() {
    let mut db = Database::new();
    assert_eq!(db.run("HELLO 'unterminated"), "Unknown command.");
}

#[test]
fn non_word_type_is_text() {
    let mut db = Database::new();
    db.execute("CREATE TABLE t (id int, n 5)").unwrap();
    db.execute("INSERT INTO t VALUES (1, 5x)").unwrap();
    assert_eq!(db.run("SELECT n FROM t"), r#"{"n":"5x"}"#);
}

fn column_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z][a-z_]{0,7}", 0..6)
        .prop_map(|set| set.into_iter().filter(|c| c != "id").collect())
}

proptest! {
    #[test]
    fn create_without_integer_id_is_rejected(
        columns in column_names(),
        types in prop::collection::vec(prop::sample::select(vec!["int", "text"]), 6),
        text_id in any::<bool>(),
        id_position in 0usize..6,
    ) {
        let mut defs: Vec<String> = columns
            .iter()
            .zip(types.iter())
            .map(|(c, t)| format!("{} {}", c, t))
            .collect();
        if text_id {
            defs.insert(id_position.min(defs.len()), "id text".to_string());
        }
        prop_assume!(!defs.is_empty());

        let mut db = Database::new();
        let sql = format!("CREATE TABLE t ({})", defs.join(", "));
        prop_assert_eq!(db.execute(&sql), Err(DbError::MissingPrimaryKey));
        prop_assert!(db.list_tables().is_empty());
    }

    #[test]
    fn create_with_integer_id_anywhere_succeeds(
        columns in column_names(),
        id_position in 0usize..6,
    ) {
        let mut defs: Vec<String> = columns.iter().map(|c| format!("{} text", c)).collect();
        defs.insert(id_position.min(defs.len()), "id int".to_string());

        let mut db = Database::new();
        let sql = format!("CREATE TABLE t ({})", defs.join(", "));
        prop_assert!(db.execute(&sql).is_ok());
    }

    #[test]
    fn insert_then_select_round_trips(id in -1000i64..1000, name in "[A-Za-z][A-Za-z ]{0,12}[A-Za-z]", age in 0i64..120) {
        let mut db = Database::new();
        db.execute("CREATE TABLE people (id int, name text, age int)").unwrap();
        db.execute(&format!("INSERT INTO people VALUES ({}, '{}', {})", id, name, age)).unwrap();

        let result = db.execute(&format!("SELECT * FROM people WHERE id={}", id)).unwrap();
        let rows = result.rows().unwrap();
        prop_assert_eq!(rows.len(), 1);
        prop_assert_eq!(rows.value(0, "id"), Some(&Value::Integer(id)));
        prop_assert_eq!(rows.value(0, "name"), Some(&Value::Text(name.clone())));
        prop_assert_eq!(rows.value(0, "age"), Some(&Value::Integer(age)));
    }
}
