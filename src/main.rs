// Main entry point for the minisql CLI
// This provides an interactive shell to execute statements

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use minisql::{logging, seed_default_tables, Database, OutputFormat};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// minisql - a minimal in-memory SQL table store
#[derive(ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Execute a single statement and exit
    #[arg(short, long)]
    execute: Option<String>,

    /// Execute statements from a file, one per line, and exit
    #[arg(short, long, conflicts_with = "execute")]
    file: Option<PathBuf>,

    /// Start without the built-in users/orders tables
    #[arg(long)]
    no_seed: bool,

    /// How SELECT results are printed
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_with_level(&args.log_level);

    let mut db = Database::new();
    if !args.no_seed {
        seed_default_tables(&mut db).context("failed to create built-in tables")?;
    }
    info!(tables = ?db.list_tables(), "database ready");

    // If a command was provided, execute it and exit
    if let Some(sql) = args.execute {
        println!("{}", execute(&mut db, &sql, args.format));
        return Ok(());
    }

    if let Some(path) = args.file {
        let file = std::fs::File::open(&path)
            .with_context(|| format!("cannot open {}", path.display()))?;
        for line in io::BufReader::new(file).lines() {
            let line = line?;
            let sql = line.trim();
            if sql.is_empty() || sql.starts_with("--") {
                continue;
            }
            println!("{}", execute(&mut db, sql, args.format));
        }
        return Ok(());
    }

    println!("minisql interactive shell");
    println!("Type statements or '.help' for help, '.exit' to quit");
    println!();

    repl(&mut db, args.format)
}

/// REPL (Read-Eval-Print Loop)
fn repl(db: &mut Database, format: OutputFormat) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("minisql> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            // EOF
            println!();
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        // Handle special commands (starting with .)
        if let Some(meta) = input.strip_prefix('.') {
            let mut parts = meta.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some("exit") | Some("quit"), _) => {
                    println!("Goodbye!");
                    break;
                }
                (Some("help"), _) => print_help(),
                (Some("tables"), _) => {
                    for name in db.list_tables() {
                        println!("{}", name);
                    }
                }
                (Some("schema"), Some(name)) => match db.get_table(name) {
                    Some(table) => println!("{} {}", table.name, table.schema()),
                    None => println!("Table '{}' does not exist.", name),
                },
                _ => {
                    println!("Unknown command: {}", input);
                    println!("Type '.help' for help");
                }
            }
            continue;
        }

        println!("{}", execute(db, input, format));
    }

    Ok(())
}

/// Execute one statement and render its outcome; errors become `Error: ...` lines
fn execute(db: &mut Database, sql: &str, format: OutputFormat) -> String {
    debug!(sql, "executing");
    match db.execute(sql).and_then(|result| format.render(&result)) {
        Ok(out) => out,
        Err(e) => format!("Error: {}", e),
    }
}

/// Print help information
fn print_help() {
    println!("Special Commands:");
    println!("  .help              Show this help message");
    println!("  .tables            List tables");
    println!("  .schema <table>    Show a table's columns");
    println!("  .exit, .quit       Exit the shell");
    println!();
    println!("Supported Statements:");
    println!("  CREATE TABLE pets (id int, name text)");
    println!("  DROP TABLE pets");
    println!("  INSERT INTO pets VALUES (1, 'Rex')");
    println!("  SELECT * FROM pets");
    println!("  SELECT * FROM pets WHERE id=1");
    println!("  SELECT * FROM users JOIN orders ON users.id = orders.user_id");
    println!("  UPDATE pets SET name=Fido WHERE id=1");
    println!("  DELETE FROM pets WHERE id=1");
    println!();
    println!("Notes:");
    println!("  - Every table needs an 'id int' column; it is the primary key");
    println!("  - Values bind to columns in declaration order");
    println!("  - WHERE only supports id=<value>");
    println!("  - JOIN always matches left.id with right.user_id");
}
