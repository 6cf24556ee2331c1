use std::io::{self, Write};

use anyhow::{Context, Result};
use sqlet_core::Database;
use sqlet_core::parser::parser::parse;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_PATH: &str = "./mydb";

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("SQLET_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_PATH.to_string());
    let mut db =
        Database::open(&path).with_context(|| format!("failed to open database at {path}"))?;
    info!(path = %path, schema_version = db.schema_version(), "database opened");

    println!("sqlet_cli (type 'help' or 'exit')");

    loop {
        print!("db> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        if input.eq_ignore_ascii_case("help") {
            println!("Commands:");
            println!("  parse <stmt>  -> show parsed Command (debug)");
            println!("  .schema       -> print every definition as SQL");
            println!("  .tables       -> list tables");
            println!("  exit|quit     -> quit");
            println!("  help          -> help");
            println!("  (anything else is executed)");
            continue;
        }

        if let Some(rest) = input.strip_prefix("parse ") {
            match parse(rest) {
                Ok(cmd) => println!("Parsed as: {cmd:?}"),
                Err(e) => eprintln!("Parse error: {e}"),
            }
            continue;
        }

        if input == ".schema" {
            println!("{}", db.schema_sql());
            continue;
        }

        if input == ".tables" {
            let names: Vec<&str> = db.tables().into_iter().map(|t| t.name()).collect();
            println!("{}", names.join("\t"));
            continue;
        }

        debug!(statement = input, "executing");
        match db.execute(input) {
            Ok(out) => println!("{out}"),
            Err(err) => {
                debug!(error = %err, "statement failed");
                println!("{err}");
            }
        }
    }

    if db.in_transaction() {
        db.rollback().context("failed to roll back open transaction")?;
    }
    Ok(())
}
