use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use tally_rs::{
    Direction, ResetMode, Transaction, create_transaction, initialize_db, reset_rules,
};

/// A utility for creating a test database for the REST API server of tally_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    println!("Installing default rules...");
    let rule_count = reset_rules(ResetMode::Replace, &connection)?;
    println!("Installed {rule_count} rules.");

    println!("Creating sample transactions...");

    create_transaction(
        Transaction::build(149.0, date!(2026 - 07 - 14), "SWIGGY BANGALORE"),
        &connection,
    )?;
    create_transaction(
        Transaction::build(8.0, date!(2026 - 07 - 15), "PARKING METER"),
        &connection,
    )?;
    create_transaction(
        Transaction::build(18.0, date!(2026 - 07 - 15), "CHAI POINT"),
        &connection,
    )?;
    create_transaction(
        Transaction::build(230.0, date!(2026 - 07 - 16), "UBER INDIA"),
        &connection,
    )?;
    create_transaction(
        Transaction::build(640.0, date!(2026 - 07 - 17), "BIGBASKET"),
        &connection,
    )?;
    create_transaction(
        Transaction::build(1200.0, date!(2026 - 07 - 18), "FRIEND UPI")
            .direction(Direction::Credit),
        &connection,
    )?;
    create_transaction(
        Transaction::build(32000.0, date!(2026 - 07 - 31), "NEFT SALARY CREDIT")
            .direction(Direction::Credit),
        &connection,
    )?;
    create_transaction(
        Transaction::build(560.0, date!(2026 - 08 - 01), "LANDMARK BOOKSTORE")
            .scope("personal")
            .category(&["shopping"])
            .reviewed(true),
        &connection,
    )?;

    println!("Success!");

    Ok(())
}
