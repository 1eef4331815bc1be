//! Database access for transactions.

use rusqlite::{Connection, Row, types::Type};

use crate::{
    Error,
    transaction::models::{Transaction, TransactionBuilder, TransactionId},
};

const TRANSACTION_COLUMNS: &str =
    "id, date, amount, direction, counterparty, scope, category, reviewed";

/// Create a transaction in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the builder's amount is zero or negative,
/// - [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if builder.amount <= 0.0 {
        return Err(Error::NonPositiveAmount);
    }

    connection.execute(
        "INSERT INTO \"transaction\" (date, amount, direction, counterparty, scope, category, reviewed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        (
            &builder.date,
            builder.amount,
            builder.direction,
            &builder.counterparty,
            &builder.scope,
            category_to_json(&builder.category)?,
            builder.reviewed,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        date: builder.date,
        amount: builder.amount,
        direction: builder.direction,
        counterparty: builder.counterparty,
        scope: builder.scope,
        category: builder.category,
        reviewed: builder.reviewed,
    })
}

/// Retrieve a transaction in the database by `transaction_id`.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_transaction(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id;"
        ))?
        .query_row(&[(":id", &transaction_id)], map_transaction_row)
        .map_err(|error| error.into())
}

/// Retrieve transactions in the database in insertion order, optionally
/// filtering to those a human has not yet curated.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_transactions(
    only_unreviewed: bool,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let query = if only_unreviewed {
        format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE reviewed = 0 ORDER BY id ASC;"
        )
    } else {
        format!("SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" ORDER BY id ASC;")
    };

    connection
        .prepare(&query)?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Write a transaction's scope, categories, and reviewed flag back to the
/// database.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `transaction_id` is not in the database,
/// - [Error::SqlError] if there is some other SQL error.
pub fn set_transaction_tags(
    transaction_id: TransactionId,
    scope: &str,
    category: &[String],
    reviewed: bool,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET scope = ?1, category = ?2, reviewed = ?3 WHERE id = ?4",
        (scope, category_to_json(category)?, reviewed, transaction_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table in the database.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                amount REAL NOT NULL,
                direction TEXT NOT NULL,
                counterparty TEXT NOT NULL,
                scope TEXT NOT NULL DEFAULT 'unknown',
                category TEXT NOT NULL DEFAULT '[]',
                reviewed INTEGER NOT NULL DEFAULT 0
            );",
        (),
    )?;

    // Improve performance when filtering to unreviewed transactions
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_reviewed ON \"transaction\"(reviewed)",
        (),
    )?;

    Ok(())
}

fn category_to_json(category: &[String]) -> Result<String, Error> {
    serde_json::to_string(category)
        .map_err(|error| Error::JsonSerializationError(error.to_string()))
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_category: String = row.get(6)?;
    let category = serde_json::from_str(&raw_category).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(error))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        amount: row.get(2)?,
        direction: row.get(3)?,
        counterparty: row.get(4)?,
        scope: row.get(5)?,
        category,
        reviewed: row.get(7)?,
    })
}
