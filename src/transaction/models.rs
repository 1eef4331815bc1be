//! The transaction domain model and its builder.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::{
    Connection, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::AppState;

/// Alias for the integer type used for transaction database IDs.
pub type TransactionId = i64;

/// The scope assigned to transactions that no one has classified yet.
pub const UNTAGGED_SCOPE: &str = "unknown";

/// Whether money left the account (debit) or came in (credit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money left the account.
    #[default]
    Debit,
    /// Money came into the account.
    Credit,
}

impl Direction {
    /// The lowercase string form used in the database and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Debit => "debit",
            Direction::Credit => "credit",
        }
    }
}

impl ToSql for Direction {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Direction {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "debit" => Ok(Direction::Debit),
            "credit" => Ok(Direction::Credit),
            other => Err(FromSqlError::Other(
                format!("invalid direction {other:?}").into(),
            )),
        }
    }
}

/// A financial transaction: money moving in or out of the user's account.
///
/// The `amount` is always a positive magnitude; `direction` records which way
/// the money moved. `scope` and `category` are the classification assigned
/// either by the auto-tagging rules or by hand; `reviewed` marks transactions
/// a human has curated, which protects them from automatic re-tagging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The date the transaction occurred.
    pub date: Date,
    /// The transaction amount as a positive magnitude.
    pub amount: f64,
    /// Whether the transaction is a debit or a credit.
    pub direction: Direction,
    /// The merchant or person on the other side of the transaction.
    pub counterparty: String,
    /// The spending scope, e.g. "personal" or "family".
    pub scope: String,
    /// The categories assigned to the transaction.
    pub category: Vec<String>,
    /// Whether a human has curated this transaction's tags.
    pub reviewed: bool,
}

impl Transaction {
    /// Create a builder for a transaction with the given required fields.
    ///
    /// The remaining fields default to a debit with the untagged scope, no
    /// categories and `reviewed` unset.
    pub fn build(amount: f64, date: Date, counterparty: &str) -> TransactionBuilder {
        TransactionBuilder {
            date,
            amount,
            direction: Direction::default(),
            counterparty: counterparty.to_owned(),
            scope: UNTAGGED_SCOPE.to_owned(),
            category: Vec::new(),
            reviewed: false,
        }
    }
}

fn untagged_scope() -> String {
    UNTAGGED_SCOPE.to_owned()
}

/// The data needed to create a transaction, before an ID has been assigned.
///
/// Doubles as the request body for the create transaction endpoint, which is
/// why the optional fields carry serde defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionBuilder {
    /// The date the transaction occurred.
    pub date: Date,
    /// The transaction amount as a positive magnitude.
    pub amount: f64,
    /// Whether the transaction is a debit or a credit.
    #[serde(default)]
    pub direction: Direction,
    /// The merchant or person on the other side of the transaction.
    pub counterparty: String,
    /// The spending scope, e.g. "personal" or "family".
    #[serde(default = "untagged_scope")]
    pub scope: String,
    /// The categories assigned to the transaction.
    #[serde(default)]
    pub category: Vec<String>,
    /// Whether a human has curated this transaction's tags.
    #[serde(default)]
    pub reviewed: bool,
}

impl TransactionBuilder {
    /// Set the transaction's direction.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the transaction's scope.
    pub fn scope(mut self, scope: &str) -> Self {
        self.scope = scope.to_owned();
        self
    }

    /// Set the transaction's categories.
    pub fn category(mut self, category: &[&str]) -> Self {
        self.category = category.iter().map(|name| (*name).to_owned()).collect();
        self
    }

    /// Set whether the transaction has been manually curated.
    pub fn reviewed(mut self, reviewed: bool) -> Self {
        self.reviewed = reviewed;
        self
    }
}

/// Unified state for all transaction-related operations.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
