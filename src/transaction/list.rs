use axum::{Json, extract::{Query, State}};
use serde::Deserialize;

use crate::{
    Error,
    transaction::{
        db::get_transactions,
        models::{Transaction, TransactionState},
    },
};

/// Query parameters for the transaction listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionListQuery {
    /// When true, only transactions a human has not yet curated are returned.
    #[serde(default)]
    pub only_unreviewed: bool,
}

/// A route handler for listing transactions.
pub async fn get_transactions_endpoint(
    Query(query): Query<TransactionListQuery>,
    State(state): State<TransactionState>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(query.only_unreviewed, &connection)
        .inspect_err(|error| tracing::error!("Failed to list transactions: {error}"))?;

    Ok(Json(transactions))
}
