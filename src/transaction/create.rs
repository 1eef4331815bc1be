use axum::{Json, extract::State, http::StatusCode};

use crate::{
    Error,
    transaction::{
        db::create_transaction,
        models::{Transaction, TransactionBuilder, TransactionState},
    },
};

/// A route handler for creating a new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Json(builder): Json<TransactionBuilder>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(builder, &connection)
        .inspect_err(|error| tracing::error!("Failed to create transaction: {error}"))?;

    Ok((StatusCode::CREATED, Json(transaction)))
}
