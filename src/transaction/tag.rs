use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    transaction::{
        db::{get_transaction, set_transaction_tags},
        models::{TransactionId, TransactionState},
    },
};

/// The request body for manually tagging a transaction.
///
/// Absent fields are left unchanged.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TagUpdate {
    /// The new scope, if it should change.
    #[serde(default)]
    pub scope: Option<String>,
    /// The new category list, if it should change.
    #[serde(default)]
    pub category: Option<Vec<String>>,
}

/// The response body for the manual tagging endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct TagResponse {
    /// Always true on success.
    pub ok: bool,
    /// Whether the transaction was actually modified.
    pub changed: bool,
}

/// A route handler for manually setting a transaction's scope and categories.
///
/// Manual edits mark the transaction as reviewed, which protects it from the
/// rule engine when callers ask for unreviewed transactions only.
pub async fn tag_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<TransactionState>,
    Json(update): Json<TagUpdate>,
) -> Result<Json<TagResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, &connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingTransaction,
        error => {
            tracing::error!(
                "An unexpected error occurred when fetching transaction #{transaction_id}: {error}"
            );
            error
        }
    })?;

    let scope = update.scope.unwrap_or_else(|| transaction.scope.clone());
    let category = update
        .category
        .unwrap_or_else(|| transaction.category.clone());

    let changed = scope != transaction.scope || category != transaction.category;

    if changed {
        set_transaction_tags(transaction_id, &scope, &category, true, &connection)
            .inspect_err(|error| {
                tracing::error!("Failed to tag transaction #{transaction_id}: {error}")
            })?;
    }

    Ok(Json(TagResponse { ok: true, changed }))
}

#[cfg(test)]
mod tag_transaction_endpoint_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        AppState, build_router, endpoints,
        endpoints::format_endpoint,
        transaction::{
            db::{create_transaction, get_transaction},
            models::{Transaction, TransactionId},
        },
    };

    use super::TagResponse;

    fn test_server_with_transaction() -> (TestServer, AppState, TransactionId) {
        let connection = Connection::open_in_memory().expect("Could not open database in memory");
        let state = AppState::new(connection).expect("Could not initialize database");

        let transaction_id = {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(149.0, date!(2026 - 07 - 14), "SWIGGY BANGALORE"),
                &connection,
            )
            .unwrap()
            .id
        };

        let server =
            TestServer::new(build_router(state.clone()));

        (server, state, transaction_id)
    }

    #[tokio::test]
    async fn manual_tag_updates_and_marks_reviewed() {
        let (server, state, transaction_id) = test_server_with_transaction();

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION_TAGS, transaction_id))
            .json(&json!({"scope": "personal", "category": ["food"]}))
            .await;

        response.assert_status_ok();
        assert!(response.json::<TagResponse>().changed);

        let connection = state.db_connection.lock().unwrap();
        let transaction = get_transaction(transaction_id, &connection).unwrap();
        assert_eq!(transaction.scope, "personal");
        assert_eq!(transaction.category, vec!["food".to_owned()]);
        assert!(transaction.reviewed);
    }

    #[tokio::test]
    async fn identical_tags_report_no_change() {
        let (server, state, transaction_id) = test_server_with_transaction();

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION_TAGS, transaction_id))
            .json(&json!({"scope": "unknown", "category": []}))
            .await;

        response.assert_status_ok();
        assert!(!response.json::<TagResponse>().changed);

        // A no-op edit must not mark the transaction as reviewed.
        let connection = state.db_connection.lock().unwrap();
        let transaction = get_transaction(transaction_id, &connection).unwrap();
        assert!(!transaction.reviewed);
    }

    #[tokio::test]
    async fn unknown_transaction_returns_not_found() {
        let (server, _state, _transaction_id) = test_server_with_transaction();

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION_TAGS, 999))
            .json(&json!({"scope": "personal"}))
            .await;

        response.assert_status_not_found();
    }
}
