//! Application router configuration.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, endpoints,
    rule::{
        apply_rules_endpoint, create_rule_endpoint, delete_rule_endpoint,
        get_default_rules_endpoint, get_rules_endpoint, preview_rules_endpoint,
        reorder_rules_endpoint, reset_rules_endpoint, test_rule_endpoint, toggle_rule_endpoint,
        update_rule_endpoint,
    },
    transaction::{
        create_transaction_endpoint, get_transactions_endpoint, tag_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::RULES,
            get(get_rules_endpoint).post(create_rule_endpoint),
        )
        .route(
            endpoints::RULE,
            put(update_rule_endpoint).delete(delete_rule_endpoint),
        )
        .route(endpoints::TOGGLE_RULE, post(toggle_rule_endpoint))
        .route(endpoints::RULE_DEFAULTS, get(get_default_rules_endpoint))
        .route(endpoints::RESET_RULES, post(reset_rules_endpoint))
        .route(endpoints::REORDER_RULES, post(reorder_rules_endpoint))
        .route(endpoints::PREVIEW_RULES, post(preview_rules_endpoint))
        .route(endpoints::APPLY_RULES, post(apply_rules_endpoint))
        .route(endpoints::TEST_RULE, post(test_rule_endpoint))
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION_TAGS, put(tag_transaction_endpoint))
        .route(endpoints::HEALTH, get(get_health))
        .fallback(get_not_found)
        .with_state(state)
}

/// The response body for the health endpoint.
#[derive(Debug, Serialize, Deserialize)]
struct HealthResponse {
    ok: bool,
    transactions: i64,
    rules: i64,
}

/// A route handler reporting service health and store counts.
async fn get_health(State(state): State<AppState>) -> Result<Json<HealthResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions =
        connection.query_row("SELECT COUNT(*) FROM \"transaction\"", [], |row| row.get(0))?;
    let rules = connection.query_row("SELECT COUNT(*) FROM rule", [], |row| row.get(0))?;

    Ok(Json(HealthResponse {
        ok: true,
        transactions,
        rules,
    }))
}

/// The fallback for requests that match no route.
async fn get_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "not found"})),
    )
        .into_response()
}
