//! Reassigning rule priorities from a drag-and-drop ordering.

use axum::{Json, extract::State};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    rule::{
        db::get_all_rules,
        models::{RuleId, RuleState},
    },
};

/// The request body for the reorder endpoint.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReorderRequest {
    /// Rule IDs in the desired precedence order, highest first.
    #[serde(default)]
    pub order: Vec<RuleId>,
}

/// The response body for the reorder endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReorderResponse {
    /// Always true on success.
    pub ok: bool,
}

/// Rewrite rule priorities as 1..n following `order`.
///
/// IDs in `order` that are not in the store are skipped; rules missing from
/// `order` keep their relative insertion order after the listed ones.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub(super) fn reorder_rules(order: &[RuleId], connection: &Connection) -> Result<(), Error> {
    let rules = get_all_rules(connection)?;

    let mut next_priority = 1i64;
    for rule_id in order {
        if rules.iter().any(|rule| rule.id == *rule_id) {
            connection.execute(
                "UPDATE rule SET priority = ?1 WHERE id = ?2",
                (next_priority, rule_id),
            )?;
            next_priority += 1;
        }
    }

    for rule in &rules {
        if !order.contains(&rule.id) {
            connection.execute(
                "UPDATE rule SET priority = ?1 WHERE id = ?2",
                (next_priority, rule.id),
            )?;
            next_priority += 1;
        }
    }

    Ok(())
}

/// A route handler for reordering rules by priority.
pub async fn reorder_rules_endpoint(
    State(state): State<RuleState>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<ReorderResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    reorder_rules(&request.order, &connection)
        .inspect_err(|error| tracing::error!("Failed to reorder rules: {error}"))?;

    Ok(Json(ReorderResponse { ok: true }))
}
