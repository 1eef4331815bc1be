use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    Error,
    rule::{
        db::{toggle_rule, update_rule},
        models::{Rule, RuleId, RulePatch, RuleState},
    },
};

/// A route handler for partially updating a rule.
pub async fn update_rule_endpoint(
    Path(rule_id): Path<RuleId>,
    State(state): State<RuleState>,
    Json(patch): Json<RulePatch>,
) -> Result<Json<Rule>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let rule = update_rule(rule_id, patch, &connection).inspect_err(|error| match error {
        Error::UpdateMissingRule => {}
        error => {
            tracing::error!("An unexpected error occurred while updating rule {rule_id}: {error}")
        }
    })?;

    Ok(Json(rule))
}

/// A route handler for flipping a rule's enabled flag.
pub async fn toggle_rule_endpoint(
    Path(rule_id): Path<RuleId>,
    State(state): State<RuleState>,
) -> Result<Json<Rule>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let rule = toggle_rule(rule_id, &connection).inspect_err(|error| match error {
        Error::UpdateMissingRule => {}
        error => {
            tracing::error!("An unexpected error occurred while toggling rule {rule_id}: {error}")
        }
    })?;

    Ok(Json(rule))
}
