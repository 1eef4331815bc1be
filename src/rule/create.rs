use axum::{Json, extract::State, http::StatusCode};

use crate::{
    Error,
    rule::{
        db::create_rule,
        models::{Rule, RuleDraft, RuleState},
    },
};

/// A route handler for creating a new rule.
pub async fn create_rule_endpoint(
    State(state): State<RuleState>,
    Json(draft): Json<RuleDraft>,
) -> Result<(StatusCode, Json<Rule>), Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let rule = create_rule(draft, &connection)
        .inspect_err(|error| tracing::error!("Failed to create rule: {error}"))?;

    Ok((StatusCode::CREATED, Json(rule)))
}
