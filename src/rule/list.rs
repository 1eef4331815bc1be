use axum::{Json, extract::State};

use crate::{
    Error,
    rule::{
        db::get_all_rules,
        defaults::default_rules,
        models::{Rule, RuleDraft, RuleState},
    },
};

/// A route handler for listing all rules in insertion order.
///
/// Insertion order is the stable tie-break order for equal priorities;
/// clients sort by priority for display, and the matcher re-sorts
/// internally regardless.
pub async fn get_rules_endpoint(State(state): State<RuleState>) -> Result<Json<Vec<Rule>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let rules = get_all_rules(&connection)
        .inspect_err(|error| tracing::error!("Failed to list rules: {error}"))?;

    Ok(Json(rules))
}

/// A route handler returning the canonical default rule set, for reference
/// and for the reset confirmation dialog.
pub async fn get_default_rules_endpoint() -> Json<Vec<RuleDraft>> {
    Json(
        default_rules()
            .into_iter()
            .map(|default| default.draft)
            .collect(),
    )
}
