//! The interactive rule tester.
//!
//! Builds a synthetic transaction from user input and runs it through the
//! same matcher the preview and apply engines use. If this endpoint and a
//! real apply ever disagree for the same inputs, that is a bug in the shared
//! matcher, not a quirk of the tester.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    rule::{
        db::get_all_rules,
        matcher::find_match,
        models::{MatchResult, Rule, RuleState},
    },
    transaction::{Direction, Transaction, UNTAGGED_SCOPE},
};

/// A synthetic transaction to test against the rule set.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TestDraft {
    /// The counterparty to test with.
    #[serde(default)]
    pub counterparty: String,
    /// The amount to test with.
    #[serde(default)]
    pub amount: f64,
    /// The direction to test with; defaults to debit.
    #[serde(default)]
    pub direction: Direction,
}

/// Run a synthetic transaction through the shared matcher.
///
/// When no rule matches, the result carries the untagged scope and no
/// categories, i.e. the transaction would be left as-is.
pub(super) fn test_rule(rules: &[Rule], draft: TestDraft) -> MatchResult {
    let transaction = Transaction {
        id: 0,
        date: Date::MIN,
        amount: draft.amount,
        direction: draft.direction,
        counterparty: draft.counterparty,
        scope: UNTAGGED_SCOPE.to_owned(),
        category: Vec::new(),
        reviewed: false,
    };

    match find_match(rules, &transaction) {
        Some(rule) => MatchResult {
            matched_rule_id: Some(rule.id),
            rule_name: Some(rule.name.clone()),
            new_scope: rule.actions.scope.clone(),
            new_category: rule.actions.category.clone(),
        },
        None => MatchResult {
            matched_rule_id: None,
            rule_name: None,
            new_scope: transaction.scope,
            new_category: transaction.category,
        },
    }
}

/// A route handler for testing a synthetic transaction against the rule set.
pub async fn test_rule_endpoint(
    State(state): State<RuleState>,
    Json(draft): Json<TestDraft>,
) -> Result<Json<MatchResult>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let rules = get_all_rules(&connection)
        .inspect_err(|error| tracing::error!("Failed to load rules for the tester: {error}"))?;

    Ok(Json(test_rule(&rules, draft)))
}
