//! The preview and apply engines.
//!
//! Preview computes the changes the rule set would make without touching the
//! transaction store; apply writes them back. Both run the exact same
//! candidate selection and matching ([propose_changes]), so the set of
//! transactions a preview reports is precisely the set a subsequent apply
//! mutates.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    rule::{
        db::get_all_rules,
        matcher::find_match,
        models::{Rule, RuleId, RuleState},
    },
    transaction::{Transaction, TransactionId, get_transactions, set_transaction_tags},
};

/// The request body shared by the preview and apply endpoints.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RuleRunRequest {
    /// When true, transactions a human has curated are left alone.
    #[serde(default)]
    pub only_unreviewed: bool,
}

/// A proposed scope/category change for a single transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedChange {
    /// The transaction that would change.
    pub transaction_id: TransactionId,
    /// The transaction's counterparty, for display.
    pub counterparty: String,
    /// The transaction's amount, for display.
    pub amount: f64,
    /// The transaction's current scope.
    pub current_scope: String,
    /// The transaction's current categories.
    pub current_category: Vec<String>,
    /// The scope the winning rule would assign.
    pub new_scope: String,
    /// The categories the winning rule would assign.
    pub new_category: Vec<String>,
    /// The ID of the winning rule.
    pub rule_id: RuleId,
    /// The name of the winning rule.
    pub rule_name: String,
}

/// The result of a dry run over the transaction store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewReport {
    /// The number of proposed changes.
    pub count: usize,
    /// One entry per transaction whose tags would change.
    pub matches: Vec<ProposedChange>,
}

/// The result of applying rules to the transaction store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApplyOutcome {
    /// The number of transactions whose tags were written.
    pub updated: usize,
    /// The number of candidate transactions considered, after the
    /// manual-edit filter.
    pub total: usize,
}

/// The response body for the apply endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApplyResponse {
    /// Always true on success.
    pub ok: bool,
    /// The number of transactions whose tags were written.
    pub updated: usize,
    /// The number of candidate transactions considered.
    pub total: usize,
}

/// Compute the changes the rule set would make to `transactions`.
///
/// Returns the proposed changes and the number of candidates considered.
/// A transaction produces a change only when an enabled rule matches AND the
/// rule's actions differ from the transaction's current scope/category
/// tuple; matches that would be no-ops are dropped. When `only_unreviewed`
/// is set, reviewed transactions are not candidates at all.
fn propose_changes(
    rules: &[Rule],
    transactions: &[Transaction],
    only_unreviewed: bool,
) -> (Vec<ProposedChange>, usize) {
    let mut changes = Vec::new();
    let mut total = 0;

    for transaction in transactions {
        if only_unreviewed && transaction.reviewed {
            continue;
        }
        total += 1;

        let Some(rule) = find_match(rules, transaction) else {
            continue;
        };

        if rule.actions.scope == transaction.scope && rule.actions.category == transaction.category
        {
            continue;
        }

        changes.push(ProposedChange {
            transaction_id: transaction.id,
            counterparty: transaction.counterparty.clone(),
            amount: transaction.amount,
            current_scope: transaction.scope.clone(),
            current_category: transaction.category.clone(),
            new_scope: rule.actions.scope.clone(),
            new_category: rule.actions.category.clone(),
            rule_id: rule.id,
            rule_name: rule.name.clone(),
        });
    }

    (changes, total)
}

/// Compute the changes the rule set would make, without mutating anything.
///
/// # Errors
/// Returns an error if there is an SQL error while reading rules or
/// transactions.
pub fn preview_rules(
    only_unreviewed: bool,
    connection: &rusqlite::Connection,
) -> Result<PreviewReport, Error> {
    let rules = get_all_rules(connection)?;
    let transactions = get_transactions(false, connection)?;

    let (matches, _) = propose_changes(&rules, &transactions, only_unreviewed);

    Ok(PreviewReport {
        count: matches.len(),
        matches,
    })
}

/// Apply the rule set to the transaction store.
///
/// Each proposed change is written individually; a failed write is logged
/// and skipped so one bad row cannot abort the batch. Applying twice in a
/// row with no other state change updates nothing on the second run, since
/// every candidate's tags already equal what the rules assign.
///
/// # Errors
/// Returns an error if there is an SQL error while reading rules or
/// transactions. Individual write failures are reported through the
/// `updated` count, not as an error.
pub fn apply_rules(
    only_unreviewed: bool,
    connection: &rusqlite::Connection,
) -> Result<ApplyOutcome, Error> {
    let rules = get_all_rules(connection)?;
    let transactions = get_transactions(false, connection)?;

    let (changes, total) = propose_changes(&rules, &transactions, only_unreviewed);

    let mut updated = 0;
    for change in &changes {
        match set_transaction_tags(
            change.transaction_id,
            &change.new_scope,
            &change.new_category,
            true,
            connection,
        ) {
            Ok(()) => updated += 1,
            Err(error) => {
                tracing::error!(
                    "failed to write tags for transaction {}: {error}",
                    change.transaction_id
                );
            }
        }
    }

    Ok(ApplyOutcome { updated, total })
}

/// A route handler for previewing what the rule set would change.
pub async fn preview_rules_endpoint(
    State(state): State<RuleState>,
    Json(request): Json<RuleRunRequest>,
) -> Result<Json<PreviewReport>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let report = preview_rules(request.only_unreviewed, &connection)
        .inspect_err(|error| tracing::error!("Failed to preview rules: {error}"))?;

    Ok(Json(report))
}

/// A route handler for applying the rule set to the transaction store.
pub async fn apply_rules_endpoint(
    State(state): State<RuleState>,
    Json(request): Json<RuleRunRequest>,
) -> Result<Json<ApplyResponse>, Error> {
    let start_time = std::time::Instant::now();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let outcome = apply_rules(request.only_unreviewed, &connection)
        .inspect_err(|error| tracing::error!("Failed to apply rules: {error}"))?;

    tracing::info!(
        "Applied rules in {:.2}ms: {} of {} candidates updated",
        start_time.elapsed().as_millis(),
        outcome.updated,
        outcome.total
    );

    Ok(Json(ApplyResponse {
        ok: true,
        updated: outcome.updated,
        total: outcome.total,
    }))
}


#[cfg(test)]
mod engine_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        rule::{
            db::create_rule,
            models::{RuleActions, RuleConditions, RuleDraft, RuleKind},
        },
        transaction::{Transaction, create_transaction, get_transaction, get_transactions},
    };

    use super::{apply_rules, preview_rules};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn create_food_rule(connection: &Connection) {
        create_rule(
            RuleDraft {
                name: "Food Delivery".to_owned(),
                kind: RuleKind::Merchant,
                priority: Some(1),
                conditions: RuleConditions {
                    merchant_contains: Some("swiggy, zomato".to_owned()),
                    ..Default::default()
                },
                actions: RuleActions {
                    scope: "personal".to_owned(),
                    category: vec!["food".to_owned()],
                },
                ..Default::default()
            },
            connection,
        )
        .expect("Could not create test rule");
    }

    #[test]
    fn preview_reports_changes_without_mutating() {
        let connection = get_test_db_connection();
        let today = date!(2026 - 07 - 14);
        create_food_rule(&connection);

        let transaction = create_transaction(
            Transaction::build(149.0, today, "SWIGGY BANGALORE"),
            &connection,
        )
        .unwrap();

        let report = preview_rules(false, &connection).unwrap();

        assert_eq!(report.count, 1);
        assert_eq!(report.matches[0].transaction_id, transaction.id);
        assert_eq!(report.matches[0].current_scope, "unknown");
        assert_eq!(report.matches[0].new_scope, "personal");
        assert_eq!(report.matches[0].new_category, vec!["food".to_owned()]);
        assert_eq!(report.matches[0].rule_name, "Food Delivery");

        // The store is untouched.
        let unchanged = get_transaction(transaction.id, &connection).unwrap();
        assert_eq!(unchanged, transaction);

        // Running the preview again yields an identical report.
        assert_eq!(preview_rules(false, &connection).unwrap(), report);
    }

    #[test]
    fn preview_drops_no_op_matches() {
        let connection = get_test_db_connection();
        let today = date!(2026 - 07 - 14);
        create_food_rule(&connection);

        // Already tagged exactly as the rule would tag it.
        create_transaction(
            Transaction::build(149.0, today, "SWIGGY BANGALORE")
                .scope("personal")
                .category(&["food"]),
            &connection,
        )
        .unwrap();

        let report = preview_rules(false, &connection).unwrap();

        assert_eq!(report.count, 0);
        assert!(report.matches.is_empty());
    }

    #[test]
    fn unmatched_transactions_are_not_errors() {
        let connection = get_test_db_connection();
        let today = date!(2026 - 07 - 14);
        create_food_rule(&connection);

        create_transaction(Transaction::build(800.0, today, "GAS STATION"), &connection).unwrap();

        let report = preview_rules(false, &connection).unwrap();

        assert_eq!(report.count, 0);
    }

    #[test]
    fn apply_writes_tags_and_counts_candidates() {
        let connection = get_test_db_connection();
        let today = date!(2026 - 07 - 14);
        create_food_rule(&connection);

        let matching = create_transaction(
            Transaction::build(149.0, today, "SWIGGY BANGALORE"),
            &connection,
        )
        .unwrap();
        create_transaction(Transaction::build(800.0, today, "GAS STATION"), &connection).unwrap();

        let outcome = apply_rules(false, &connection).unwrap();

        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.total, 2);

        let tagged = get_transaction(matching.id, &connection).unwrap();
        assert_eq!(tagged.scope, "personal");
        assert_eq!(tagged.category, vec!["food".to_owned()]);
        assert!(tagged.reviewed);
    }

    #[test]
    fn apply_is_idempotent() {
        let connection = get_test_db_connection();
        let today = date!(2026 - 07 - 14);
        create_food_rule(&connection);

        create_transaction(
            Transaction::build(149.0, today, "SWIGGY BANGALORE"),
            &connection,
        )
        .unwrap();
        create_transaction(Transaction::build(75.0, today, "ZOMATO ORDER"), &connection).unwrap();

        let first = apply_rules(false, &connection).unwrap();
        assert_eq!(first.updated, 2);

        let second = apply_rules(false, &connection).unwrap();
        assert_eq!(second.updated, 0);
        assert_eq!(second.total, first.total);
    }

    #[test]
    fn preview_and_apply_agree() {
        let connection = get_test_db_connection();
        let today = date!(2026 - 07 - 14);
        create_food_rule(&connection);

        create_transaction(
            Transaction::build(149.0, today, "SWIGGY BANGALORE"),
            &connection,
        )
        .unwrap();
        create_transaction(Transaction::build(75.0, today, "ZOMATO ORDER"), &connection).unwrap();
        create_transaction(Transaction::build(800.0, today, "GAS STATION"), &connection).unwrap();

        let report = preview_rules(false, &connection).unwrap();
        let previewed_ids: Vec<_> = report
            .matches
            .iter()
            .map(|change| change.transaction_id)
            .collect();

        let outcome = apply_rules(false, &connection).unwrap();
        assert_eq!(outcome.updated, previewed_ids.len());

        // Exactly the previewed transactions were mutated.
        for transaction in get_transactions(false, &connection).unwrap() {
            if previewed_ids.contains(&transaction.id) {
                assert_eq!(transaction.scope, "personal");
            } else {
                assert_eq!(transaction.scope, "unknown");
            }
        }
    }

    #[test]
    fn reviewed_transactions_are_protected() {
        let connection = get_test_db_connection();
        let today = date!(2026 - 07 - 14);
        create_food_rule(&connection);

        let curated = create_transaction(
            Transaction::build(149.0, today, "SWIGGY BANGALORE")
                .scope("family")
                .category(&["treats"])
                .reviewed(true),
            &connection,
        )
        .unwrap();
        let untouched = create_transaction(
            Transaction::build(75.0, today, "ZOMATO ORDER"),
            &connection,
        )
        .unwrap();

        let report = preview_rules(true, &connection).unwrap();
        assert_eq!(report.count, 1);
        assert_eq!(report.matches[0].transaction_id, untouched.id);

        let outcome = apply_rules(true, &connection).unwrap();
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.total, 1);

        // The curated transaction keeps its hand-assigned tags.
        let still_curated = get_transaction(curated.id, &connection).unwrap();
        assert_eq!(still_curated.scope, "family");
        assert_eq!(still_curated.category, vec!["treats".to_owned()]);
    }

    #[test]
    fn reviewed_transactions_are_retagged_without_the_flag() {
        let connection = get_test_db_connection();
        let today = date!(2026 - 07 - 14);
        create_food_rule(&connection);

        let curated = create_transaction(
            Transaction::build(149.0, today, "SWIGGY BANGALORE")
                .scope("family")
                .category(&["treats"])
                .reviewed(true),
            &connection,
        )
        .unwrap();

        let outcome = apply_rules(false, &connection).unwrap();
        assert_eq!(outcome.updated, 1);

        let retagged = get_transaction(curated.id, &connection).unwrap();
        assert_eq!(retagged.scope, "personal");
        assert_eq!(retagged.category, vec!["food".to_owned()]);
    }

    #[test]
    fn empty_category_action_clears_categories() {
        let connection = get_test_db_connection();
        let today = date!(2026 - 07 - 14);

        create_rule(
            RuleDraft {
                name: "Clear".to_owned(),
                kind: RuleKind::Merchant,
                priority: Some(1),
                conditions: RuleConditions {
                    merchant_contains: Some("internal transfer".to_owned()),
                    ..Default::default()
                },
                actions: RuleActions {
                    scope: "personal".to_owned(),
                    category: Vec::new(),
                },
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        let transaction = create_transaction(
            Transaction::build(500.0, today, "INTERNAL TRANSFER").category(&["unknown"]),
            &connection,
        )
        .unwrap();

        let outcome = apply_rules(false, &connection).unwrap();
        assert_eq!(outcome.updated, 1);

        let cleared = get_transaction(transaction.id, &connection).unwrap();
        assert!(cleared.category.is_empty());
    }

    #[test]
    fn no_rules_updates_nothing() {
        let connection = get_test_db_connection();
        let today = date!(2026 - 07 - 14);

        create_transaction(Transaction::build(149.0, today, "SWIGGY"), &connection).unwrap();

        let outcome = apply_rules(false, &connection).unwrap();

        assert_eq!(outcome.updated, 0);
        assert_eq!(outcome.total, 1);
    }
}
