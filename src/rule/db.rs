//! Database access for auto-tagging rules.

use rusqlite::{Connection, Row, types::Type};

use crate::{
    Error,
    rule::models::{Rule, RuleDraft, RuleId, RulePatch},
};

const RULE_COLUMNS: &str = "id, name, kind, enabled, priority, amount_min, amount_max, \
     merchant_contains, merchant_exact, direction, scope, category, default_key";

/// The name given to rules created with a blank name.
pub(super) const UNNAMED_RULE: &str = "Unnamed Rule";

/// Create a rule in the database from a user-supplied draft.
///
/// Blank names become "Unnamed Rule". An unset priority is stored as NULL
/// and sorts after every explicit priority at match time.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn create_rule(draft: RuleDraft, connection: &Connection) -> Result<Rule, Error> {
    insert_rule(draft, None, connection)
}

/// Insert a rule, optionally tagging it as a seeded default.
///
/// `default_key` is the stable identifier the merge-mode reset uses to
/// detect defaults that are already installed; user-created rules carry
/// none.
pub(super) fn insert_rule(
    draft: RuleDraft,
    default_key: Option<&str>,
    connection: &Connection,
) -> Result<Rule, Error> {
    let name = if draft.name.trim().is_empty() {
        UNNAMED_RULE.to_owned()
    } else {
        draft.name.trim().to_owned()
    };

    connection.execute(
        "INSERT INTO rule (name, kind, enabled, priority, amount_min, amount_max, \
         merchant_contains, merchant_exact, direction, scope, category, default_key)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
        (
            &name,
            draft.kind,
            draft.enabled,
            draft.priority,
            draft.conditions.amount_min,
            draft.conditions.amount_max,
            &draft.conditions.merchant_contains,
            &draft.conditions.merchant_exact,
            draft.conditions.direction,
            &draft.actions.scope,
            category_to_json(&draft.actions.category)?,
            default_key,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Rule {
        id,
        name,
        kind: draft.kind,
        enabled: draft.enabled,
        priority: draft.priority,
        conditions: draft.conditions,
        actions: draft.actions,
        default_key: default_key.map(|key| key.to_owned()),
    })
}

/// Retrieve a rule in the database by `rule_id`.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub(super) fn get_rule(rule_id: RuleId, connection: &Connection) -> Result<Rule, Error> {
    connection
        .prepare(&format!("SELECT {RULE_COLUMNS} FROM rule WHERE id = :id;"))?
        .query_row(&[(":id", &rule_id)], map_rule_row)
        .map_err(|error| error.into())
}

/// Retrieve all rules in the database in insertion order.
///
/// Insertion order is the tie-break order for rules with equal priority; the
/// matcher performs its own stable sort by priority, so the store never
/// orders by priority itself.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_all_rules(connection: &Connection) -> Result<Vec<Rule>, Error> {
    connection
        .prepare(&format!("SELECT {RULE_COLUMNS} FROM rule ORDER BY id ASC;"))?
        .query_map([], map_rule_row)?
        .map(|maybe_rule| maybe_rule.map_err(|error| error.into()))
        .collect()
}

/// Apply a partial update to a rule in the database.
///
/// Fields absent from the patch are left unchanged; a present `conditions`
/// or `actions` replaces that whole group.
///
/// # Errors
/// This function will return an error if there is an SQL error or if the rule doesn't exist.
pub(super) fn update_rule(
    rule_id: RuleId,
    patch: RulePatch,
    connection: &Connection,
) -> Result<Rule, Error> {
    let mut rule = get_rule(rule_id, connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingRule,
        error => error,
    })?;

    if let Some(name) = patch.name {
        rule.name = if name.trim().is_empty() {
            UNNAMED_RULE.to_owned()
        } else {
            name.trim().to_owned()
        };
    }
    if let Some(kind) = patch.kind {
        rule.kind = kind;
    }
    if let Some(enabled) = patch.enabled {
        rule.enabled = enabled;
    }
    if let Some(priority) = patch.priority {
        rule.priority = Some(priority);
    }
    if let Some(conditions) = patch.conditions {
        rule.conditions = conditions;
    }
    if let Some(actions) = patch.actions {
        rule.actions = actions;
    }

    connection.execute(
        "UPDATE rule SET name = ?1, kind = ?2, enabled = ?3, priority = ?4, amount_min = ?5, \
         amount_max = ?6, merchant_contains = ?7, merchant_exact = ?8, direction = ?9, \
         scope = ?10, category = ?11 WHERE id = ?12",
        (
            &rule.name,
            rule.kind,
            rule.enabled,
            rule.priority,
            rule.conditions.amount_min,
            rule.conditions.amount_max,
            &rule.conditions.merchant_contains,
            &rule.conditions.merchant_exact,
            rule.conditions.direction,
            &rule.actions.scope,
            category_to_json(&rule.actions.category)?,
            rule_id,
        ),
    )?;

    Ok(rule)
}

/// Flip a rule's enabled flag.
///
/// # Errors
/// This function will return an error if there is an SQL error or if the rule doesn't exist.
pub(super) fn toggle_rule(rule_id: RuleId, connection: &Connection) -> Result<Rule, Error> {
    let rows_affected = connection.execute(
        "UPDATE rule SET enabled = NOT enabled WHERE id = ?1",
        [rule_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingRule);
    }

    get_rule(rule_id, connection)
}

/// Delete a rule from the database.
///
/// # Errors
/// This function will return an error if there is an SQL error or if the rule doesn't exist.
pub(super) fn delete_rule(rule_id: RuleId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM rule WHERE id = ?1", [rule_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingRule);
    }

    Ok(())
}

/// Create the rule table in the database.
pub fn create_rule_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS rule (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                enabled INTEGER NOT NULL DEFAULT 1,
                priority INTEGER,
                amount_min REAL,
                amount_max REAL,
                merchant_contains TEXT,
                merchant_exact TEXT,
                direction TEXT,
                scope TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL DEFAULT '[]',
                default_key TEXT
            );",
        (),
    )?;

    // Improve performance when the matcher sorts by priority
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_rule_priority ON rule(priority)",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('rule', 0)",
        (),
    )?;

    Ok(())
}

fn category_to_json(category: &[String]) -> Result<String, Error> {
    serde_json::to_string(category)
        .map_err(|error| Error::JsonSerializationError(error.to_string()))
}

fn map_rule_row(row: &Row) -> Result<Rule, rusqlite::Error> {
    use crate::rule::models::{RuleActions, RuleConditions};

    let raw_category: String = row.get(11)?;
    let category = serde_json::from_str(&raw_category).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(error))
    })?;

    Ok(Rule {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        enabled: row.get(3)?,
        priority: row.get(4)?,
        conditions: RuleConditions {
            amount_min: row.get(5)?,
            amount_max: row.get(6)?,
            merchant_contains: row.get(7)?,
            merchant_exact: row.get(8)?,
            direction: row.get(9)?,
        },
        actions: RuleActions {
            scope: row.get(10)?,
            category,
        },
        default_key: row.get(12)?,
    })
}

#[cfg(test)]
mod rule_db_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        rule::models::{RuleActions, RuleConditions, RuleDraft, RuleKind, RulePatch},
        transaction::Direction,
    };

    use super::{UNNAMED_RULE, create_rule, delete_rule, get_all_rules, get_rule, toggle_rule, update_rule};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn swiggy_draft() -> RuleDraft {
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
        }
    }

    #[test]
    fn create_rule_succeeds() {
        let connection = get_test_db_connection();

        let rule = create_rule(swiggy_draft(), &connection).expect("Could not create rule");

        assert!(rule.id > 0);
        assert_eq!(rule.name, "Food Delivery");
        assert_eq!(rule.kind, RuleKind::Merchant);
        assert!(rule.enabled);
        assert_eq!(rule.priority, Some(1));
        assert_eq!(
            rule.conditions.merchant_contains.as_deref(),
            Some("swiggy, zomato")
        );
        assert_eq!(rule.actions.category, vec!["food".to_owned()]);
        assert_eq!(rule.default_key, None);
    }

    #[test]
    fn blank_name_defaults_to_unnamed_rule() {
        let connection = get_test_db_connection();

        let rule = create_rule(
            RuleDraft {
                name: "   ".to_owned(),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        assert_eq!(rule.name, UNNAMED_RULE);
    }

    #[test]
    fn get_rule_round_trips() {
        let connection = get_test_db_connection();

        let inserted = create_rule(
            RuleDraft {
                name: "Splits".to_owned(),
                kind: RuleKind::Combined,
                priority: Some(10),
                conditions: RuleConditions {
                    amount_min: Some(1.0),
                    amount_max: Some(2000.0),
                    direction: Some(Direction::Credit),
                    ..Default::default()
                },
                actions: RuleActions {
                    scope: "personal".to_owned(),
                    category: vec!["splits".to_owned()],
                },
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        let selected = get_rule(inserted.id, &connection).unwrap();

        assert_eq!(inserted, selected);
    }

    #[test]
    fn get_rule_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let result = get_rule(999, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_all_rules_returns_insertion_order() {
        let connection = get_test_db_connection();

        // Priorities deliberately out of insertion order.
        let first = create_rule(
            RuleDraft {
                name: "Second by priority".to_owned(),
                priority: Some(2),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();
        let second = create_rule(
            RuleDraft {
                name: "First by priority".to_owned(),
                priority: Some(1),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        let rules = get_all_rules(&connection).unwrap();

        assert_eq!(
            rules.iter().map(|rule| rule.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
    }

    #[test]
    fn update_rule_applies_partial_patch() {
        let connection = get_test_db_connection();
        let rule = create_rule(swiggy_draft(), &connection).unwrap();

        let updated = update_rule(
            rule.id,
            RulePatch {
                priority: Some(7),
                actions: Some(RuleActions {
                    scope: "family".to_owned(),
                    category: vec!["food".to_owned(), "delivery".to_owned()],
                }),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        // Patched fields change, everything else is untouched.
        assert_eq!(updated.priority, Some(7));
        assert_eq!(updated.actions.scope, "family");
        assert_eq!(updated.name, rule.name);
        assert_eq!(updated.conditions, rule.conditions);

        let selected = get_rule(rule.id, &connection).unwrap();
        assert_eq!(selected, updated);
    }

    #[test]
    fn update_rule_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let result = update_rule(999, RulePatch::default(), &connection);

        assert_eq!(result, Err(Error::UpdateMissingRule));
    }

    #[test]
    fn toggle_rule_flips_enabled() {
        let connection = get_test_db_connection();
        let rule = create_rule(swiggy_draft(), &connection).unwrap();
        assert!(rule.enabled);

        let toggled = toggle_rule(rule.id, &connection).unwrap();
        assert!(!toggled.enabled);

        let toggled_back = toggle_rule(rule.id, &connection).unwrap();
        assert!(toggled_back.enabled);
    }

    #[test]
    fn toggle_rule_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let result = toggle_rule(999, &connection);

        assert_eq!(result, Err(Error::UpdateMissingRule));
    }

    #[test]
    fn delete_rule_succeeds() {
        let connection = get_test_db_connection();
        let rule = create_rule(swiggy_draft(), &connection).unwrap();

        delete_rule(rule.id, &connection).expect("Could not delete rule");

        assert_eq!(get_rule(rule.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_rule_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let result = delete_rule(999, &connection);

        assert_eq!(result, Err(Error::DeleteMissingRule));
    }
}
