//! The auto-tagging rule data model.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::{
    Connection, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{AppState, transaction::Direction};

/// Alias for the integer type used for rule database IDs.
pub type RuleId = i64;

/// Which condition groups a rule evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Only the amount bounds are evaluated.
    #[default]
    Amount,
    /// Only the merchant keyword lists are evaluated.
    Merchant,
    /// Both the amount bounds and the merchant keyword lists are evaluated.
    Combined,
}

impl RuleKind {
    /// The lowercase string form used in the database and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Amount => "amount",
            RuleKind::Merchant => "merchant",
            RuleKind::Combined => "combined",
        }
    }
}

impl ToSql for RuleKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for RuleKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "amount" => Ok(RuleKind::Amount),
            "merchant" => Ok(RuleKind::Merchant),
            "combined" => Ok(RuleKind::Combined),
            other => Err(FromSqlError::Other(
                format!("invalid rule kind {other:?}").into(),
            )),
        }
    }
}

/// The conditions a transaction must meet for a rule to match.
///
/// Every field is optional; absent conditions are vacuously true. Which
/// fields are consulted at all is gated by the rule's [RuleKind], except for
/// `direction` which applies whenever present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleConditions {
    /// Inclusive lower bound on the transaction amount.
    #[serde(
        default,
        deserialize_with = "lenient_bound",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount_min: Option<f64>,

    /// Inclusive upper bound on the transaction amount.
    #[serde(
        default,
        deserialize_with = "lenient_bound",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount_max: Option<f64>,

    /// Comma-separated keywords; matches when the counterparty contains any
    /// of them (case-insensitive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_contains: Option<String>,

    /// Comma-separated keywords; matches when the counterparty equals any of
    /// them exactly (case-insensitive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_exact: Option<String>,

    /// Matches only transactions with this direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

/// The tags a rule assigns to a matching transaction.
///
/// Both fields overwrite the transaction's current values unconditionally:
/// an empty category list clears the transaction's categories.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleActions {
    /// The scope to assign.
    #[serde(default)]
    pub scope: String,
    /// The categories to assign.
    #[serde(default)]
    pub category: Vec<String>,
}

/// A user-defined auto-tagging rule.
///
/// Rules are evaluated in ascending priority order (lower number = higher
/// precedence, ties broken by insertion order) and the first match wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// The ID of the rule.
    pub id: RuleId,
    /// A free-form label for display.
    pub name: String,
    /// Which condition groups this rule evaluates.
    #[serde(rename = "type")]
    pub kind: RuleKind,
    /// Disabled rules are kept in the store but never match.
    pub enabled: bool,
    /// Lower value = higher precedence; unset sorts last.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    /// The conditions a transaction must meet.
    pub conditions: RuleConditions,
    /// The tags assigned on a match.
    pub actions: RuleActions,
    /// Stable identifier carried by seeded default rules, used by the
    /// merge-mode reset to detect defaults that are already installed.
    #[serde(skip)]
    pub(crate) default_key: Option<String>,
}

/// The data needed to create a rule, before an ID has been assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDraft {
    /// A free-form label; blank names become "Unnamed Rule".
    #[serde(default)]
    pub name: String,
    /// Which condition groups the rule evaluates.
    #[serde(rename = "type", default)]
    pub kind: RuleKind,
    /// Whether the rule participates in matching; defaults to true.
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// Lower value = higher precedence; unset sorts last.
    #[serde(default)]
    pub priority: Option<i64>,
    /// The conditions a transaction must meet.
    #[serde(default)]
    pub conditions: RuleConditions,
    /// The tags assigned on a match.
    #[serde(default)]
    pub actions: RuleActions,
}

impl Default for RuleDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: RuleKind::default(),
            enabled: true,
            priority: None,
            conditions: RuleConditions::default(),
            actions: RuleActions::default(),
        }
    }
}

fn enabled_default() -> bool {
    true
}

/// A partial update to an existing rule; absent fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RulePatch {
    /// A new label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// A new rule kind.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RuleKind>,
    /// A new enabled flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// A new priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    /// A full replacement for the rule's conditions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<RuleConditions>,
    /// A full replacement for the rule's actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<RuleActions>,
}

/// The outcome of testing a single transaction against the rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// The ID of the winning rule, or None when no rule matched.
    pub matched_rule_id: Option<RuleId>,
    /// The name of the winning rule, or None when no rule matched.
    pub rule_name: Option<String>,
    /// The scope the transaction would be given.
    pub new_scope: String,
    /// The categories the transaction would be given.
    pub new_category: Vec<String>,
}

/// Unified state for all rule-related operations.
#[derive(Debug, Clone)]
pub struct RuleState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RuleState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Deserialize an amount bound, dropping values that cannot be read as a
/// number instead of rejecting the whole rule.
fn lenient_bound<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(value.and_then(|value| match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }))
}
