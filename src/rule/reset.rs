//! Resetting the rule store to the canonical default set.

use std::collections::HashSet;

use axum::{Json, extract::State};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    rule::{db::insert_rule, defaults::default_rules, models::RuleState},
};

/// How a reset treats existing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetMode {
    /// Delete every rule and install the full default set.
    #[default]
    Replace,
    /// Install only the defaults that are missing, leaving user rules
    /// untouched.
    Merge,
}

/// The request body for the reset endpoint.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ResetRequest {
    /// How to treat existing rules; defaults to replace.
    #[serde(default)]
    pub mode: ResetMode,
}

/// The response body for the reset endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    /// Always true on success.
    pub ok: bool,
    /// The mode that was applied.
    pub mode: ResetMode,
    /// The number of rules in the store after the reset.
    pub count: usize,
}

/// Reset the rule store to the canonical default set.
///
/// `Replace` deletes all existing rules first; `Merge` only installs
/// defaults whose stable key is not already present, so user rules and
/// already-installed (possibly edited) defaults are left untouched.
/// Returns the number of rules in the store afterwards.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn reset_rules(mode: ResetMode, connection: &Connection) -> Result<usize, Error> {
    if mode == ResetMode::Replace {
        connection.execute("DELETE FROM rule", ())?;
    }

    let installed_keys: HashSet<String> = connection
        .prepare("SELECT default_key FROM rule WHERE default_key IS NOT NULL;")?
        .query_map([], |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    for default in default_rules() {
        if !installed_keys.contains(default.key) {
            insert_rule(default.draft, Some(default.key), connection)?;
        }
    }

    let count: i64 = connection.query_row("SELECT COUNT(*) FROM rule", [], |row| row.get(0))?;

    Ok(count as usize)
}

/// A route handler for resetting rules to the default set.
pub async fn reset_rules_endpoint(
    State(state): State<RuleState>,
    Json(request): Json<ResetRequest>,
) -> Result<Json<ResetResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let count = reset_rules(request.mode, &connection)
        .inspect_err(|error| tracing::error!("Failed to reset rules: {error}"))?;

    tracing::info!("Reset rules ({:?} mode): store now holds {count} rules", request.mode);

    Ok(Json(ResetResponse {
        ok: true,
        mode: request.mode,
        count,
    }))
}
