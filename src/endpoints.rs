//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/rules/{rule_id}', use [format_endpoint].

/// The route to list and create rules.
pub const RULES: &str = "/api/rules";
/// The route to update or delete a single rule.
pub const RULE: &str = "/api/rules/{rule_id}";
/// The route to flip a rule's enabled flag.
pub const TOGGLE_RULE: &str = "/api/rules/{rule_id}/toggle";
/// The route to fetch the canonical default rule set.
pub const RULE_DEFAULTS: &str = "/api/rules/defaults";
/// The route to reset rules to the default set (replace or merge).
pub const RESET_RULES: &str = "/api/rules/reset";
/// The route to reassign rule priorities from an ordered list of rule IDs.
pub const REORDER_RULES: &str = "/api/rules/reorder";
/// The route to compute proposed changes without applying them.
pub const PREVIEW_RULES: &str = "/api/rules/preview";
/// The route to apply rules to the transaction store.
pub const APPLY_RULES: &str = "/api/rules/apply";
/// The route to test a synthetic transaction against the rule set.
pub const TEST_RULE: &str = "/api/rules/test";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to manually set a transaction's scope and categories.
pub const TRANSACTION_TAGS: &str = "/api/transactions/{transaction_id}/tags";
/// The route reporting service health and store counts.
pub const HEALTH: &str = "/api/health";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/rules/{rule_id}', '{rule_id}' is
/// the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
