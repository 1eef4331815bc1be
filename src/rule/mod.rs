//! The auto-tagging rule engine.
//!
//! Rules assign a scope and a set of categories to transactions that meet
//! their conditions. Matching is deterministic: enabled rules are evaluated
//! in ascending priority order and the first match wins. The engine exposes
//! a preview (dry run) and an apply path that share one matcher, plus the
//! rule lifecycle endpoints (create, update, toggle, delete, reset,
//! reorder) and an interactive tester.

mod create;
mod db;
mod defaults;
mod delete;
mod edit;
mod engine;
mod list;
mod matcher;
mod models;
mod reorder;
mod reset;
mod tester;

pub use create::create_rule_endpoint;
pub use db::{create_rule, create_rule_table, get_all_rules};
pub use delete::delete_rule_endpoint;
pub use edit::{toggle_rule_endpoint, update_rule_endpoint};
pub use engine::{
    ApplyOutcome, PreviewReport, ProposedChange, apply_rules, apply_rules_endpoint, preview_rules,
    preview_rules_endpoint,
};
pub use list::{get_default_rules_endpoint, get_rules_endpoint};
pub use matcher::{find_match, rule_matches};
pub use models::{
    MatchResult, Rule, RuleActions, RuleConditions, RuleDraft, RuleId, RuleKind, RulePatch,
    RuleState,
};
pub use reorder::reorder_rules_endpoint;
pub use reset::{ResetMode, reset_rules, reset_rules_endpoint};
pub use tester::test_rule_endpoint;
