//! Condition evaluation and rule matching.
//!
//! These are pure functions with no I/O. The preview engine, the apply
//! engine, and the interactive rule tester all call [find_match]; there is
//! exactly one evaluation implementation so the tester can never drift from
//! the authoritative apply path.

use crate::{
    rule::models::{Rule, RuleKind},
    transaction::Transaction,
};

/// Check whether `transaction` meets all of `rule`'s active conditions.
///
/// Condition groups are gated by the rule's kind: amount bounds apply to
/// `amount`/`combined` rules, merchant keywords to `merchant`/`combined`
/// rules, and the direction condition applies whenever present. Absent
/// conditions are vacuously true. All string comparisons are
/// case-insensitive, and the amount bounds are inclusive.
pub fn rule_matches(rule: &Rule, transaction: &Transaction) -> bool {
    let conditions = &rule.conditions;

    if matches!(rule.kind, RuleKind::Amount | RuleKind::Combined) {
        if let Some(amount_min) = conditions.amount_min
            && transaction.amount < amount_min
        {
            return false;
        }
        if let Some(amount_max) = conditions.amount_max
            && transaction.amount > amount_max
        {
            return false;
        }
    }

    if matches!(rule.kind, RuleKind::Merchant | RuleKind::Combined) {
        let counterparty = transaction.counterparty.to_lowercase();

        if let Some(merchant_exact) = &conditions.merchant_exact {
            let keywords = split_keywords(merchant_exact);
            if !keywords.is_empty() && !keywords.iter().any(|keyword| counterparty == *keyword) {
                return false;
            }
        }

        if let Some(merchant_contains) = &conditions.merchant_contains {
            let keywords = split_keywords(merchant_contains);
            if !keywords.is_empty()
                && !keywords
                    .iter()
                    .any(|keyword| counterparty.contains(keyword.as_str()))
            {
                return false;
            }
        }
    }

    if let Some(direction) = conditions.direction
        && transaction.direction != direction
    {
        return false;
    }

    true
}

/// Find the rule that wins for `transaction`, or None if no enabled rule
/// matches.
///
/// Disabled rules are skipped. The remaining rules are evaluated in
/// ascending priority order (unset priorities sort last); the sort is stable,
/// so rules with equal priority keep their insertion order. The first
/// passing rule wins regardless of how specific later rules are; callers
/// express precedence through priority alone.
pub fn find_match<'a>(rules: &'a [Rule], transaction: &Transaction) -> Option<&'a Rule> {
    let mut enabled_rules: Vec<&Rule> = rules.iter().filter(|rule| rule.enabled).collect();
    enabled_rules.sort_by_key(|rule| rule.priority.unwrap_or(i64::MAX));

    enabled_rules
        .into_iter()
        .find(|rule| rule_matches(rule, transaction))
}

/// Split a comma-separated keyword list, trimming and lowercasing each entry
/// and dropping empties.
fn split_keywords(list: &str) -> Vec<String> {
    list.split(',')
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}
