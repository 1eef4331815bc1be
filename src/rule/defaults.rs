//! The canonical default rule set.
//!
//! Lower priority number = higher precedence. Merchant rules come first so
//! that a known merchant always beats the amount-band fallbacks.

use crate::{
    rule::models::{RuleActions, RuleConditions, RuleDraft, RuleKind},
    transaction::Direction,
};

/// A seeded default rule: a draft plus the stable key that identifies it
/// across resets.
#[derive(Debug, Clone)]
pub(super) struct DefaultRule {
    /// Stable identifier; the merge-mode reset skips defaults whose key is
    /// already present in the store.
    pub key: &'static str,
    /// The rule draft to install.
    pub draft: RuleDraft,
}

fn merchant_rule(
    key: &'static str,
    name: &str,
    priority: i64,
    keywords: &str,
    scope: &str,
    category: &str,
) -> DefaultRule {
    DefaultRule {
        key,
        draft: RuleDraft {
            name: name.to_owned(),
            kind: RuleKind::Merchant,
            priority: Some(priority),
            conditions: RuleConditions {
                merchant_contains: Some(keywords.to_owned()),
                ..Default::default()
            },
            actions: RuleActions {
                scope: scope.to_owned(),
                category: vec![category.to_owned()],
            },
            ..Default::default()
        },
    }
}

fn amount_rule(
    key: &'static str,
    name: &str,
    kind: RuleKind,
    priority: i64,
    amount_min: f64,
    amount_max: Option<f64>,
    direction: Direction,
    category: &str,
) -> DefaultRule {
    DefaultRule {
        key,
        draft: RuleDraft {
            name: name.to_owned(),
            kind,
            priority: Some(priority),
            conditions: RuleConditions {
                amount_min: Some(amount_min),
                amount_max,
                direction: Some(direction),
                ..Default::default()
            },
            actions: RuleActions {
                scope: "personal".to_owned(),
                category: vec![category.to_owned()],
            },
            ..Default::default()
        },
    }
}

/// The canonical default rule set installed by a reset.
pub(super) fn default_rules() -> Vec<DefaultRule> {
    vec![
        // Merchant rules: known merchants take precedence over everything.
        merchant_rule(
            "default_food_delivery",
            "Food Delivery",
            1,
            "swiggy, zomato, uber eats, dunzo",
            "personal",
            "food",
        ),
        merchant_rule(
            "default_yulu",
            "Yulu Bikes",
            2,
            "yulu",
            "personal",
            "commute",
        ),
        merchant_rule(
            "default_cab_apps",
            "Cab/Auto Apps",
            3,
            "rapido, ola, uber, namma yatri",
            "personal",
            "cab",
        ),
        merchant_rule(
            "default_online_shopping",
            "Online Shopping",
            4,
            "amazon, amzn, flipkart, myntra, blinkit, meesho",
            "personal",
            "shopping",
        ),
        merchant_rule(
            "default_groceries",
            "Groceries",
            5,
            "bigbasket, zepto, instamart, jiomart",
            "personal",
            "groceries",
        ),
        merchant_rule(
            "default_electricity",
            "Electricity",
            6,
            "bescom, electricity, power",
            "family",
            "utilities",
        ),
        merchant_rule(
            "default_mobile_recharge",
            "Mobile Recharge",
            7,
            "airtel, jio, vi, vodafone, bsnl, recharge",
            "personal",
            "recharge",
        ),
        // Credit rules: categorize incoming money by size.
        amount_rule(
            "default_split_refund",
            "Split/Refund",
            RuleKind::Combined,
            10,
            1.0,
            Some(2000.0),
            Direction::Credit,
            "splits",
        ),
        amount_rule(
            "default_deposit",
            "Deposit/Income",
            RuleKind::Combined,
            11,
            2001.0,
            None,
            Direction::Credit,
            "deposit",
        ),
        // Amount bands: fallbacks for small debits no merchant rule caught.
        amount_rule(
            "default_noise",
            "Noise",
            RuleKind::Amount,
            20,
            0.0,
            Some(10.0),
            Direction::Debit,
            "noise",
        ),
        amount_rule(
            "default_coffee",
            "Coffee",
            RuleKind::Amount,
            21,
            11.0,
            Some(25.0),
            Direction::Debit,
            "coffee",
        ),
        amount_rule(
            "default_snacks",
            "Snacks",
            RuleKind::Amount,
            22,
            26.0,
            Some(50.0),
            Direction::Debit,
            "snacks",
        ),
        amount_rule(
            "default_daily",
            "Daily",
            RuleKind::Amount,
            23,
            51.0,
            Some(100.0),
            Direction::Debit,
            "daily",
        ),
    ]
}
