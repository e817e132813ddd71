use tracing::debug;

use crate::models::Intent;

/// Trigger phrases per intent. Declaration order is the precedence order
/// when a message matches more than one intent ("401k" resolves to
/// investing, "credit card" to debt).
pub const INTENT_TAXONOMY: &[(Intent, &[&str])] = &[
    (
        Intent::Savings,
        &[
            "save",
            "saving",
            "savings",
            "emergency fund",
            "money aside",
            "rainy day",
        ],
    ),
    (
        Intent::Budgeting,
        &[
            "budget",
            "budgeting",
            "expenses",
            "spending",
            "track money",
            "allocate",
        ],
    ),
    (
        Intent::Investing,
        &[
            "invest",
            "investing",
            "investment",
            "stocks",
            "portfolio",
            "401k",
            "ira",
            "mutual fund",
            "etf",
        ],
    ),
    (
        Intent::Debt,
        &[
            "debt",
            "loan",
            "credit card",
            "pay off",
            "owe",
            "mortgage",
            "student loan",
        ],
    ),
    (
        Intent::Retirement,
        &[
            "retirement",
            "retire",
            "pension",
            "401k",
            "403b",
            "roth",
            "traditional ira",
        ],
    ),
    (
        Intent::Credit,
        &["credit score", "credit report", "credit card", "credit history"],
    ),
    (
        Intent::Taxes,
        &["tax", "taxes", "deduction", "refund", "irs", "filing"],
    ),
];

pub fn classify_intent(message: &str) -> Intent {
    let lower = message.to_lowercase();

    let intent = INTENT_TAXONOMY
        .iter()
        .find(|(_, phrases)| contains_any(&lower, phrases))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::General);

    debug!(intent = %intent, "message classified");
    intent
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}
