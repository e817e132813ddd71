//! Shared fixtures for the end-to-end advisor tests.

use std::sync::Arc;

use finch_agents::FinanceAdvisor;
use finch_core::{UserProfile, UserType};
use finch_observability::AppMetrics;

pub fn profile(user_type: &str, age: i32, income: f64, goals: &[&str]) -> UserProfile {
    UserProfile::new(
        UserType::parse(user_type),
        age,
        income,
        goals.iter().map(|goal| goal.to_string()).collect(),
    )
}

pub fn seeded_advisor(seed: u64) -> (FinanceAdvisor, Arc<AppMetrics>) {
    let metrics = AppMetrics::shared();
    (FinanceAdvisor::with_builtin(metrics.clone(), Some(seed)), metrics)
}
