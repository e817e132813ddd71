use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AdviceError;

/// The goals offered to users when they fill in their profile.
pub const KNOWN_GOALS: &[&str] = &[
    "Build Emergency Fund",
    "Pay Off Debt",
    "Save for House",
    "Retirement Planning",
    "Start Investing",
    "Improve Credit Score",
    "Budget Better",
    "Tax Planning",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserType {
    Student,
    WorkingProfessional,
    RecentGraduate,
    Entrepreneur,
    Retiree,
    Other(CustomUserType),
}

/// A user type outside the known set. Only [`UserType::parse`] builds one,
/// so it never carries a known label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomUserType(String);

impl CustomUserType {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl UserType {
    /// Accepts the canonical lowercase labels as well as display labels in
    /// any case ("Working Professional"). Anything else is kept verbatim as
    /// [`UserType::Other`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "student" => Self::Student,
            "working professional" => Self::WorkingProfessional,
            "recent graduate" => Self::RecentGraduate,
            "entrepreneur" => Self::Entrepreneur,
            "retiree" => Self::Retiree,
            _ => Self::Other(CustomUserType(value.to_string())),
        }
    }

    /// Knowledge-base key for this user type.
    pub fn label(&self) -> &str {
        match self {
            Self::Student => "student",
            Self::WorkingProfessional => "working professional",
            Self::RecentGraduate => "recent graduate",
            Self::Entrepreneur => "entrepreneur",
            Self::Retiree => "retiree",
            Self::Other(custom) => custom.as_str(),
        }
    }
}

impl Default for UserType {
    fn default() -> Self {
        Self::Student
    }
}

impl From<String> for UserType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<UserType> for String {
    fn from(value: UserType) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Caller-supplied description of the user. Income is monthly; `0` means
/// the user did not say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "type", default)]
    pub user_type: UserType,
    #[serde(default = "default_age")]
    pub age: i32,
    #[serde(default)]
    pub income: f64,
    #[serde(default)]
    pub goals: Vec<String>,
}

fn default_age() -> i32 {
    25
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            user_type: UserType::default(),
            age: default_age(),
            income: 0.0,
            goals: Vec::new(),
        }
    }
}

impl UserProfile {
    pub fn new(user_type: UserType, age: i32, income: f64, goals: Vec<String>) -> Self {
        Self {
            user_type,
            age,
            income,
            goals,
        }
    }

    pub fn has_goal(&self, goal: &str) -> bool {
        self.goals.iter().any(|g| g == goal)
    }

    /// Rejects profiles that would produce nonsensical band text.
    pub fn validate(&self) -> Result<(), AdviceError> {
        if self.age < 0 {
            return Err(AdviceError::InvalidProfile(format!(
                "age must be non-negative, got {}",
                self.age
            )));
        }
        if !self.income.is_finite() || self.income < 0.0 {
            return Err(AdviceError::InvalidProfile(format!(
                "income must be a non-negative amount, got {}",
                self.income
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Savings,
    Budgeting,
    Investing,
    Debt,
    Retirement,
    Credit,
    Taxes,
    General,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Budgeting => "budgeting",
            Self::Investing => "investing",
            Self::Debt => "debt",
            Self::Retirement => "retirement",
            Self::Credit => "credit",
            Self::Taxes => "taxes",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Income bands used for savings targets, half-open `[lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomeBand {
    Starter,
    Middle,
    High,
}

impl IncomeBand {
    /// `None` when income is unspecified (zero).
    pub fn from_income(income: f64) -> Option<Self> {
        if income <= 0.0 {
            None
        } else if income < 3000.0 {
            Some(Self::Starter)
        } else if income < 6000.0 {
            Some(Self::Middle)
        } else {
            Some(Self::High)
        }
    }
}

/// Age bands for investment allocation, half-open `[lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationBand {
    Aggressive,
    Balanced,
    Conservative,
}

impl AllocationBand {
    pub fn from_age(age: i32) -> Self {
        match age {
            a if a < 30 => Self::Aggressive,
            a if a < 50 => Self::Balanced,
            _ => Self::Conservative,
        }
    }
}

/// Age bands for retirement advice, half-open `[lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetirementBand {
    Twenties,
    Thirties,
    Forties,
}

impl RetirementBand {
    pub fn from_age(age: i32) -> Self {
        match age {
            a if a < 30 => Self::Twenties,
            a if a < 40 => Self::Thirties,
            _ => Self::Forties,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Twenties => "20s",
            Self::Thirties => "30s",
            Self::Forties => "40s",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplyRoute {
    QuickResponse { keyword: String },
    Advice { intent: Intent },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorReply {
    pub text: String,
    pub route: ReplyRoute,
}
