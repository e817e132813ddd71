use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::AdviceError;
use crate::models::UserType;

static BUILTIN: Lazy<KnowledgeBase> = Lazy::new(KnowledgeBase::canonical);

/// Advice categories held by the knowledge base. Retirement is keyed by
/// age-band label, every other category by user-type label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Savings,
    Budgeting,
    Investing,
    Debt,
    Retirement,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::Savings,
        Self::Budgeting,
        Self::Investing,
        Self::Debt,
        Self::Retirement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Budgeting => "budgeting",
            Self::Investing => "investing",
            Self::Debt => "debt",
            Self::Retirement => "retirement",
        }
    }

    /// Key used when the requested key has no entry. Always present in a
    /// validated knowledge base.
    pub fn fallback_key(self) -> &'static str {
        match self {
            Self::Savings | Self::Budgeting | Self::Investing => "student",
            Self::Debt => "general",
            Self::Retirement => "40s",
        }
    }
}

impl FromStr for Category {
    type Err = AdviceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| AdviceError::UnknownCategory(value.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickResponse {
    pub keyword: String,
    pub answer: String,
}

type AdviceTable = BTreeMap<String, Vec<String>>;

/// Read-only advice store. Construct through [`KnowledgeBase::builtin`] or
/// one of the JSON loaders; both guarantee non-empty lists and fallback keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeBase {
    savings: AdviceTable,
    budgeting: AdviceTable,
    investing: AdviceTable,
    debt: AdviceTable,
    retirement: AdviceTable,
    emergency_fund: Vec<String>,
    general_tips: Vec<String>,
    quick_responses: Vec<QuickResponse>,
}

impl KnowledgeBase {
    pub fn builtin() -> &'static KnowledgeBase {
        &BUILTIN
    }

    pub fn from_json_str(raw: &str) -> Result<Self, AdviceError> {
        let kb: Self = serde_json::from_str(raw)
            .map_err(|err| AdviceError::InvalidKnowledgeBase(err.to_string()))?;
        kb.validate()?;
        Ok(kb)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AdviceError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn to_json_pretty(&self) -> Result<String, AdviceError> {
        serde_json::to_string_pretty(self)
            .map_err(|err| AdviceError::InvalidKnowledgeBase(err.to_string()))
    }

    /// Advice list for `key`, or the category's fallback list when `key` is
    /// absent.
    pub fn advice(&self, category: Category, key: &str) -> &[String] {
        let table = self.table(category);
        table
            .get(key)
            .or_else(|| table.get(category.fallback_key()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Keys present in a category, in sorted order.
    pub fn keys(&self, category: Category) -> impl Iterator<Item = &str> {
        self.table(category).keys().map(String::as_str)
    }

    /// First quick response (declaration order) whose keyword occurs in the
    /// lowercased message.
    pub fn quick_response(&self, message: &str) -> Option<&QuickResponse> {
        let lower = message.to_lowercase();
        self.quick_responses
            .iter()
            .find(|entry| lower.contains(entry.keyword.as_str()))
    }

    pub fn quick_responses(&self) -> &[QuickResponse] {
        &self.quick_responses
    }

    pub fn emergency_fund(&self) -> &[String] {
        &self.emergency_fund
    }

    pub fn general_tips(&self) -> &[String] {
        &self.general_tips
    }

    fn table(&self, category: Category) -> &AdviceTable {
        match category {
            Category::Savings => &self.savings,
            Category::Budgeting => &self.budgeting,
            Category::Investing => &self.investing,
            Category::Debt => &self.debt,
            Category::Retirement => &self.retirement,
        }
    }

    fn validate(&self) -> Result<(), AdviceError> {
        for category in Category::ALL {
            let table = self.table(category);
            if !table.contains_key(category.fallback_key()) {
                return Err(AdviceError::InvalidKnowledgeBase(format!(
                    "category '{category}' is missing fallback key '{}'",
                    category.fallback_key()
                )));
            }
            if let Some((key, _)) = table.iter().find(|(_, entries)| entries.is_empty()) {
                return Err(AdviceError::InvalidKnowledgeBase(format!(
                    "category '{category}' has an empty list for '{key}'"
                )));
            }
        }

        if self.emergency_fund.is_empty() {
            return Err(AdviceError::InvalidKnowledgeBase(
                "emergency_fund must not be empty".to_string(),
            ));
        }
        if self.general_tips.is_empty() {
            return Err(AdviceError::InvalidKnowledgeBase(
                "general_tips must not be empty".to_string(),
            ));
        }

        // Messages are lowercased before matching, so keywords must be too.
        if let Some(entry) = self
            .quick_responses
            .iter()
            .find(|entry| entry.keyword.is_empty() || entry.keyword != entry.keyword.to_lowercase())
        {
            return Err(AdviceError::InvalidKnowledgeBase(format!(
                "quick response keyword '{}' must be non-empty and lowercase",
                entry.keyword
            )));
        }

        Ok(())
    }

    fn canonical() -> Self {
        Self {
            savings: table([
                entry(
                    "student",
                    &[
                        "Start with the 50/30/20 rule: 50% for needs, 30% for wants, 20% for savings",
                        "Even saving $25-50 per month as a student builds great habits for the future",
                        "Look for high-yield savings accounts that offer better interest rates",
                        "Use apps like Mint or YNAB (often free for students) to track spending",
                        "Take advantage of student discounts wherever possible to save money",
                    ],
                ),
                entry(
                    "working professional",
                    &[
                        "Aim to save 20-25% of your gross income if possible",
                        "Build an emergency fund covering 6-8 months of expenses first",
                        "Automate your savings so the money is moved before you can spend it",
                        "Consider a high-yield savings account for better returns on emergency funds",
                        "Maximize employer 401(k) matching - it's free money!",
                    ],
                ),
                entry(
                    "recent graduate",
                    &[
                        "Start building an emergency fund, even if it's just $500-1000 initially",
                        "Focus on paying off high-interest debt while building savings gradually",
                        "Look into employer benefits like 401(k) matching right away",
                        "Consider automatic transfers to savings to build the habit",
                        "Don't feel pressure to save huge amounts immediately - consistency matters more",
                    ],
                ),
            ]),
            budgeting: table([
                entry(
                    "student",
                    &[
                        "Track where your money goes for a month to identify spending patterns",
                        "Use free budgeting apps or even a simple spreadsheet to start",
                        "Cook at home more often - dining out adds up quickly",
                        "Look for free entertainment options on campus and in your community",
                        "Consider buying used textbooks or renting them to save money",
                    ],
                ),
                entry(
                    "working professional",
                    &[
                        "Use zero-based budgeting where every dollar has a purpose",
                        "Review and optimize recurring subscriptions quarterly",
                        "Automate bill payments to avoid late fees",
                        "Track net worth monthly, not just expenses",
                        "Plan for annual expenses like insurance, gifts, and vacations",
                    ],
                ),
                entry(
                    "entrepreneur",
                    &[
                        "Keep personal and business finances completely separate",
                        "Plan for irregular income with conservative budgeting",
                        "Set aside money for taxes quarterly if self-employed",
                        "Build a larger emergency fund due to income variability",
                        "Track business expenses carefully for tax deductions",
                    ],
                ),
            ]),
            investing: table([
                entry(
                    "student",
                    &[
                        "Start learning about investing even with small amounts ($25-50/month)",
                        "Consider low-cost index funds for broad market exposure",
                        "Understand that time is your biggest advantage with compound interest",
                        "If you work, take advantage of any employer 401(k) matching",
                        "Focus on learning before investing large amounts",
                    ],
                ),
                entry(
                    "working professional",
                    &[
                        "Diversify across different asset classes (stocks, bonds, real estate)",
                        "Consider low-cost index funds and ETFs for core holdings",
                        "Rebalance your portfolio annually or when allocations drift significantly",
                        "Maximize tax-advantaged accounts (401k, IRA, HSA) first",
                        "Consider target-date funds if you prefer a hands-off approach",
                    ],
                ),
                entry(
                    "retiree",
                    &[
                        "Focus on capital preservation and steady income generation",
                        "Consider a bond ladder or dividend-paying stocks for regular income",
                        "Maintain some stock exposure to protect against inflation",
                        "Plan for healthcare costs which typically increase with age",
                        "Consider working with a fee-only financial advisor for complex decisions",
                    ],
                ),
            ]),
            debt: table([
                entry(
                    "general",
                    &[
                        "List all debts with balances, minimum payments, and interest rates",
                        "Consider the debt snowball (smallest balance first) or avalanche (highest interest first) method",
                        "Make minimum payments on all debts, then extra on your target debt",
                        "Avoid taking on new debt while paying off existing debt",
                        "Consider debt consolidation if it lowers your overall interest rate",
                    ],
                ),
                entry(
                    "student",
                    &[
                        "Focus on high-interest debt (credit cards) before student loans",
                        "Look into income-driven repayment plans for federal student loans if needed",
                        "Consider making interest payments on student loans while in school if possible",
                        "Avoid lifestyle inflation after graduation - use raises for debt payments",
                        "Research loan forgiveness programs if you work in qualifying fields",
                    ],
                ),
            ]),
            retirement: table([
                entry(
                    "20s",
                    &[
                        "Start contributing to employer 401(k), especially if there's matching",
                        "Consider a Roth IRA for tax-free growth if you're in a lower tax bracket",
                        "Aim to save 10-15% of income for retirement",
                        "Focus on growth investments due to long time horizon",
                        "Don't panic about market volatility - you have decades to recover",
                    ],
                ),
                entry(
                    "30s",
                    &[
                        "Increase retirement savings as income grows",
                        "Consider both traditional and Roth retirement accounts for tax diversification",
                        "Review beneficiaries on retirement accounts regularly",
                        "Balance retirement savings with other goals like home buying",
                        "Consider life insurance if you have dependents",
                    ],
                ),
                entry(
                    "40s",
                    &[
                        "Maximize retirement contributions if possible",
                        "Start thinking about catch-up contributions at age 50",
                        "Review investment allocation - may want to reduce risk slightly",
                        "Consider long-term care insurance",
                        "Help kids with college while still prioritizing retirement",
                    ],
                ),
            ]),
            emergency_fund: strings(&[
                "Start with a goal of $500-1000 for initial emergency fund",
                "Gradually build to 3-6 months of expenses (6-8 months for irregular income)",
                "Keep emergency funds in a separate, easily accessible savings account",
                "Don't invest emergency funds - they should be liquid and stable",
                "Replenish the fund immediately after using it for true emergencies",
            ]),
            general_tips: strings(&[
                "💰 Pay yourself first - automate savings so you don't have to think about it.",
                "📊 The best investment is in your financial education. Keep learning!",
                "🎯 Set specific, measurable financial goals and review them regularly.",
                "⏰ Time in the market beats timing the market for long-term investing.",
                "🔄 Compound interest is incredibly powerful - start early and be consistent.",
                "📝 Track your net worth monthly to see your overall financial progress.",
                "🚫 Avoid lifestyle inflation - as income grows, save the difference.",
                "🏦 Build multiple income streams when possible for financial security.",
                "📱 Use technology and apps to automate and simplify your finances.",
                "👥 Don't compare your finances to others - focus on your own goals and progress.",
            ]),
            quick_responses: vec![
                quick(
                    "credit score",
                    "Your credit score affects loan rates and approval. Pay bills on time, keep credit utilization below 30%, don't close old accounts, and check your credit report annually for errors.",
                ),
                quick(
                    "401k",
                    "A 401(k) is an employer-sponsored retirement account. Contribute at least enough to get full employer matching, choose low-cost index funds, and increase contributions with raises.",
                ),
                quick(
                    "roth ira",
                    "A Roth IRA offers tax-free growth and withdrawals in retirement. You contribute after-tax dollars now but pay no taxes later. Great for young people in lower tax brackets.",
                ),
                quick(
                    "emergency fund",
                    "An emergency fund should cover 3-6 months of expenses in a liquid savings account. Start with $500-1000, then gradually build it up.",
                ),
                quick(
                    "index funds",
                    "Index funds are low-cost investments that track market indices like the S&P 500. They offer broad diversification and historically solid returns with minimal fees.",
                ),
            ],
        }
    }
}

/// Short sidebar tips shown next to the profile form.
pub fn quick_tips(user_type: &UserType) -> &'static [&'static str] {
    match user_type {
        UserType::Student => &[
            "Start small with savings",
            "Use student discounts",
            "Learn about compound interest",
        ],
        UserType::WorkingProfessional => &[
            "Maximize 401(k) matching",
            "Build 6-month emergency fund",
            "Consider tax-advantaged accounts",
        ],
        _ => &[],
    }
}

fn table<const N: usize>(entries: [(String, Vec<String>); N]) -> AdviceTable {
    BTreeMap::from(entries)
}

fn entry(key: &str, advice: &[&str]) -> (String, Vec<String>) {
    (key.to_string(), strings(advice))
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn quick(keyword: &str, answer: &str) -> QuickResponse {
    QuickResponse {
        keyword: keyword.to_string(),
        answer: answer.to_string(),
    }
}
