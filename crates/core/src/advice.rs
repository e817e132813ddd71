use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::AdviceError;
use crate::knowledge::{Category, KnowledgeBase};
use crate::models::{AllocationBand, IncomeBand, Intent, RetirementBand, UserProfile, UserType};

pub const PARAGRAPH_BREAK: &str = "\n\n";

const BUDGET_GOAL: &str = "Budget Better";

/// Picks one advice entry per intent and appends profile-derived notes.
#[derive(Debug, Clone, Copy)]
pub struct AdviceSelector<'kb> {
    kb: &'kb KnowledgeBase,
}

impl<'kb> AdviceSelector<'kb> {
    pub fn new(kb: &'kb KnowledgeBase) -> Self {
        Self { kb }
    }

    pub fn select<R>(
        &self,
        intent: Intent,
        profile: &UserProfile,
        rng: &mut R,
    ) -> Result<String, AdviceError>
    where
        R: Rng + ?Sized,
    {
        profile.validate()?;

        match intent {
            Intent::Savings => self.savings(profile, rng),
            Intent::Budgeting => self.budgeting(profile, rng),
            Intent::Investing => self.investing(profile, rng),
            Intent::Debt => self.debt(profile, rng),
            Intent::Retirement => self.retirement(profile, rng),
            Intent::Credit | Intent::Taxes | Intent::General => {
                pick(self.kb.general_tips(), "general_tips", rng)
            }
        }
    }

    fn savings<R: Rng + ?Sized>(
        &self,
        profile: &UserProfile,
        rng: &mut R,
    ) -> Result<String, AdviceError> {
        let mut advice = self.pick_for(Category::Savings, profile.user_type.label(), rng)?;

        if let Some(band) = IncomeBand::from_income(profile.income) {
            let income = format_dollars(profile.income);
            let note = match band {
                IncomeBand::Starter => format!(
                    "💡 With your current income of ${income}/month, start by saving just $50-100 monthly. Small amounts build great habits!"
                ),
                IncomeBand::Middle => format!(
                    "💡 With ${income}/month income, try to save $300-600 monthly (10-20% of income)."
                ),
                IncomeBand::High => format!(
                    "💡 With ${income}/month income, aim for saving $1,000+ monthly if possible."
                ),
            };
            append_paragraph(&mut advice, &note);
        }

        Ok(advice)
    }

    fn budgeting<R: Rng + ?Sized>(
        &self,
        profile: &UserProfile,
        rng: &mut R,
    ) -> Result<String, AdviceError> {
        let mut advice = self.pick_for(Category::Budgeting, profile.user_type.label(), rng)?;

        if profile.has_goal(BUDGET_GOAL) {
            append_paragraph(
                &mut advice,
                "🎯 Since budgeting is one of your goals, try the 50/30/20 rule as a starting point, then adjust based on your specific needs.",
            );
        }

        Ok(advice)
    }

    fn investing<R: Rng + ?Sized>(
        &self,
        profile: &UserProfile,
        rng: &mut R,
    ) -> Result<String, AdviceError> {
        let mut advice = self.pick_for(Category::Investing, profile.user_type.label(), rng)?;

        let note = match AllocationBand::from_age(profile.age) {
            AllocationBand::Aggressive => "📈 At your age, you can afford to take more risk for potentially higher returns. Consider 80-90% stocks, 10-20% bonds.",
            AllocationBand::Balanced => "⚖️ Consider a balanced approach - maybe 70-80% stocks, 20-30% bonds as you're building wealth.",
            AllocationBand::Conservative => "🛡️ As you're closer to retirement, consider gradually shifting to more conservative investments.",
        };
        append_paragraph(&mut advice, note);

        Ok(advice)
    }

    fn debt<R: Rng + ?Sized>(
        &self,
        profile: &UserProfile,
        rng: &mut R,
    ) -> Result<String, AdviceError> {
        let mut advice = self.pick_for(Category::Debt, Category::Debt.fallback_key(), rng)?;

        if matches!(
            profile.user_type,
            UserType::Student | UserType::RecentGraduate
        ) {
            let student = self.pick_for(Category::Debt, "student", rng)?;
            append_paragraph(&mut advice, &student);
        }

        Ok(advice)
    }

    fn retirement<R: Rng + ?Sized>(
        &self,
        profile: &UserProfile,
        rng: &mut R,
    ) -> Result<String, AdviceError> {
        let band = RetirementBand::from_age(profile.age);
        self.pick_for(Category::Retirement, band.label(), rng)
    }

    fn pick_for<R: Rng + ?Sized>(
        &self,
        category: Category,
        key: &str,
        rng: &mut R,
    ) -> Result<String, AdviceError> {
        pick(self.kb.advice(category, key), category.as_str(), rng)
    }
}

fn pick<R: Rng + ?Sized>(
    entries: &[String],
    source: &str,
    rng: &mut R,
) -> Result<String, AdviceError> {
    entries
        .choose(rng)
        .cloned()
        .ok_or_else(|| AdviceError::InvalidKnowledgeBase(format!("no advice entries for {source}")))
}

fn append_paragraph(text: &mut String, paragraph: &str) {
    text.push_str(PARAGRAPH_BREAK);
    text.push_str(paragraph);
}

/// Whole-dollar amounts with thousands separators (`4,500`); fractional
/// amounts keep two decimals (`4,500.50`). Positive amounts below a cent
/// are printed at full precision rather than as `0`.
pub fn format_dollars(amount: f64) -> String {
    let mut rendered = format!("{amount:.2}");
    if amount > 0.0 && rendered == "0.00" {
        rendered = amount.to_string();
    }

    let (whole, fraction) = rendered
        .split_once('.')
        .unwrap_or((rendered.as_str(), ""));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if fraction.bytes().all(|digit| digit == b'0') {
        grouped
    } else {
        format!("{grouped}.{fraction}")
    }
}
