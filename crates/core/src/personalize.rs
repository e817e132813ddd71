use crate::advice::PARAGRAPH_BREAK;
use crate::models::{UserProfile, UserType};

/// Profile-derived framing around a piece of advice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Personalization {
    pub prefix: &'static str,
    pub suffix: Option<String>,
}

impl Personalization {
    pub fn for_profile(profile: &UserProfile) -> Self {
        Self {
            prefix: prefix_for(&profile.user_type),
            suffix: goal_suffix(&profile.goals),
        }
    }

    pub fn apply(&self, base: &str) -> String {
        let suffix = self.suffix.as_deref().unwrap_or_default();
        let mut text = String::with_capacity(self.prefix.len() + base.len() + suffix.len());
        text.push_str(self.prefix);
        text.push_str(base);
        text.push_str(suffix);
        text
    }
}

pub fn personalize(base: &str, profile: &UserProfile) -> String {
    Personalization::for_profile(profile).apply(base)
}

fn prefix_for(user_type: &UserType) -> &'static str {
    match user_type {
        UserType::Student => "As a student, ",
        UserType::WorkingProfessional => "For a working professional like you, ",
        UserType::RecentGraduate => "As a recent graduate, ",
        UserType::Entrepreneur => "As an entrepreneur, ",
        UserType::Retiree => "In retirement, ",
        UserType::Other(_) => "",
    }
}

// Only the first two goals are ever mentioned.
fn goal_suffix(goals: &[String]) -> Option<String> {
    match goals {
        [] => None,
        [only] => Some(format!(
            "{PARAGRAPH_BREAK}🎯 I see you're focused on '{only}' - this advice should help with that goal!"
        )),
        [first, second, ..] => Some(format!(
            "{PARAGRAPH_BREAK}🎯 This aligns well with your goals of {first}, {second}!"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(user_type: UserType, goals: &[&str]) -> UserProfile {
        UserProfile::new(
            user_type,
            30,
            0.0,
            goals.iter().map(|g| g.to_string()).collect(),
        )
    }

    #[test]
    fn no_goals_means_prefix_only() {
        let p = profile(UserType::Student, &[]);
        assert_eq!(personalize("save early", &p), "As a student, save early");
    }

    #[test]
    fn prefix_table() {
        let cases = [
            (UserType::WorkingProfessional, "For a working professional like you, "),
            (UserType::RecentGraduate, "As a recent graduate, "),
            (UserType::Entrepreneur, "As an entrepreneur, "),
            (UserType::Retiree, "In retirement, "),
            (UserType::parse("alien"), ""),
        ];
        for (user_type, prefix) in cases {
            assert_eq!(personalize("X", &profile(user_type, &[])), format!("{prefix}X"));
        }
    }

    #[test]
    fn base_text_is_not_recased() {
        let p = profile(UserType::Retiree, &[]);
        assert_eq!(personalize("Keep cash", &p), "In retirement, Keep cash");
    }

    #[test]
    fn single_goal_suffix() {
        let p = profile(UserType::parse("x"), &["Pay Off Debt"]);
        assert_eq!(
            personalize("X", &p),
            "X\n\n🎯 I see you're focused on 'Pay Off Debt' - this advice should help with that goal!"
        );
    }

    #[test]
    fn suffix_mentions_only_first_two_goals() {
        let p = profile(UserType::parse("x"), &["A", "B", "C"]);
        let personalization = Personalization::for_profile(&p);
        let suffix = personalization.suffix.clone().unwrap();

        assert_eq!(suffix, "\n\n🎯 This aligns well with your goals of A, B!");
        assert!(!suffix.contains('C'));
        assert_eq!(personalization.apply("X"), format!("X{suffix}"));
    }
}
