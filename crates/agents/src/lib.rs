use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use finch_core::{
    compose_response, AdviceError, AdvisorReply, Intent, KnowledgeBase, ReplyRoute, UserProfile,
};
use finch_observability::AppMetrics;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, instrument, warn};

pub const GREETING: &str = "Hello! I'm your personal finance assistant. I can help you with savings, budgeting, investing, taxes, and general financial advice. What would you like to know?";

pub const APOLOGY_MESSAGE: &str =
    "I apologize, but I encountered an error. Please try asking your question again.";

pub const DISCLAIMER: &str = "💡 This chatbot provides general financial education. Always consult a professional advisor for personalized financial planning.";

#[derive(Debug, Clone, Serialize)]
pub struct AnsweredReply {
    #[serde(flatten)]
    pub reply: AdvisorReply,
    pub answered_at: DateTime<Utc>,
}

/// Application-facing advisor. The knowledge base is shared read-only; the
/// randomness source sits behind a mutex so one advisor can serve several
/// threads.
pub struct FinanceAdvisor {
    kb: Arc<KnowledgeBase>,
    rng: Mutex<StdRng>,
    metrics: Arc<AppMetrics>,
}

impl FinanceAdvisor {
    pub fn new(kb: Arc<KnowledgeBase>, metrics: Arc<AppMetrics>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            kb,
            rng: Mutex::new(rng),
            metrics,
        }
    }

    pub fn with_builtin(metrics: Arc<AppMetrics>, seed: Option<u64>) -> Self {
        Self::new(Arc::new(KnowledgeBase::builtin().clone()), metrics, seed)
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn metrics(&self) -> &AppMetrics {
        &self.metrics
    }

    pub fn respond(&self, message: &str, profile: &UserProfile) -> Result<String> {
        Ok(self.handle_message(message, profile)?.reply.text)
    }

    /// Never fails: errors are logged and replaced with [`APOLOGY_MESSAGE`].
    pub fn respond_or_apologize(&self, message: &str, profile: &UserProfile) -> String {
        match self.respond(message, profile) {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "falling back to apology");
                APOLOGY_MESSAGE.to_string()
            }
        }
    }

    pub fn handle_message(&self, message: &str, profile: &UserProfile) -> Result<AnsweredReply> {
        let mut rng = self.rng.lock();
        self.handle_message_with_rng(message, profile, &mut *rng)
    }

    #[instrument(skip_all, fields(user_type = %profile.user_type, message_len = message.len()))]
    pub fn handle_message_with_rng<R>(
        &self,
        message: &str,
        profile: &UserProfile,
        rng: &mut R,
    ) -> Result<AnsweredReply>
    where
        R: Rng + ?Sized,
    {
        let started = Instant::now();
        self.metrics.inc_request();

        let reply = match compose_response(&self.kb, message, profile, rng) {
            Ok(reply) => reply,
            Err(err) => {
                if matches!(err, AdviceError::InvalidProfile(_)) {
                    self.metrics.inc_rejected_profile();
                }
                self.metrics.observe_latency(started.elapsed());
                warn!(error = %err, "advice composition failed");
                return Err(err).context("failed to compose advice");
            }
        };

        match &reply.route {
            ReplyRoute::QuickResponse { keyword } => {
                self.metrics.inc_quick_response();
                info!(keyword = %keyword, "quick response");
            }
            ReplyRoute::Advice { intent } => {
                if *intent == Intent::General {
                    self.metrics.inc_general_fallback();
                }
                info!(intent = %intent, "advice selected");
            }
        }

        self.metrics.observe_latency(started.elapsed());

        Ok(AnsweredReply {
            reply,
            answered_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use finch_core::UserType;

    use super::*;

    fn advisor(seed: u64) -> FinanceAdvisor {
        FinanceAdvisor::with_builtin(AppMetrics::shared(), Some(seed))
    }

    #[test]
    fn seeded_advisors_agree() {
        let profile = UserProfile::default();
        let a = advisor(11).respond("any budgeting tips?", &profile).unwrap();
        let b = advisor(11).respond("any budgeting tips?", &profile).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn counts_quick_responses_and_general_fallbacks() {
        let advisor = advisor(3);
        let profile = UserProfile::default();

        advisor.respond("tell me about index funds", &profile).unwrap();
        advisor.respond("I like turtles", &profile).unwrap();
        advisor.respond("how do I save more", &profile).unwrap();

        let snapshot = advisor.metrics().snapshot();
        assert_eq!(snapshot.requests_total, 3);
        assert_eq!(snapshot.quick_responses_total, 1);
        assert_eq!(snapshot.general_fallback_total, 1);
    }

    #[test]
    fn malformed_profile_is_rejected_and_apologized_for() {
        let advisor = advisor(3);
        let profile = UserProfile::new(UserType::Student, 20, -500.0, Vec::new());

        let err = advisor.respond("how do I save more", &profile).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AdviceError>(),
            Some(AdviceError::InvalidProfile(_))
        ));
        assert_eq!(
            advisor.respond_or_apologize("how do I save more", &profile),
            APOLOGY_MESSAGE
        );
        assert_eq!(advisor.metrics().snapshot().rejected_profiles_total, 2);
    }

    #[test]
    fn rejected_profiles_contribute_latency() {
        let metrics = AppMetrics::shared();
        let advisor = FinanceAdvisor::with_builtin(metrics.clone(), Some(3));
        let profile = UserProfile::new(UserType::Student, -1, 0.0, Vec::new());

        for _ in 0..50 {
            assert!(advisor.respond("how do I save more", &profile).is_err());
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_total, 50);
        assert_eq!(snapshot.rejected_profiles_total, 50);
        assert_eq!(
            metrics.latency_samples_total(),
            snapshot.requests_total,
            "every request, rejected or not, records a latency sample"
        );
    }
}
