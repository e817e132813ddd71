use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Process-wide advisor counters, shared through an `Arc`.
///
/// - `requests_total`: every message handed to the advisor, including
///   ones that fail.
/// - `quick_responses_total`: replies answered from a keyword quick response
///   without intent classification.
/// - `general_fallback_total`: messages that matched no intent and got a
///   generic tip.
/// - `rejected_profiles_total`: messages refused because the profile had a
///   negative age or income.
/// - latency is summed over every request, successful or not, and averaged
///   in [`MetricsSnapshot::avg_latency_micros`].
#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    quick_responses_total: AtomicU64,
    general_fallback_total: AtomicU64,
    rejected_profiles_total: AtomicU64,
    latency_samples_total: AtomicU64,
    total_latency_micros: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub quick_responses_total: u64,
    pub general_fallback_total: u64,
    pub rejected_profiles_total: u64,
    pub avg_latency_micros: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_quick_response(&self) {
        self.quick_responses_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_general_fallback(&self) {
        self.general_fallback_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejected_profile(&self) {
        self.rejected_profiles_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.latency_samples_total.fetch_add(1, Ordering::Relaxed);
        self.total_latency_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn latency_samples_total(&self) -> u64 {
        self.latency_samples_total.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_micros.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            quick_responses_total: self.quick_responses_total.load(Ordering::Relaxed),
            general_fallback_total: self.general_fallback_total.load(Ordering::Relaxed),
            rejected_profiles_total: self.rejected_profiles_total.load(Ordering::Relaxed),
            avg_latency_micros: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }

    pub fn log_snapshot(&self) {
        let snapshot = self.snapshot();
        info!(
            requests = snapshot.requests_total,
            quick_responses = snapshot.quick_responses_total,
            general_fallbacks = snapshot.general_fallback_total,
            rejected_profiles = snapshot.rejected_profiles_total,
            avg_latency_micros = snapshot.avg_latency_micros,
            "advisor metrics"
        );
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}=info,finch_agents=info", service_name))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
            .init();
    });
}
