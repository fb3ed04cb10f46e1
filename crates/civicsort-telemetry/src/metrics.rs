//! In-process counters for classification activity

use civicsort_core::PredictionMethod;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lock-free counters shared by request handlers
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    model_predictions: AtomicU64,
    keyword_predictions: AtomicU64,
    default_predictions: AtomicU64,
    prioritizations: AtomicU64,
    retrain_successes: AtomicU64,
    retrain_failures: AtomicU64,
    classify_latency_us: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    /// Record one classification and how long it took
    pub fn record_prediction(&self, method: PredictionMethod, latency_us: u64) {
        let counter = match method {
            PredictionMethod::Model => &self.inner.model_predictions,
            PredictionMethod::KeywordFallback => &self.inner.keyword_predictions,
            PredictionMethod::Default => &self.inner.default_predictions,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.inner
            .classify_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
    }

    /// Record a prioritization
    pub fn record_prioritization(&self) {
        self.inner.prioritizations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a feedback retrain outcome
    pub fn record_retrain(&self, success: bool) {
        let counter = if success {
            &self.inner.retrain_successes
        } else {
            &self.inner.retrain_failures
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            model_predictions: self.inner.model_predictions.load(Ordering::Relaxed),
            keyword_predictions: self.inner.keyword_predictions.load(Ordering::Relaxed),
            default_predictions: self.inner.default_predictions.load(Ordering::Relaxed),
            prioritizations: self.inner.prioritizations.load(Ordering::Relaxed),
            retrain_successes: self.inner.retrain_successes.load(Ordering::Relaxed),
            retrain_failures: self.inner.retrain_failures.load(Ordering::Relaxed),
            classify_latency_us: self.inner.classify_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub model_predictions: u64,
    pub keyword_predictions: u64,
    pub default_predictions: u64,
    pub prioritizations: u64,
    pub retrain_successes: u64,
    pub retrain_failures: u64,
    pub classify_latency_us: u64,
}

impl MetricsSnapshot {
    pub fn total_predictions(&self) -> u64 {
        self.model_predictions + self.keyword_predictions + self.default_predictions
    }

    /// Calculate average classification latency
    pub fn avg_classify_latency_us(&self) -> u64 {
        match self.total_predictions() {
            0 => 0,
            n => self.classify_latency_us / n,
        }
    }

    /// Share of predictions that did not come from the model
    pub fn fallback_rate(&self) -> f64 {
        match self.total_predictions() {
            0 => 0.0,
            n => (self.keyword_predictions + self.default_predictions) as f64 / n as f64,
        }
    }
}
