//! Shared application state

use civicsort_classifiers::{ClassificationEngine, ClassifierConfig};
use civicsort_telemetry::{AuditEvent, AuditTrail, MetricsCollector};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// State handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ClassificationEngine>,
    pub collector: MetricsCollector,
    pub audit: Arc<AuditTrail>,
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Build the engine (load or train the model) and telemetry
    pub fn new(config: ClassifierConfig, prometheus: Option<PrometheusHandle>) -> anyhow::Result<Self> {
        let engine = ClassificationEngine::new(config)?;
        let audit = AuditTrail::new();

        let snapshot = engine.snapshot();
        audit.add_event(AuditEvent::new("engine_started").with_data(json!({
            "model_available": snapshot.model().is_some(),
            "training_samples": snapshot.corpus().len(),
        })));
        info!(
            model_available = snapshot.model().is_some(),
            corpus = snapshot.corpus().len(),
            "Classification engine ready"
        );

        Ok(Self::from_engine(Arc::new(engine), audit, prometheus))
    }

    pub fn from_engine(
        engine: Arc<ClassificationEngine>,
        audit: AuditTrail,
        prometheus: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            engine,
            collector: MetricsCollector::new(),
            audit: Arc::new(audit),
            prometheus,
        }
    }
}
