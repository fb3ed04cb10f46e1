//! HTTP routes and handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use civicsort_classifiers::{extract_location, ConfidenceStats, ModelMetadata, Triage};
use civicsort_core::{Category, PredictionMethod, Priority};
use civicsort_telemetry::{AuditEvent, AuditSeverity, MetricsSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/v1/classify", post(classify))
        .route("/v1/prioritize", post(prioritize))
        .route("/v1/triage", post(triage))
        .route("/v1/learn", post(learn))
        .route("/v1/model/stats", get(model_stats))
        .fallback(fallback)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct ClassifyRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ClassifyResponse {
    category: Category,
    confidence: f64,
    method: PredictionMethod,
    location: Option<String>,
}

async fn classify(
    State(state): State<AppState>,
    Json(req): Json<ClassifyRequest>,
) -> Json<ClassifyResponse> {
    let start = Instant::now();
    let prediction = state.engine.predict_category(&req.title, &req.description);
    state
        .collector
        .record_prediction(prediction.method, start.elapsed().as_micros() as u64);

    Json(ClassifyResponse {
        category: prediction.category,
        confidence: prediction.confidence,
        method: prediction.method,
        location: extract_location(&format!("{} {}", req.title, req.description)),
    })
}

#[derive(Debug, Deserialize)]
struct PrioritizeRequest {
    category: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PrioritizeResponse {
    priority: Priority,
}

async fn prioritize(
    State(state): State<AppState>,
    Json(req): Json<PrioritizeRequest>,
) -> Json<PrioritizeResponse> {
    let priority = state.engine.prioritize(&req.category, &req.description);
    state.collector.record_prioritization();
    debug!(category = %req.category, priority = %priority, "Prioritized complaint");
    Json(PrioritizeResponse { priority })
}

async fn triage(State(state): State<AppState>, Json(req): Json<ClassifyRequest>) -> Json<Triage> {
    let start = Instant::now();
    let triage = state.engine.triage(&req.title, &req.description);
    state
        .collector
        .record_prediction(triage.prediction.method, start.elapsed().as_micros() as u64);
    state.collector.record_prioritization();
    Json(triage)
}

#[derive(Debug, Deserialize)]
struct LearnRequest {
    text: String,
    category: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct LearnResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    training_samples: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Retraining is CPU-bound and takes the engine's writer lock, so it runs
/// on the blocking pool.
async fn learn(
    State(state): State<AppState>,
    Json(req): Json<LearnRequest>,
) -> Result<Json<LearnResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::InvalidRequest("text must not be empty".to_string()));
    }

    let engine = state.engine.clone();
    let (text, category) = (req.text, req.category);
    let outcome = tokio::task::spawn_blocking(move || {
        let result = engine.ingest_feedback(&text, &category);
        (category, result)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("retrain task failed: {}", e)))?;

    match outcome {
        (category, Ok(report)) => {
            state.collector.record_retrain(true);
            state.audit.add_event(AuditEvent::new("feedback_retrain").with_data(json!({
                "category": category,
                "training_samples": report.training_samples,
                "accuracy": report.accuracy,
            })));
            info!(category = %category, samples = report.training_samples, "Feedback accepted");
            Ok(Json(LearnResponse {
                success: true,
                training_samples: Some(report.training_samples),
                accuracy: Some(report.accuracy),
                error: None,
            }))
        }
        (_, Err(e)) if e.is_client_error() => Err(AppError::InvalidRequest(e.to_string())),
        (category, Err(e)) => {
            state.collector.record_retrain(false);
            state.audit.add_event(
                AuditEvent::new("feedback_retrain_failed")
                    .with_severity(AuditSeverity::High)
                    .with_data(json!({ "category": category, "error": e.to_string() })),
            );
            error!(error = %e, "Retraining failed; previous model stays active");
            Err(AppError::TrainingFailed(e.to_string()))
        }
    }
}

#[derive(Debug, Serialize)]
struct ModelStatsResponse {
    model_available: bool,
    corpus_size: usize,
    metadata: Option<ModelMetadata>,
    confidence: Option<ConfidenceStats>,
    counters: MetricsSnapshot,
    audit_events: usize,
    audit_valid: bool,
}

async fn model_stats(State(state): State<AppState>) -> Json<ModelStatsResponse> {
    let snapshot = state.engine.snapshot();
    Json(ModelStatsResponse {
        model_available: snapshot.model().is_some(),
        corpus_size: snapshot.corpus().len(),
        metadata: snapshot.metadata().cloned(),
        confidence: snapshot
            .model()
            .and_then(|model| model.confidence_stats(snapshot.corpus())),
        counters: state.collector.snapshot(),
        audit_events: state.audit.len(),
        audit_valid: state.audit.verify(),
    })
}

async fn fallback() -> impl IntoResponse {
    warn!("Request to unknown route");
    (StatusCode::NOT_FOUND, "Not found")
}

/// Error type for HTTP handlers
#[derive(Debug)]
enum AppError {
    InvalidRequest(String),
    TrainingFailed(String),
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::TrainingFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = json!({
            "success": false,
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use civicsort_classifiers::{ClassificationEngine, ClassifierConfig};
    use civicsort_telemetry::AuditTrail;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_state(dir: &TempDir) -> AppState {
        let config =
            ClassifierConfig::default().with_model_path(dir.path().join("classifier.bin"));
        let engine = ClassificationEngine::new(config).unwrap();
        AppState::from_engine(Arc::new(engine), AuditTrail::new(), None)
    }

    async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = TempDir::new().unwrap();
        let app = create_router(test_state(&dir));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_classify_endpoint() {
        let dir = TempDir::new().unwrap();
        let app = create_router(test_state(&dir));
        let (status, body) = post_json(
            app,
            "/v1/classify",
            json!({"title": "", "description": ""}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "other");
        assert_eq!(body["method"], "default");
        assert_eq!(body["confidence"], 0.5);
    }

    #[tokio::test]
    async fn test_prioritize_endpoint() {
        let dir = TempDir::new().unwrap();
        let app = create_router(test_state(&dir));
        let (status, body) = post_json(
            app,
            "/v1/prioritize",
            json!({"category": "garbage", "description": "emergency fire near dump"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["priority"], "Critical");
    }

    #[tokio::test]
    async fn test_triage_endpoint() {
        let dir = TempDir::new().unwrap();
        let app = create_router(test_state(&dir));
        let (status, body) = post_json(
            app,
            "/v1/triage",
            json!({"title": "Sewage overflow", "description": "near hospital gate"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"]["category"], "drainage");
        assert_eq!(body["priority"], "High");
        assert_eq!(body["location"], "hospital gate");
    }

    #[tokio::test]
    async fn test_learn_endpoint() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        let app = create_router(state.clone());

        let (status, body) = post_json(
            app.clone(),
            "/v1/learn",
            json!({"text": "zebra crossing paint completely faded", "category": "traffic"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["training_samples"], 17);
        assert_eq!(state.audit.len(), 1);
        assert!(state.audit.verify());

        let (status, body) = post_json(
            app,
            "/v1/learn",
            json!({"text": "trees need trimming", "category": "parks"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(state.engine.corpus_len(), 17);
    }

    #[tokio::test]
    async fn test_model_stats_endpoint() {
        let dir = TempDir::new().unwrap();
        let app = create_router(test_state(&dir));
        let response = app
            .oneshot(Request::builder().uri("/v1/model/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["model_available"], true);
        assert_eq!(body["corpus_size"], 16);
        assert_eq!(body["audit_valid"], true);
        assert!(body["confidence"]["average_confidence"].is_f64());
    }
}
