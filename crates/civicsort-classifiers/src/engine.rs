//! Complaint classification engine
//!
//! One engine is built at startup and shared by handle. Readers clone an
//! `Arc` to the current snapshot and work lock-free from there; feedback
//! ingestion trains on a private copy of the corpus and publishes the new
//! snapshot with a single pointer swap.

use crate::classifier::Classifier;
use crate::config::ClassifierConfig;
use crate::corpus::TrainingCorpus;
use crate::keywords::KeywordClassifier;
use crate::location::extract_location;
use crate::model::{CategoryModel, ConfidenceStats};
use crate::priority::Prioritizer;
use crate::store::{ModelMetadata, ModelStore};
use civicsort_core::{Category, PredictionResult, Priority, Result};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Corpus and model that were trained together.
///
/// When a model is present, `model.training_samples() == corpus.len()`.
#[derive(Debug, Clone, Default)]
pub struct EngineSnapshot {
    corpus: TrainingCorpus,
    model: Option<Arc<CategoryModel>>,
    metadata: Option<ModelMetadata>,
}

impl EngineSnapshot {
    pub fn corpus(&self) -> &TrainingCorpus {
        &self.corpus
    }

    pub fn model(&self) -> Option<&CategoryModel> {
        self.model.as_deref()
    }

    /// Metadata of the current model, if any was read or written
    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }
}

/// Outcome of a successful feedback retrain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub training_samples: usize,
    pub accuracy: f64,
}

/// Classification plus priority, as used when a complaint is submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triage {
    pub prediction: PredictionResult,
    pub priority: Priority,
    pub location: Option<String>,
}

/// Shared classification service
pub struct ClassificationEngine {
    store: ModelStore,
    keywords: KeywordClassifier,
    prioritizer: Prioritizer,
    state: RwLock<Arc<EngineSnapshot>>,
    writer: Mutex<()>,
}

impl ClassificationEngine {
    /// Build the engine over the seed corpus, loading or training the model
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        Self::with_corpus(config, TrainingCorpus::seed())
    }

    /// Build the engine over a custom corpus.
    ///
    /// A persisted model takes precedence and brings back the corpus it was
    /// trained on; `corpus` is only used to train when none can be loaded.
    pub fn with_corpus(config: ClassifierConfig, corpus: TrainingCorpus) -> Result<Self> {
        config.validate()?;
        let store = ModelStore::new(config);
        let (corpus, model) = match store.load_or_train(&corpus) {
            Some(stored) => (stored.corpus, Some(Arc::new(stored.model))),
            None => {
                warn!("No model available, running in keyword fallback mode");
                (corpus, None)
            }
        };
        let metadata = store.load_metadata().ok();
        Self::assemble(store, corpus, model, metadata)
    }

    /// Engine with no statistical model; every prediction uses the fallback path
    pub fn fallback_only(config: ClassifierConfig) -> Result<Self> {
        config.validate()?;
        Self::assemble(ModelStore::new(config), TrainingCorpus::seed(), None, None)
    }

    fn assemble(
        store: ModelStore,
        corpus: TrainingCorpus,
        model: Option<Arc<CategoryModel>>,
        metadata: Option<ModelMetadata>,
    ) -> Result<Self> {
        let config = store.config();
        let keywords = KeywordClassifier::new(config.keyword_confidence, config.default_confidence)?;
        let prioritizer = Prioritizer::new()?;

        Ok(Self {
            store,
            keywords,
            prioritizer,
            state: RwLock::new(Arc::new(EngineSnapshot {
                corpus,
                model,
                metadata,
            })),
            writer: Mutex::new(()),
        })
    }

    /// Current consistent snapshot
    pub fn snapshot(&self) -> Arc<EngineSnapshot> {
        self.state.read().clone()
    }

    /// Predict a category. Never fails; falls back to keywords, then `other`.
    pub fn predict_category(&self, title: &str, description: &str) -> PredictionResult {
        let start = Instant::now();
        let text = format!("{} {}", title, description);
        let snapshot = self.snapshot();

        let result = match snapshot.model() {
            Some(model) => match model.classify(&text) {
                Ok(result) => result,
                Err(e) => {
                    debug!(error = %e, "Model could not classify, using keyword fallback");
                    self.keywords.classify_text(&text)
                }
            },
            None => self.keywords.classify_text(&text),
        };

        let prediction = result.into_prediction();
        metrics::counter!("civicsort_classifications_total", "method" => prediction.method.as_str())
            .increment(1);
        metrics::histogram!("civicsort_classify_latency_us")
            .record(start.elapsed().as_micros() as f64);
        debug!(
            category = %prediction.category,
            confidence = prediction.confidence,
            method = %prediction.method,
            "Classified complaint"
        );
        prediction
    }

    /// Alias of [`predict_category`](Self::predict_category)
    pub fn classify(&self, title: &str, description: &str) -> PredictionResult {
        self.predict_category(title, description)
    }

    /// Priority for a category label and description. Pure and total.
    pub fn prioritize(&self, category: &str, description: &str) -> Priority {
        let priority = self.prioritizer.prioritize(category, description);
        metrics::counter!("civicsort_prioritizations_total", "priority" => priority.as_str())
            .increment(1);
        priority
    }

    /// Classify, then prioritize with the predicted category
    pub fn triage(&self, title: &str, description: &str) -> Triage {
        let prediction = self.predict_category(title, description);
        let priority = self.prioritize(prediction.category.as_str(), description);
        let location = extract_location(&format!("{} {}", title, description));
        Triage {
            prediction,
            priority,
            location,
        }
    }

    /// Add a labelled example and retrain.
    ///
    /// Serialized against other feedback calls. On any failure the published
    /// corpus and model are unchanged.
    pub fn ingest_feedback(&self, text: &str, actual_category: &str) -> Result<TrainingReport> {
        let category: Category = actual_category.parse()?;
        let _guard = self.writer.lock();

        let current = self.snapshot();
        let corpus = current.corpus.with_example(text, category);

        let trained = match self.store.train(&corpus) {
            Ok(trained) => trained,
            Err(e) => {
                metrics::counter!("civicsort_retrains_total", "outcome" => "failure").increment(1);
                warn!(error = %e, category = %category, "Retraining with feedback failed");
                return Err(e);
            }
        };

        let report = TrainingReport {
            training_samples: trained.metadata.training_samples,
            accuracy: trained.metadata.accuracy,
        };
        let next = Arc::new(EngineSnapshot {
            corpus,
            model: Some(Arc::new(trained.model)),
            metadata: Some(trained.metadata),
        });
        *self.state.write() = next;

        metrics::counter!("civicsort_retrains_total", "outcome" => "success").increment(1);
        info!(
            text = %truncate(text, 50),
            category = %category,
            samples = report.training_samples,
            "Model retrained with new example"
        );
        Ok(report)
    }

    /// Boolean form of [`ingest_feedback`](Self::ingest_feedback)
    pub fn learn(&self, text: &str, correct_category: &str) -> bool {
        self.ingest_feedback(text, correct_category).is_ok()
    }

    /// Top-class probability statistics over the training corpus
    pub fn confidence_stats(&self) -> Option<ConfidenceStats> {
        let snapshot = self.snapshot();
        snapshot.model()?.confidence_stats(snapshot.corpus())
    }

    pub fn model_available(&self) -> bool {
        self.snapshot().model.is_some()
    }

    pub fn corpus_len(&self) -> usize {
        self.snapshot().corpus.len()
    }

    pub fn metadata(&self) -> Option<ModelMetadata> {
        self.snapshot().metadata.clone()
    }

    pub fn config(&self) -> &ClassifierConfig {
        self.store.config()
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

impl std::fmt::Debug for ClassificationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationEngine")
            .field("model_path", &self.store.model_path())
            .field("model_available", &self.model_available())
            .field("corpus_len", &self.corpus_len())
            .finish()
    }
}
