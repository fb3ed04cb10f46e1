//! CivicSort Classifiers
//!
//! Complaint categorization and prioritization.
//!
//! Classification runs in up to three stages:
//! - A TF-IDF / multinomial Naive Bayes model trained on labelled complaints
//! - A keyword fallback when no model is loaded or the model has no evidence
//! - A default `other` result when no keyword matches
//!
//! Prioritization is rule-based and independent of the model. Feedback
//! retrains the model synchronously and swaps it in atomically.

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod keywords;
pub mod location;
pub mod model;
pub mod naive_bayes;
pub mod priority;
pub mod stop_words;
pub mod store;
pub mod vectorizer;

pub use classifier::{ClassificationMetadata, ClassificationResult, Classifier};
pub use config::{ClassifierConfig, VectorizerConfig};
pub use corpus::TrainingCorpus;
pub use engine::{ClassificationEngine, EngineSnapshot, TrainingReport, Triage};
pub use keywords::KeywordClassifier;
pub use location::extract_location;
pub use model::{CategoryModel, ConfidenceStats};
pub use priority::Prioritizer;
pub use store::{ModelMetadata, ModelStore, StoredModel, TrainedModel};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::config::ClassifierConfig;
    pub use crate::engine::{ClassificationEngine, TrainingReport, Triage};
    pub use crate::keywords::KeywordClassifier;
    pub use crate::priority::Prioritizer;
    pub use civicsort_core::{Category, PredictionMethod, PredictionResult, Priority};
}
