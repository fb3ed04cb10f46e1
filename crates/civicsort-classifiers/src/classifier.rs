//! Classifier trait and common types

use civicsort_core::{Category, PredictionMethod, PredictionResult, Result};

/// Trait for every complaint classifier
pub trait Classifier: Send + Sync {
    /// Classify the given text
    fn classify(&self, text: &str) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Result of one classifier run
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Predicted category
    pub category: Category,

    /// Confidence score (0.0-1.0)
    pub score: f64,

    /// Path that produced the result
    pub method: PredictionMethod,

    /// Additional metadata
    pub metadata: ClassificationMetadata,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl ClassificationResult {
    /// Create a new classification result
    pub fn new(category: Category, score: f64, method: PredictionMethod) -> Self {
        Self {
            category,
            score,
            method,
            metadata: ClassificationMetadata::default(),
            latency_us: 0,
        }
    }

    /// Collapse into the value returned to callers
    pub fn into_prediction(self) -> PredictionResult {
        PredictionResult::new(self.category, self.score, self.method)
    }
}

/// Metadata about classification
#[derive(Debug, Clone, Default)]
pub struct ClassificationMetadata {
    /// Keyword that decided the category
    pub matched_keyword: Option<String>,

    /// All class probabilities (for the statistical model)
    pub all_scores: Option<Vec<(Category, f64)>>,
}
