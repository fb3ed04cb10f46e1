//! Trained category model (vectorizer + Naive Bayes)

use crate::classifier::{ClassificationMetadata, ClassificationResult, Classifier};
use crate::config::ClassifierConfig;
use crate::corpus::TrainingCorpus;
use crate::naive_bayes::MultinomialNaiveBayes;
use crate::vectorizer::TfidfVectorizer;
use civicsort_core::{Category, Error, PredictionMethod, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Summary of top-class probabilities over a corpus
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceStats {
    pub average_confidence: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
    pub training_samples: usize,
}

/// Immutable trained artifact. Retraining builds a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryModel {
    vectorizer: TfidfVectorizer,
    classifier: MultinomialNaiveBayes,
    training_samples: usize,
}

impl CategoryModel {
    /// Train from a corpus. Deterministic for a given corpus and config.
    pub fn train(corpus: &TrainingCorpus, config: &ClassifierConfig) -> Result<Self> {
        if corpus.is_empty() {
            return Err(Error::training("training corpus is empty"));
        }

        let vectorizer = TfidfVectorizer::fit(&config.vectorizer, corpus.texts())?;
        let features: Vec<_> = corpus
            .texts()
            .iter()
            .map(|text| vectorizer.transform(text))
            .collect();
        let classifier = MultinomialNaiveBayes::fit(
            &features,
            corpus.labels(),
            vectorizer.num_features(),
            config.smoothing,
        )?;

        Ok(Self {
            vectorizer,
            classifier,
            training_samples: corpus.len(),
        })
    }

    /// Most probable category and its probability.
    ///
    /// Text with no in-vocabulary terms is an error: the model has no
    /// evidence beyond class priors.
    pub fn predict(&self, text: &str) -> Result<(Category, f64)> {
        let features = self.vectorizer.transform(text);
        if features.is_empty() {
            return Err(Error::model("text has no known features"));
        }
        self.classifier.predict(&features)
    }

    /// Probability of every class the model knows
    pub fn predict_proba(&self, text: &str) -> Result<Vec<(Category, f64)>> {
        let features = self.vectorizer.transform(text);
        let proba = self.classifier.predict_proba(&features)?;
        Ok(self.classifier.classes().iter().copied().zip(proba).collect())
    }

    /// In-sample accuracy, rounded to 3 decimals.
    ///
    /// This re-predicts the training corpus and does not measure generalization.
    pub fn evaluate(&self, corpus: &TrainingCorpus) -> f64 {
        if corpus.is_empty() {
            return 0.0;
        }
        let correct = corpus
            .iter()
            .filter(|(text, label)| {
                let features = self.vectorizer.transform(text);
                matches!(self.classifier.predict(&features), Ok((predicted, _)) if predicted == *label)
            })
            .count();
        round3(correct as f64 / corpus.len() as f64)
    }

    /// Top-class probability statistics over a corpus
    pub fn confidence_stats(&self, corpus: &TrainingCorpus) -> Option<ConfidenceStats> {
        let maxima: Vec<f64> = corpus
            .texts()
            .iter()
            .filter_map(|text| {
                let features = self.vectorizer.transform(text);
                self.classifier.predict(&features).ok().map(|(_, p)| p)
            })
            .collect();
        if maxima.is_empty() {
            return None;
        }

        let sum: f64 = maxima.iter().sum();
        Some(ConfidenceStats {
            average_confidence: round3(sum / maxima.len() as f64),
            min_confidence: round3(maxima.iter().copied().fold(f64::INFINITY, f64::min)),
            max_confidence: round3(maxima.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            training_samples: corpus.len(),
        })
    }

    /// Categories the model can output
    pub fn categories(&self) -> &[Category] {
        self.classifier.classes()
    }

    /// Number of examples the model was trained on
    pub fn training_samples(&self) -> usize {
        self.training_samples
    }

    pub fn num_features(&self) -> usize {
        self.vectorizer.num_features()
    }

    /// Consistency check for artifacts read from disk
    pub fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        self.classifier.validate(self.vectorizer.num_features())
    }
}

impl Classifier for CategoryModel {
    fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();
        let all_scores = self.predict_proba(text)?;
        let (category, score) = self.predict(text)?;

        Ok(ClassificationResult {
            category,
            score,
            method: PredictionMethod::Model,
            metadata: ClassificationMetadata {
                all_scores: Some(all_scores),
                ..Default::default()
            },
            latency_us: start.elapsed().as_micros() as u64,
        })
    }

    fn name(&self) -> &str {
        "naive-bayes"
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_model() -> CategoryModel {
        CategoryModel::train(&TrainingCorpus::seed(), &ClassifierConfig::default()).unwrap()
    }

    #[test]
    fn test_train_on_seed() {
        let model = seed_model();
        assert_eq!(model.training_samples(), 16);
        assert_eq!(model.categories().len(), 8);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_training_is_deterministic() {
        assert_eq!(seed_model(), seed_model());
    }

    #[test]
    fn test_in_sample_accuracy() {
        let corpus = TrainingCorpus::seed();
        let model = seed_model();
        let accuracy = model.evaluate(&corpus);
        assert!(accuracy >= 0.8, "accuracy {}", accuracy);
        assert!(accuracy <= 1.0);
    }

    #[test]
    fn test_predict_known_text() {
        let model = seed_model();
        let (category, probability) = model.predict("sewage overflow near hospital").unwrap();
        assert_eq!(category, Category::Drainage);
        assert!(probability > 0.0 && probability <= 1.0);
    }

    #[test]
    fn test_predict_without_known_terms_is_error() {
        let model = seed_model();
        assert!(model.predict("").is_err());
        assert!(model.predict("zzzz qqqq").is_err());
    }

    #[test]
    fn test_confidence_stats() {
        let corpus = TrainingCorpus::seed();
        let stats = seed_model().confidence_stats(&corpus).unwrap();
        assert_eq!(stats.training_samples, 16);
        assert!(stats.min_confidence <= stats.average_confidence);
        assert!(stats.average_confidence <= stats.max_confidence);
        assert!(stats.max_confidence <= 1.0);
    }

    #[test]
    fn test_classifier_trait() {
        let model = seed_model();
        let result = model.classify("street light not working").unwrap();
        assert_eq!(result.method, PredictionMethod::Model);
        assert_eq!(result.metadata.all_scores.as_ref().map(Vec::len), Some(8));
        assert_eq!(model.name(), "naive-bayes");
    }
}
