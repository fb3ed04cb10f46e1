//! Configuration for the classification engine

use civicsort_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the model store, vectorizer and fallback scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Path of the persisted model blob
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Feature extraction settings
    #[serde(default)]
    pub vectorizer: VectorizerConfig,

    /// Additive smoothing constant for the Naive Bayes model
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,

    /// Confidence reported for keyword matches
    #[serde(default = "default_keyword_confidence")]
    pub keyword_confidence: f64,

    /// Confidence reported when nothing matched
    #[serde(default = "default_default_confidence")]
    pub default_confidence: f64,
}

/// TF-IDF feature extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Vocabulary cap, keeping the most frequent terms
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Smallest n-gram length
    #[serde(default = "default_ngram_min")]
    pub ngram_min: usize,

    /// Largest n-gram length
    #[serde(default = "default_ngram_max")]
    pub ngram_max: usize,

    /// Drop English stop words before building n-grams
    #[serde(default = "default_true")]
    pub stop_words: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            ngram_min: default_ngram_min(),
            ngram_max: default_ngram_max(),
            stop_words: true,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            vectorizer: VectorizerConfig::default(),
            smoothing: default_smoothing(),
            keyword_confidence: default_keyword_confidence(),
            default_confidence: default_default_confidence(),
        }
    }
}

impl ClassifierConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| Error::config(format!("invalid YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Use a different model path
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    /// Sidecar metadata path: `<model stem>_meta.json` next to the model
    pub fn metadata_path(&self) -> PathBuf {
        let stem = self
            .model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "classifier".to_string());
        self.model_path.with_file_name(format!("{}_meta.json", stem))
    }

    /// Reject settings the trainer cannot work with
    pub fn validate(&self) -> Result<()> {
        let v = &self.vectorizer;
        if v.ngram_min == 0 || v.ngram_min > v.ngram_max {
            return Err(Error::config(format!(
                "invalid n-gram range ({}, {})",
                v.ngram_min, v.ngram_max
            )));
        }
        if v.max_features == 0 {
            return Err(Error::config("max_features must be positive"));
        }
        if self.smoothing <= 0.0 || !self.smoothing.is_finite() {
            return Err(Error::config(format!(
                "smoothing must be positive, got {}",
                self.smoothing
            )));
        }
        for (name, value) in [
            ("keyword_confidence", self.keyword_confidence),
            ("default_confidence", self.default_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::config(format!("{} must be in [0, 1], got {}", name, value)));
            }
        }
        Ok(())
    }
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/classifier/classifier.bin")
}

fn default_max_features() -> usize {
    1000
}

fn default_ngram_min() -> usize {
    1
}

fn default_ngram_max() -> usize {
    2
}

fn default_smoothing() -> f64 {
    0.1
}

fn default_keyword_confidence() -> f64 {
    0.7
}

fn default_default_confidence() -> f64 {
    0.5
}

fn default_true() -> bool {
    true
}
