//! Durable model storage
//!
//! The model and the corpus it was trained on share one bincode blob at the
//! configured path. A JSON sidecar (`<stem>_meta.json`) records when and on
//! what it was trained.
//!
//! Both files are staged as `*.tmp` before either replaces its target. The
//! previous blob is kept as `*.bak` until the sidecar is in place, so a
//! failed save leaves the old model on disk.

use crate::config::ClassifierConfig;
use crate::corpus::TrainingCorpus;
use crate::model::CategoryModel;
use chrono::{DateTime, Utc};
use civicsort_core::{Category, Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Training metadata persisted next to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// When training finished
    pub trained_at: DateTime<Utc>,

    /// Corpus size
    pub training_samples: usize,

    /// The full category set
    pub categories: Vec<String>,

    /// In-sample accuracy
    pub accuracy: f64,
}

/// Contents of the model blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredModel {
    pub model: CategoryModel,
    pub corpus: TrainingCorpus,
}

#[derive(Serialize)]
struct StoredModelRef<'a> {
    model: &'a CategoryModel,
    corpus: &'a TrainingCorpus,
}

/// A freshly trained, already persisted model
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub model: CategoryModel,
    pub metadata: ModelMetadata,
}

/// Reads and writes the model artifact
#[derive(Debug, Clone)]
pub struct ModelStore {
    config: ClassifierConfig,
}

impl ModelStore {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn model_path(&self) -> &Path {
        &self.config.model_path
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.config.metadata_path()
    }

    /// Load the persisted model, or train and persist one from `corpus`.
    ///
    /// A loaded model comes back with the corpus it was trained on, which
    /// includes any feedback from earlier runs. Never fails: `None` means no
    /// model is available and callers must use fallback classification.
    pub fn load_or_train(&self, corpus: &TrainingCorpus) -> Option<StoredModel> {
        let path = self.model_path();
        if path.exists() {
            match self.load() {
                Ok(stored) => {
                    info!(path = %path.display(), samples = stored.corpus.len(), "Loaded existing model");
                    return Some(stored);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to load model, retraining"),
            }
        } else {
            info!(path = %path.display(), "No existing model found, training new model");
        }

        match self.train(corpus) {
            Ok(trained) => Some(StoredModel {
                model: trained.model,
                corpus: corpus.clone(),
            }),
            Err(e) => {
                warn!(error = %e, "Training failed, classification will use keyword fallback");
                None
            }
        }
    }

    /// Deserialize and validate the persisted model and its corpus
    pub fn load(&self) -> Result<StoredModel> {
        let bytes = fs::read(self.model_path())?;
        let stored: StoredModel = bincode::deserialize(&bytes)
            .map_err(|e| Error::persistence(format!("corrupt model artifact: {}", e)))?;
        stored.model.validate()?;
        if stored.model.training_samples() != stored.corpus.len() {
            return Err(Error::persistence(format!(
                "model trained on {} samples but stored corpus has {}",
                stored.model.training_samples(),
                stored.corpus.len()
            )));
        }
        Ok(stored)
    }

    /// Train on `corpus` and replace the persisted model and metadata.
    ///
    /// Nothing is returned unless both files were written. On failure the
    /// previous files are left in place.
    pub fn train(&self, corpus: &TrainingCorpus) -> Result<TrainedModel> {
        let model = CategoryModel::train(corpus, &self.config)?;
        let metadata = ModelMetadata {
            trained_at: Utc::now(),
            training_samples: corpus.len(),
            categories: Category::labels(),
            accuracy: model.evaluate(corpus),
        };

        self.persist(&model, corpus, &metadata)?;
        info!(
            path = %self.model_path().display(),
            samples = metadata.training_samples,
            accuracy = metadata.accuracy,
            "Model trained and saved"
        );

        Ok(TrainedModel { model, metadata })
    }

    /// Read the sidecar metadata, if present
    pub fn load_metadata(&self) -> Result<ModelMetadata> {
        let content = fs::read_to_string(self.metadata_path())?;
        Ok(serde_json::from_str(&content)?)
    }

    fn persist(
        &self,
        model: &CategoryModel,
        corpus: &TrainingCorpus,
        metadata: &ModelMetadata,
    ) -> Result<()> {
        let model_path = self.model_path();
        let meta_path = self.metadata_path();
        if let Some(dir) = model_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| {
                Error::persistence(format!("cannot create {}: {}", dir.display(), e))
            })?;
        }

        let bytes = bincode::serialize(&StoredModelRef { model, corpus })
            .map_err(|e| Error::persistence(format!("cannot encode model: {}", e)))?;
        let json = serde_json::to_vec_pretty(metadata)?;

        let model_tmp = with_suffix(model_path, ".tmp");
        let meta_tmp = with_suffix(&meta_path, ".tmp");
        let backup = with_suffix(model_path, ".bak");
        let had_previous = model_path.exists();

        let committed = write_file(&model_tmp, &bytes)
            .and_then(|_| write_file(&meta_tmp, &json))
            .and_then(|_| {
                if had_previous {
                    copy_file(model_path, &backup)
                } else {
                    Ok(())
                }
            })
            .and_then(|_| rename_file(&model_tmp, model_path))
            .and_then(|_| rename_file(&meta_tmp, &meta_path));

        let _ = fs::remove_file(&model_tmp);
        let _ = fs::remove_file(&meta_tmp);

        if let Err(e) = committed {
            let restored = if had_previous {
                fs::rename(&backup, model_path)
            } else {
                fs::remove_file(model_path).or_else(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => Ok(()),
                    _ => Err(e),
                })
            };
            if let Err(restore_err) = restored {
                warn!(path = %model_path.display(), error = %restore_err, "Could not restore previous model");
            }
            return Err(e);
        }

        if had_previous {
            let _ = fs::remove_file(&backup);
        }
        debug!(bytes = bytes.len(), "Persisted model artifact");
        Ok(())
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes)
        .map_err(|e| Error::persistence(format!("cannot write {}: {}", path.display(), e)))
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|e| Error::persistence(format!("cannot back up {}: {}", from.display(), e)))
}

fn rename_file(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to)
        .map_err(|e| Error::persistence(format!("cannot replace {}: {}", to.display(), e)))
}
