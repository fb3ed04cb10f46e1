//! Multinomial Naive Bayes over TF-IDF features

use crate::vectorizer::SparseVector;
use civicsort_core::{Category, Error, Result};
use serde::{Deserialize, Serialize};

/// Trained multinomial Naive Bayes model.
///
/// Only categories present in the training labels become classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNaiveBayes {
    classes: Vec<Category>,
    class_log_prior: Vec<f64>,
    /// Row per class, column per feature
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNaiveBayes {
    /// Fit on feature vectors with matching labels
    pub fn fit(
        features: &[SparseVector],
        labels: &[Category],
        num_features: usize,
        alpha: f64,
    ) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(Error::training(format!(
                "{} feature rows for {} labels",
                features.len(),
                labels.len()
            )));
        }
        if features.is_empty() {
            return Err(Error::training("cannot fit on an empty corpus"));
        }
        if num_features == 0 {
            return Err(Error::training("cannot fit without features"));
        }

        let mut classes: Vec<Category> = labels.to_vec();
        classes.sort();
        classes.dedup();

        let mut class_count = vec![0usize; classes.len()];
        let mut feature_count = vec![vec![0.0f64; num_features]; classes.len()];

        for (row, label) in features.iter().zip(labels) {
            let class = classes
                .binary_search(label)
                .map_err(|_| Error::internal("label missing from class list"))?;
            class_count[class] += 1;
            for &(index, weight) in row {
                if index >= num_features {
                    return Err(Error::training(format!("feature index {} out of range", index)));
                }
                feature_count[class][index] += weight;
            }
        }

        let total = labels.len() as f64;
        let class_log_prior = class_count
            .iter()
            .map(|&count| (count as f64 / total).ln())
            .collect();

        let feature_log_prob = feature_count
            .iter()
            .map(|counts| {
                let denominator = counts.iter().sum::<f64>() + alpha * num_features as f64;
                counts
                    .iter()
                    .map(|&c| ((c + alpha) / denominator).ln())
                    .collect()
            })
            .collect();

        Ok(Self {
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    /// Categories the model can predict
    pub fn classes(&self) -> &[Category] {
        &self.classes
    }

    /// Posterior probability of every class, in `classes()` order
    pub fn predict_proba(&self, features: &SparseVector) -> Result<Vec<f64>> {
        let num_features = self.feature_log_prob.first().map_or(0, Vec::len);

        let mut joint = Vec::with_capacity(self.classes.len());
        for (prior, log_prob) in self.class_log_prior.iter().zip(&self.feature_log_prob) {
            let mut score = *prior;
            for &(index, weight) in features {
                let lp = log_prob.get(index).ok_or_else(|| {
                    Error::model(format!("feature {} outside model width {}", index, num_features))
                })?;
                score += weight * lp;
            }
            joint.push(score);
        }

        // log-sum-exp normalization
        let max = joint.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(Error::model("non-finite class scores"));
        }
        let sum: f64 = joint.iter().map(|s| (s - max).exp()).sum();
        Ok(joint.iter().map(|s| (s - max).exp() / sum).collect())
    }

    /// Most probable class and its probability
    pub fn predict(&self, features: &SparseVector) -> Result<(Category, f64)> {
        let proba = self.predict_proba(features)?;
        proba
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((i, p)),
            })
            .map(|(i, p)| (self.classes[i], p))
            .ok_or_else(|| Error::model("model has no classes"))
    }

    /// Check internal dimensions after deserialization
    pub fn validate(&self, num_features: usize) -> Result<()> {
        if self.classes.is_empty() {
            return Err(Error::model("model has no classes"));
        }
        if self.class_log_prior.len() != self.classes.len()
            || self.feature_log_prob.len() != self.classes.len()
        {
            return Err(Error::model("class tables disagree in length"));
        }
        if self.feature_log_prob.iter().any(|row| row.len() != num_features) {
            return Err(Error::model(format!(
                "feature table width does not match vocabulary of {}",
                num_features
            )));
        }
        Ok(())
    }
}
