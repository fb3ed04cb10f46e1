//! TF-IDF feature extraction
//!
//! Tokens are runs of two or more word characters, lower-cased. Stop words are
//! dropped before n-grams are built, so a bigram may join words that were not
//! adjacent in the raw text. The vocabulary keeps the `max_features` terms with
//! the highest corpus frequency (ties broken alphabetically) and is indexed in
//! alphabetical order. Weights are raw counts times smoothed IDF, L2-normalized.

use crate::config::VectorizerConfig;
use crate::stop_words::is_stop_word;
use civicsort_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"))
}

/// Sparse feature vector: (feature index, weight), sorted by index
pub type SparseVector = Vec<(usize, f64)>;

/// Fitted TF-IDF vectorizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn vocabulary and IDF weights from the documents
    pub fn fit<S: AsRef<str>>(config: &VectorizerConfig, documents: &[S]) -> Result<Self> {
        if documents.is_empty() {
            return Err(Error::training("cannot fit vectorizer on an empty corpus"));
        }

        let mut term_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut doc_terms = Vec::with_capacity(documents.len());
        for doc in documents {
            let terms = analyze(config, doc.as_ref());
            for term in &terms {
                *term_counts.entry(term.clone()).or_insert(0) += 1;
            }
            doc_terms.push(terms);
        }

        if term_counts.is_empty() {
            return Err(Error::training(
                "empty vocabulary; documents contain only stop words",
            ));
        }

        // BTreeMap iteration is alphabetical and the sort is stable.
        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(config.max_features);
        let mut kept: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort();

        let vocabulary: HashMap<String, usize> = kept
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        let mut document_frequency = vec![0usize; vocabulary.len()];
        for terms in &doc_terms {
            let mut seen: Vec<usize> = terms.iter().filter_map(|t| vocabulary.get(t).copied()).collect();
            seen.sort_unstable();
            seen.dedup();
            for index in seen {
                document_frequency[index] += 1;
            }
        }

        let n = documents.len() as f64;
        let idf = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        Ok(Self {
            config: config.clone(),
            vocabulary,
            idf,
        })
    }

    /// Number of features in the vocabulary
    pub fn num_features(&self) -> usize {
        self.idf.len()
    }

    /// Whether the term is part of the fitted vocabulary
    pub fn contains(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    /// Transform one document; out-of-vocabulary terms are ignored
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in analyze(&self.config, document) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect();

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in &mut vector {
                *weight /= norm;
            }
        }
        vector
    }

    /// Check that the vocabulary and IDF table agree
    pub fn validate(&self) -> Result<()> {
        if self.vocabulary.len() != self.idf.len() {
            return Err(Error::model(format!(
                "vocabulary has {} terms but {} idf weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        if self.vocabulary.values().any(|&i| i >= self.idf.len()) {
            return Err(Error::model("vocabulary index out of range"));
        }
        Ok(())
    }
}

/// Tokenize, drop stop words and expand into n-grams
fn analyze(config: &VectorizerConfig, text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| !config.stop_words || !is_stop_word(t))
        .collect();

    let mut terms = Vec::new();
    for n in config.ngram_min..=config.ngram_max {
        if n == 0 || n > tokens.len() {
            continue;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}
