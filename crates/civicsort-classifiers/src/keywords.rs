//! Keyword fallback classifier
//!
//! Used when no statistical model is loaded or the model cannot score the text.

use crate::classifier::{ClassificationMetadata, ClassificationResult, Classifier};
use aho_corasick::AhoCorasick;
use civicsort_core::{Category, Error, PredictionMethod, Result};
use std::time::Instant;

/// Category keyword lists, in the order categories are tested
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Potholes, &["pothole", "road damage", "road repair", "crack", "bump"]),
    (Category::Garbage, &["garbage", "trash", "waste", "dump", "clean", "sanitation"]),
    (Category::Streetlight, &["street light", "lamp post", "light", "dark", "illumination"]),
    (Category::Water, &["water", "leak", "pipe", "pressure", "supply", "quality"]),
    (Category::Electricity, &["power", "electric", "outage", "wire", "shock", "transformer"]),
    (Category::Drainage, &["drain", "sewage", "water logging", "block", "overflow"]),
    (Category::Traffic, &["traffic", "signal", "congestion", "parking", "road sign"]),
];

/// Substring keyword matcher. The first category in list order with any
/// matching keyword wins, regardless of where in the text the match sits.
pub struct KeywordClassifier {
    matcher: AhoCorasick,
    pattern_categories: Vec<Category>,
    keyword_confidence: f64,
    default_confidence: f64,
}

impl KeywordClassifier {
    /// Create a classifier over the built-in keyword lists
    pub fn new(keyword_confidence: f64, default_confidence: f64) -> Result<Self> {
        let mut patterns = Vec::new();
        let mut pattern_categories = Vec::new();
        for (category, keywords) in CATEGORY_KEYWORDS {
            for keyword in *keywords {
                patterns.push(*keyword);
                pattern_categories.push(*category);
            }
        }

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&patterns)
            .map_err(|e| Error::internal(format!("Failed to build keyword matcher: {}", e)))?;

        Ok(Self {
            matcher,
            pattern_categories,
            keyword_confidence,
            default_confidence,
        })
    }

    /// Classify already-combined complaint text. Never fails.
    pub fn classify_text(&self, text: &str) -> ClassificationResult {
        let start = Instant::now();
        let lowered = text.to_lowercase();

        // Overlapping search so a keyword hidden inside a longer match still counts.
        let best = self
            .matcher
            .find_overlapping_iter(&lowered)
            .min_by_key(|m| (self.pattern_categories[m.pattern().as_usize()], m.start()));

        let mut result = match best {
            Some(m) => {
                let category = self.pattern_categories[m.pattern().as_usize()];
                ClassificationResult {
                    category,
                    score: self.keyword_confidence,
                    method: PredictionMethod::KeywordFallback,
                    metadata: ClassificationMetadata {
                        matched_keyword: Some(lowered[m.start()..m.end()].to_string()),
                        all_scores: None,
                    },
                    latency_us: 0,
                }
            }
            None => ClassificationResult::new(
                Category::Other,
                self.default_confidence,
                PredictionMethod::Default,
            ),
        };
        result.latency_us = start.elapsed().as_micros() as u64;
        result
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(0.7, 0.5).expect("Failed to create keyword classifier")
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Result<ClassificationResult> {
        Ok(self.classify_text(text))
    }

    fn name(&self) -> &str {
        "keyword-fallback"
    }
}
