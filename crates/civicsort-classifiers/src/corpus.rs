//! Labelled training corpus

use civicsort_core::Category;
use serde::{Deserialize, Serialize};

const SEED: &[(&str, Category)] = &[
    ("large pothole on main street causing traffic", Category::Potholes),
    ("garbage accumulation near park smells bad", Category::Garbage),
    ("street light not working on 5th avenue", Category::Streetlight),
    ("water leak from main pipe near school", Category::Water),
    ("power outage in downtown area since morning", Category::Electricity),
    ("drainage blocked causing water logging", Category::Drainage),
    ("traffic signal malfunction at intersection", Category::Traffic),
    ("noise pollution from construction site", Category::Other),
    ("road repair needed after rain damage", Category::Potholes),
    ("illegal dumping in residential area", Category::Garbage),
    ("broken lamp post needs replacement", Category::Streetlight),
    ("low water pressure in apartment building", Category::Water),
    ("electrical wire hanging dangerously", Category::Electricity),
    ("sewage overflow near hospital", Category::Drainage),
    ("road sign missing on highway", Category::Traffic),
    ("public park maintenance required", Category::Other),
];

/// Texts and labels kept in lock-step; the only mutation is a paired append
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingCorpus {
    texts: Vec<String>,
    labels: Vec<Category>,
}

impl TrainingCorpus {
    /// Create an empty corpus
    pub fn new() -> Self {
        Self::default()
    }

    /// The bundled seed corpus, two examples per category
    pub fn seed() -> Self {
        let mut corpus = Self::new();
        for (text, label) in SEED {
            corpus.push(*text, *label);
        }
        corpus
    }

    /// Append one labelled example
    pub fn push(&mut self, text: impl Into<String>, label: Category) {
        self.texts.push(text.into());
        self.labels.push(label);
    }

    /// Copy of this corpus with one more example
    pub fn with_example(&self, text: impl Into<String>, label: Category) -> Self {
        let mut next = self.clone();
        next.push(text, label);
        next
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn labels(&self) -> &[Category] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Iterate (text, label) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Category)> {
        self.texts
            .iter()
            .map(String::as_str)
            .zip(self.labels.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_covers_every_category() {
        let corpus = TrainingCorpus::seed();
        assert_eq!(corpus.len(), 16);
        for category in Category::ALL {
            assert_eq!(corpus.labels().iter().filter(|&&c| c == category).count(), 2);
        }
    }

    #[test]
    fn test_with_example_leaves_source_untouched() {
        let corpus = TrainingCorpus::seed();
        let next = corpus.with_example("fallen tree blocking lane", Category::Traffic);
        assert_eq!(corpus.len(), 16);
        assert_eq!(next.len(), 17);
        assert_eq!(next.texts().len(), next.labels().len());
        assert_eq!(
            next.iter().last(),
            Some(("fallen tree blocking lane", Category::Traffic))
        );
    }
}
