//! Core domain types for CivicSort

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Complaint category.
///
/// The set is fixed; the declaration order is also the order in which the
/// keyword fallback tests categories, with `Other` last as the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Potholes,
    Garbage,
    Streetlight,
    Water,
    Electricity,
    Drainage,
    Traffic,
    Other,
}

impl Category {
    /// Every category, in fallback order
    pub const ALL: [Category; 8] = [
        Category::Potholes,
        Category::Garbage,
        Category::Streetlight,
        Category::Water,
        Category::Electricity,
        Category::Drainage,
        Category::Traffic,
        Category::Other,
    ];

    /// Wire / storage label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Potholes => "potholes",
            Self::Garbage => "garbage",
            Self::Streetlight => "streetlight",
            Self::Water => "water",
            Self::Electricity => "electricity",
            Self::Drainage => "drainage",
            Self::Traffic => "traffic",
            Self::Other => "other",
        }
    }

    /// All labels, in fallback order
    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|c| c.as_str().to_string()).collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| Error::invalid_category(s))
    }
}

/// Complaint priority, ordered by severity (`Critical` is greatest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a prediction was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMethod {
    /// The trained statistical model
    Model,
    /// Category keyword match
    KeywordFallback,
    /// Nothing matched
    Default,
}

impl PredictionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::KeywordFallback => "keyword_fallback",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for PredictionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one complaint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted category
    pub category: Category,

    /// Confidence score (0.0-1.0)
    pub confidence: f64,

    /// Path that produced the prediction
    pub method: PredictionMethod,
}

impl PredictionResult {
    /// Create a result, clamping confidence into [0, 1] and rounding to 3 decimals
    pub fn new(category: Category, confidence: f64, method: PredictionMethod) -> Self {
        let confidence = if confidence.is_finite() {
            round3(confidence.clamp(0.0, 1.0))
        } else {
            0.0
        };
        Self {
            category,
            confidence,
            method,
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!("water".parse::<Category>().unwrap(), Category::Water);
        assert_eq!(" Traffic ".parse::<Category>().unwrap(), Category::Traffic);
        assert!("roads".parse::<Category>().is_err());
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_labels_in_fallback_order() {
        let labels = Category::labels();
        assert_eq!(labels.len(), 8);
        assert_eq!(labels[0], "potholes");
        assert_eq!(labels[7], "other");
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn test_serde_labels() {
        let json = serde_json::to_string(&Category::Streetlight).unwrap();
        assert_eq!(json, "\"streetlight\"");

        let json = serde_json::to_string(&PredictionMethod::KeywordFallback).unwrap();
        assert_eq!(json, "\"keyword_fallback\"");

        let json = serde_json::to_string(&Priority::Critical).unwrap();
        assert_eq!(json, "\"Critical\"");

        let category: Category = serde_yaml::from_str("drainage").unwrap();
        assert_eq!(category, Category::Drainage);
    }

    #[test]
    fn test_prediction_result_rounding() {
        let result = PredictionResult::new(Category::Water, 0.123_456, PredictionMethod::Model);
        assert_eq!(result.confidence, 0.123);

        let result = PredictionResult::new(Category::Water, 1.7, PredictionMethod::Model);
        assert_eq!(result.confidence, 1.0);

        let result = PredictionResult::new(Category::Other, f64::NAN, PredictionMethod::Default);
        assert_eq!(result.confidence, 0.0);
    }
}
