//! Rule-based complaint prioritizer

use aho_corasick::AhoCorasick;
use civicsort_core::{Category, Error, Priority, Result};

/// Words that make any complaint critical
pub const URGENT_KEYWORDS: &[&str] = &[
    "emergency", "urgent", "danger", "accident", "fire", "flood", "collapse",
];

/// Words that raise a complaint to at least `High`
pub const ESCALATION_KEYWORDS: &[&str] = &["broken", "leak", "outage", "blocked", "hazard", "safety"];

/// Default priority for each category before description keywords apply
pub fn base_priority(category: Category) -> Priority {
    match category {
        Category::Electricity | Category::Water | Category::Drainage => Priority::High,
        Category::Traffic | Category::Potholes | Category::Streetlight => Priority::Medium,
        Category::Garbage | Category::Other => Priority::Low,
    }
}

/// Derives a priority from category and description.
///
/// Rules, in order: any urgent keyword yields `Critical`; otherwise the
/// category base priority, raised to `High` by any escalation keyword.
pub struct Prioritizer {
    urgent: AhoCorasick,
    escalation: AhoCorasick,
}

impl Prioritizer {
    pub fn new() -> Result<Self> {
        let build = |words: &[&str]| {
            AhoCorasick::builder()
                .ascii_case_insensitive(true)
                .build(words)
                .map_err(|e| Error::internal(format!("Failed to build priority matcher: {}", e)))
        };

        Ok(Self {
            urgent: build(URGENT_KEYWORDS)?,
            escalation: build(ESCALATION_KEYWORDS)?,
        })
    }

    /// Prioritize using a category label; unknown labels start at `Medium`
    pub fn prioritize(&self, category: &str, description: &str) -> Priority {
        let base = category
            .parse::<Category>()
            .map(base_priority)
            .unwrap_or(Priority::Medium);
        self.apply_rules(base, description)
    }

    /// Prioritize using a known category
    pub fn prioritize_category(&self, category: Category, description: &str) -> Priority {
        self.apply_rules(base_priority(category), description)
    }

    fn apply_rules(&self, base: Priority, description: &str) -> Priority {
        let text = description.to_lowercase();

        if self.urgent.is_match(&text) {
            return Priority::Critical;
        }

        if self.escalation.is_match(&text) {
            return base.max(Priority::High);
        }

        base
    }
}

impl Default for Prioritizer {
    fn default() -> Self {
        Self::new().expect("Failed to create prioritizer")
    }
}
