//! Hash-chained audit trail of model changes

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Append-only trail where each event commits to the one before it
pub struct AuditTrail {
    inner: RwLock<Chain>,
}

#[derive(Default)]
struct Chain {
    events: Vec<AuditEvent>,
    head: Option<String>,
}

impl AuditTrail {
    /// Create a new audit trail
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Chain::default()),
        }
    }

    /// Add an event, linking it to the current head
    pub fn add_event(&self, mut event: AuditEvent) -> String {
        let mut chain = self.inner.write();
        event.previous_hash = chain.head.clone();

        let hash = compute_hash(&event);
        event.hash = Some(hash.clone());
        debug!(event_type = %event.event_type, hash = %hash, "Audit event recorded");

        chain.head = Some(hash.clone());
        chain.events.push(event);
        hash
    }

    /// Verify the integrity of the audit trail
    pub fn verify(&self) -> bool {
        verify_chain(&self.inner.read().events)
    }

    /// Copy of all events, oldest first
    pub fn events(&self) -> Vec<AuditEvent> {
        self.inner.read().events.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new()
    }
}

/// Check hash links and contents of a sequence of events
pub fn verify_chain(events: &[AuditEvent]) -> bool {
    let mut prev_hash: Option<String> = None;

    for event in events {
        if event.previous_hash != prev_hash {
            return false;
        }

        let computed_hash = compute_hash(event);
        if event.hash.as_ref() != Some(&computed_hash) {
            return false;
        }

        prev_hash = event.hash.clone();
    }

    true
}

/// Hash over everything except the event's own hash
fn compute_hash(event: &AuditEvent) -> String {
    let mut hasher = Sha256::new();

    hasher.update(event.id.as_bytes());
    hasher.update(event.event_type.as_bytes());
    if let Some(ref data) = event.data {
        hasher.update(data.as_bytes());
    }
    hasher.update(event.timestamp.to_rfc3339().as_bytes());
    hasher.update(event.severity.as_str().as_bytes());
    if let Some(ref prev) = event.previous_hash {
        hasher.update(prev.as_bytes());
    }

    format!("{:x}", hasher.finalize())
}

/// A single audit event in the trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event id
    pub id: String,

    /// Event type, e.g. `feedback_retrain`
    pub event_type: String,

    /// Event data (JSON serialized)
    pub data: Option<String>,

    pub timestamp: DateTime<Utc>,

    /// Hash of this event
    pub hash: Option<String>,

    /// Hash of previous event (for chaining)
    pub previous_hash: Option<String>,

    pub severity: AuditSeverity,
}

impl AuditEvent {
    /// Create a new audit event
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            data: None,
            timestamp: Utc::now(),
            hash: None,
            previous_hash: None,
            severity: AuditSeverity::Info,
        }
    }

    /// Set event data
    pub fn with_data(mut self, data: impl Serialize) -> Self {
        self.data = serde_json::to_string(&data).ok();
        self
    }

    /// Set severity
    pub fn with_severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    Info,
    Warning,
    High,
}

impl AuditSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::High => "high",
        }
    }
}
