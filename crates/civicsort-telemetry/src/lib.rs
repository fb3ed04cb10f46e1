//! CivicSort Telemetry
//!
//! Operational telemetry for the classification engine.
//!
//! Provides:
//! - Lock-free counters for classification, prioritization and retraining
//! - A hash-chained audit trail of model changes

pub mod audit;
pub mod metrics;

pub use audit::{AuditEvent, AuditSeverity, AuditTrail};
pub use metrics::{MetricsCollector, MetricsSnapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::audit::{AuditEvent, AuditSeverity, AuditTrail};
    pub use crate::metrics::{MetricsCollector, MetricsSnapshot};
}
