//! CivicSort Core
//!
//! Core types and error handling shared across CivicSort components.
//!
//! This crate provides:
//! - The fixed complaint category set and priority ladder
//! - The prediction result value returned by every classification
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Category, PredictionMethod, PredictionResult, Priority};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Category, PredictionMethod, PredictionResult, Priority};
}
