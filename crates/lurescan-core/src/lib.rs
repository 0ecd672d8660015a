//! LureScan Core
//!
//! Core types shared across LureScan components.
//!
//! This crate provides:
//! - The classification domains (`url`, `message`) and binary labels
//! - Fixed-order feature vectors produced by the extractors
//! - Detection results handed back to callers
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{DetectionResult, Domain, FeatureVector, Label};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{DetectionResult, Domain, FeatureVector, Label};
}
