//! # Glucorisk
//!
//! Diabetes risk scoring from eight patient attributes.
//!
//! This crate provides:
//! - Standard-scaler normalization with pre-fitted parameters
//! - Logistic regression scoring behind a classifier port
//! - Risk banding (Low / Medium / High) with guidance text
//! - Signed loading of the trained artifacts
//!
//! This is not a diagnostic system. The only guarantee is determinism for
//! fixed inputs and fixed artifacts.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Attribute vector, normalizer, risk bands, scoring result
//! - `ports`: Trait definitions for the classifier and artifact source
//! - `adapters`: Concrete implementations (logistic regression, artifact files, log sanitizer)
//! - `application`: The scoring service built once at startup

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub use application::ScoringService;
pub use domain::{AttributeVector, RiskCategory, ScoringError, ScoringResult};

/// Result type for Glucorisk operations
pub type Result<T> = std::result::Result<T, GlucoriskError>;

/// Main error type for Glucorisk
#[derive(Debug, thiserror::Error)]
pub enum GlucoriskError {
    #[error(transparent)]
    Scoring(#[from] domain::ScoringError),

    #[error("Artifact loading failed: {0}")]
    Artifact(#[from] adapters::ArtifactError),

    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
