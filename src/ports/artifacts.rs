//! Artifact source port: Trait for loading the trained scaler and classifier.
//!
//! Loading happens once at startup; the result is treated as immutable for
//! the lifetime of the process.

use crate::adapters::{ArtifactError, LogisticRegression};
use crate::domain::NormalizationParameters;

/// The scaler/classifier pair produced by one training run.
#[derive(Debug, Clone)]
pub struct TrainedArtifacts {
    pub scaler: NormalizationParameters,
    pub classifier: LogisticRegression,
}

/// Trait for anything that can produce trained artifacts.
pub trait ArtifactSource {
    /// Load and verify the artifacts.
    ///
    /// # Errors
    /// Returns error if the artifacts are unreadable, fail integrity checks,
    /// or do not match the attribute schema.
    fn load(&self) -> Result<TrainedArtifacts, ArtifactError>;
}
