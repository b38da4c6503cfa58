//! Classifier port: Trait for a trained probabilistic binary classifier.
//!
//! This trait hides the model family from the scoring service.

use crate::domain::{NormalizedVector, ScoringError};

/// A trained model exposing "probability of the positive class".
///
/// Implementations are immutable after construction and must be safe to
/// call concurrently from many threads.
pub trait RiskClassifier: Send + Sync {
    /// Dimensionality the model was trained on.
    fn input_dim(&self) -> usize;

    /// Score one normalized vector.
    ///
    /// # Returns
    /// The probability that the condition is present, in [0, 1].
    ///
    /// # Errors
    /// Returns `ScoringError::Configuration` if `vector.len() != self.input_dim()`.
    fn score(&self, vector: &NormalizedVector) -> Result<f64, ScoringError>;
}

