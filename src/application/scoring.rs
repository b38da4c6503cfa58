//! Scoring service: Runs the risk scoring pipeline.
//!
//! This service coordinates:
//! - Normalization of the raw attribute vector
//! - Classifier scoring
//! - Probability postcondition check
//! - Decision and risk banding
//!
//! It is built once at startup from the trained artifacts and then shared
//! read-only; `score` takes `&self` and keeps no state between calls.

use std::sync::Arc;

use crate::adapters::LogisticRegression;
use crate::domain::{
    AttributeVector, NormalizationParameters, Normalizer, ScoringError, ScoringResult,
};
use crate::ports::{ArtifactSource, RiskClassifier, TrainedArtifacts};

/// Immutable scoring context: scaler parameters plus trained classifier.
pub struct ScoringService<C>
where
    C: RiskClassifier,
{
    normalizer: Normalizer,
    classifier: Arc<C>,
}

impl<C> ScoringService<C>
where
    C: RiskClassifier,
{
    /// Create a new scoring service.
    ///
    /// No checks are made here; call [`verify`](Self::verify) at startup to
    /// surface artifact defects before the first request.
    pub fn new(scaler: NormalizationParameters, classifier: Arc<C>) -> Self {
        Self {
            normalizer: Normalizer::new(scaler),
            classifier,
        }
    }

    /// Check that the scaler and classifier fit the attribute schema and
    /// each other.
    ///
    /// # Errors
    /// Returns `ScoringError::Configuration` describing the first mismatch.
    pub fn verify(&self) -> Result<(), ScoringError> {
        self.normalizer.params().check()?;

        let expected = self.classifier.input_dim();
        if self.normalizer.dim() != expected {
            return Err(ScoringError::Configuration(format!(
                "Scaler produces {} features, classifier expects {expected}",
                self.normalizer.dim()
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    #[must_use]
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Score one attribute vector.
    ///
    /// Performs the full pipeline:
    /// 1. Normalize attributes
    /// 2. Classify
    /// 3. Check the probability lies in [0, 1]
    /// 4. Derive decision and risk band
    ///
    /// # Errors
    /// Returns `ScoringError::Configuration` on an artifact/schema mismatch and
    /// `ScoringError::InvariantViolation` if the classifier returns a value
    /// outside [0, 1]. No partial result is produced.
    pub fn score(&self, attrs: &AttributeVector) -> Result<ScoringResult, ScoringError> {
        tracing::debug!("Step 1: Normalizing attributes...");
        let normalized = self.normalizer.normalize(attrs)?;

        let expected = self.classifier.input_dim();
        if normalized.len() != expected {
            return Err(ScoringError::Configuration(format!(
                "Normalized vector has {} features, classifier expects {expected}",
                normalized.len()
            )));
        }

        tracing::debug!("Step 2: Scoring with classifier...");
        let probability = self.classifier.score(&normalized)?;

        tracing::debug!("Step 3: Banding probability...");
        let result = ScoringResult::from_probability(probability).map_err(|e| {
            tracing::error!("Classifier broke its contract: {e}");
            e
        })?;

        tracing::info!(
            "Scoring complete: probability={:.4}, decision={}, risk={}",
            result.probability,
            result.decision,
            result.risk_category
        );

        Ok(result)
    }
}

impl ScoringService<LogisticRegression> {
    /// Build and verify a service from loaded artifacts.
    ///
    /// # Errors
    /// Returns `ScoringError::Configuration` if the artifacts are inconsistent.
    pub fn from_artifacts(artifacts: TrainedArtifacts) -> Result<Self, ScoringError> {
        let service = Self::new(artifacts.scaler, Arc::new(artifacts.classifier));
        service.verify()?;
        Ok(service)
    }

    /// Load artifacts from `source` and build a verified service.
    ///
    /// # Errors
    /// Returns error if loading or verification fails.
    pub fn load(source: &impl ArtifactSource) -> crate::Result<Self> {
        tracing::info!("Loading trained artifacts...");
        let artifacts = source.load()?;
        Ok(Self::from_artifacts(artifacts)?)
    }
}
