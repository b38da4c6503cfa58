//! Logistic regression adapter: Implementation of `RiskClassifier`.
//!
//! `p = sigmoid(w . x + b)` over the standardized attribute vector, the model
//! family the exported artifacts are trained with ("balanced" class weights
//! only affect training, not inference).

use serde::Serialize;

use crate::domain::{NormalizedVector, ScoringError};
use crate::ports::RiskClassifier;

/// Trained logistic regression weights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogisticRegression {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticRegression {
    /// Create a model from trained weights.
    ///
    /// # Errors
    /// Returns `ScoringError::Configuration` if there are no coefficients or
    /// any weight is not finite.
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, ScoringError> {
        let model = Self {
            coefficients,
            intercept,
        };
        model.check()?;
        Ok(model)
    }

    /// Validate weights.
    ///
    /// # Errors
    /// Returns `ScoringError::Configuration` on empty or non-finite weights.
    pub fn check(&self) -> Result<(), ScoringError> {
        if self.coefficients.is_empty() {
            return Err(ScoringError::configuration(
                "Logistic regression has no coefficients",
            ));
        }
        if let Some(i) = self.coefficients.iter().position(|w| !w.is_finite()) {
            return Err(ScoringError::configuration(format!(
                "Coefficient {i} is not finite"
            )));
        }
        if !self.intercept.is_finite() {
            return Err(ScoringError::configuration("Intercept is not finite"));
        }
        Ok(())
    }

    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Linear predictor `w . x + b`.
    fn logit(&self, x: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(x)
            .fold(self.intercept, |acc, (w, xi)| acc + w * xi)
    }
}

/// Logistic function, evaluated so `exp` never overflows.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl RiskClassifier for LogisticRegression {
    fn input_dim(&self) -> usize {
        self.coefficients.len()
    }

    fn score(&self, vector: &NormalizedVector) -> Result<f64, ScoringError> {
        if vector.len() != self.input_dim() {
            return Err(ScoringError::configuration(format!(
                "Classifier expects {} features, got {}",
                self.input_dim(),
                vector.len()
            )));
        }

        let z = self.logit(vector.as_slice());
        tracing::trace!("logit={z:.6}");
        Ok(sigmoid(z))
    }
}
