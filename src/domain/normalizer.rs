//! Feature normalization with pre-fitted standard-scaler parameters.
//!
//! Applies `(raw[i] - mean[i]) / scale[i]` per attribute, in canonical order.

use serde::{Deserialize, Serialize};

use super::attributes::{AttributeVector, FEATURE_NAMES, NUM_FEATURES};
use super::ScoringError;

/// Per-attribute `(mean, scale)` pairs learned at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParameters {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl NormalizationParameters {
    /// Parameters fitted on the canonical attribute order.
    #[must_use]
    pub fn new(mean: [f64; NUM_FEATURES], scale: [f64; NUM_FEATURES]) -> Self {
        Self {
            feature_names: FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect(),
            mean: mean.to_vec(),
            scale: scale.to_vec(),
        }
    }

    /// Number of attributes these parameters cover.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.feature_names.len()
    }

    /// Check the parameters against the fixed attribute schema.
    ///
    /// # Errors
    /// Returns `ScoringError::Configuration` on a length mismatch, a reordered
    /// or renamed attribute, a non-finite mean, or a zero / non-finite scale.
    pub fn check(&self) -> Result<(), ScoringError> {
        if self.feature_names.len() != NUM_FEATURES
            || self.mean.len() != NUM_FEATURES
            || self.scale.len() != NUM_FEATURES
        {
            return Err(ScoringError::configuration(format!(
                "Scaler covers {} names / {} means / {} scales, expected {NUM_FEATURES}",
                self.feature_names.len(),
                self.mean.len(),
                self.scale.len()
            )));
        }

        for (i, expected) in FEATURE_NAMES.iter().enumerate() {
            if self.feature_names[i] != *expected {
                return Err(ScoringError::configuration(format!(
                    "Scaler attribute {i} is {:?}, expected {expected:?}",
                    self.feature_names[i]
                )));
            }
            if !self.mean[i].is_finite() {
                return Err(ScoringError::configuration(format!(
                    "Scaler mean for {expected} is not finite"
                )));
            }
            check_scale(expected, self.scale[i])?;
        }

        Ok(())
    }
}

fn check_scale(name: &str, scale: f64) -> Result<(), ScoringError> {
    if scale == 0.0 || !scale.is_finite() {
        return Err(ScoringError::configuration(format!(
            "Degenerate scale {scale} for {name}"
        )));
    }
    Ok(())
}

/// Output of the normalizer; input of the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedVector(Vec<f64>);

impl NormalizedVector {
    /// Wrap already-normalized values.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Applies immutable scaler parameters to attribute vectors.
#[derive(Debug, Clone)]
pub struct Normalizer {
    params: NormalizationParameters,
}

impl Normalizer {
    #[must_use]
    pub fn new(params: NormalizationParameters) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &NormalizationParameters {
        &self.params
    }

    /// Output dimensionality.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.params.dim()
    }

    /// Normalize one attribute vector.
    ///
    /// # Errors
    /// Returns `ScoringError::Configuration` if the parameters do not cover
    /// exactly the eight attributes or any scale is degenerate. The division is
    /// never attempted with a zero scale.
    pub fn normalize(&self, attrs: &AttributeVector) -> Result<NormalizedVector, ScoringError> {
        let raw = attrs.to_array();
        let p = &self.params;

        if p.mean.len() != raw.len() || p.scale.len() != raw.len() || p.dim() != raw.len() {
            return Err(ScoringError::configuration(format!(
                "Scaler dimension {} does not match {} attributes",
                p.dim(),
                raw.len()
            )));
        }

        let mut out = Vec::with_capacity(raw.len());
        for (i, x) in raw.iter().enumerate() {
            check_scale(FEATURE_NAMES[i], p.scale[i])?;
            out.push((x - p.mean[i]) / p.scale[i]);
        }

        Ok(NormalizedVector(out))
    }
}
