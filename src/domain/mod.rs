//! Domain layer: Core scoring types and the pure pipeline stages.
//!
//! Nothing here performs I/O. All stages are deterministic functions of
//! their inputs and the immutable trained parameters.

mod attributes;
mod error;
mod normalizer;
mod risk;

pub use attributes::{AttributeVector, FEATURE_NAMES, NUM_FEATURES};
pub use error::ScoringError;
pub use normalizer::{NormalizationParameters, NormalizedVector, Normalizer};
pub use risk::{band, RiskBand, RiskCategory, ScoringResult, DECISION_THRESHOLD, RISK_BANDS};
