//! Adapters layer: Concrete implementations of ports.
//!
//! - `logistic`: logistic regression classifier
//! - `artifacts`: signed artifact loading from disk
//! - `sanitize`: patient-data filtering for logs

pub mod artifacts;
pub mod logistic;
pub mod sanitize;

pub use artifacts::{ArtifactError, FileArtifactSource};
pub use logistic::LogisticRegression;
