//! Ports layer: Trait definitions for external collaborators.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the scoring pipeline and the trained model / artifact storage.

mod artifacts;
mod classifier;

pub use artifacts::{ArtifactSource, TrainedArtifacts};
pub use classifier::RiskClassifier;
