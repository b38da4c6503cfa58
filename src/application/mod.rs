//! Application layer: Use cases and services.
//!
//! This module composes the domain stages with the classifier port into
//! the single `score` operation exposed to the presentation layer.

mod scoring;

pub use scoring::ScoringService;
