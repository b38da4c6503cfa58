//! Errors raised by the scoring pipeline itself.

/// The two failure kinds of a scoring call.
///
/// Neither is recoverable per request: a `Configuration` error means the
/// trained artifacts disagree with the fixed attribute schema, and an
/// `InvariantViolation` means a stage broke its own postcondition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl ScoringError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// True for errors caused by the trained artifacts rather than by code.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
