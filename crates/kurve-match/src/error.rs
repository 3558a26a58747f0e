//! Error types for the match handoff layer.

/// Errors that can occur when interacting with the match subsystem.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// The driver declined to start a match.
    #[error("match start rejected: {0}")]
    Rejected(String),

    /// The match subsystem is gone (channel closed, task dead).
    #[error("match subsystem unavailable")]
    Unavailable,
}
