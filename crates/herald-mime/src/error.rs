//! Error types for message composition.

/// Result type alias for message composition.
pub type Result<T> = std::result::Result<T, Error>;

/// Message composition error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Email address failed syntax validation.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Header block requested for an envelope without a sender.
    #[error("Message has no sender")]
    MissingSender,

    /// Envelope without a single To, Cc or Bcc recipient.
    #[error("No recipients specified")]
    NoRecipients,
}
