//! Error types for notification channels.

/// Result type alias for channel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Channel error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// SMTP delivery error.
    #[error(transparent)]
    Smtp(#[from] herald_smtp::Error),

    /// Address or envelope error.
    #[error(transparent)]
    Mime(#[from] herald_mime::Error),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The vendor answered but refused the message while failing fast.
    #[error("{vendor} rejected the message: {message}")]
    Rejected {
        /// Vendor name.
        vendor: &'static str,
        /// Vendor-supplied or derived reason.
        message: String,
        /// HTTP status of the vendor reply.
        http_status: Option<u16>,
    },
}

impl Error {
    /// Returns the HTTP status behind a rejection, if any.
    #[must_use]
    pub const fn http_status(&self) -> Option<u16> {
        match self {
            Self::Rejected { http_status, .. } => *http_status,
            _ => None,
        }
    }
}
