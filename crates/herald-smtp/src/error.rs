//! Error types for SMTP delivery.

use crate::transcript::{Step, Transcript};
use std::io;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Address or header composition error.
    #[error(transparent)]
    Mime(#[from] herald_mime::Error),

    /// The socket could not be opened.
    #[error("Failed to connect to {host}:{port}: {source}")]
    Connection {
        /// Server hostname.
        host: String,
        /// Server port.
        port: u16,
        /// Underlying I/O error (refused, timed out, resolution failure).
        #[source]
        source: io::Error,
    },

    /// A step got an unexpected reply while failing fast.
    #[error("Unexpected reply at {step}: expected {expected}, got {}", display_code(.got))]
    ProtocolMismatch {
        /// Step that failed.
        step: Step,
        /// Reply code the step expected.
        expected: u16,
        /// Reply code received, if one could be parsed.
        got: Option<u16>,
        /// Transcript up to and including the failed step.
        transcript: Box<Transcript>,
    },

    /// STARTTLS was refused or the TLS handshake failed.
    #[error("TLS upgrade failed: {0}")]
    TlsUpgrade(String),

    /// No socket primitive is usable from the calling context.
    #[error("Unsupported transport: {0}")]
    UnsupportedTransport(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns the reply code behind a protocol mismatch, if any.
    #[must_use]
    pub const fn reply_code(&self) -> Option<u16> {
        match self {
            Self::ProtocolMismatch { got, .. } => *got,
            _ => None,
        }
    }

    /// Returns true if the server rejected a step permanently (5xx).
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self.reply_code(), Some(code) if code >= 500 && code < 600)
    }

    /// Returns true if the server rejected a step transiently (4xx).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.reply_code(), Some(code) if code >= 400 && code < 500)
    }

    /// Returns the transcript carried by the error, if any.
    #[must_use]
    pub fn transcript(&self) -> Option<&Transcript> {
        match self {
            Self::ProtocolMismatch { transcript, .. } => Some(transcript),
            _ => None,
        }
    }
}

#[allow(clippy::ref_option)]
fn display_code(code: &Option<u16>) -> String {
    code.map_or_else(|| "no valid reply".to_string(), |c| c.to_string())
}
