//! SMTP command builder.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Placeholder recorded in place of credential lines.
pub const REDACTED: &str = "<redacted>";

/// SMTP command.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// HELO - Simple greeting
    Helo {
        /// Client hostname
        hostname: String,
    },
    /// STARTTLS - Upgrade to TLS
    StartTls,
    /// AUTH LOGIN - Begin LOGIN authentication
    AuthLogin,
    /// Base64 credential line answering an AUTH LOGIN challenge
    Credential(String),
    /// MAIL FROM - Start mail transaction
    MailFrom {
        /// Sender address
        from: String,
    },
    /// RCPT TO - Add recipient
    RcptTo {
        /// Recipient address
        to: String,
    },
    /// DATA - Begin message data
    Data,
    /// QUIT - Close connection
    Quit,
}

impl Command {
    /// Builds the credential line for a username or password.
    #[must_use]
    pub fn credential(secret: &str) -> Self {
        Self::Credential(STANDARD.encode(secret.as_bytes()))
    }

    /// Serializes the command to bytes, CRLF terminated.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = self.to_line().into_bytes();
        buf.extend_from_slice(b"\r\n");
        buf
    }

    /// Returns the command as it may be logged or kept in a transcript.
    #[must_use]
    pub fn redacted(&self) -> String {
        match self {
            Self::Credential(_) => REDACTED.to_string(),
            _ => self.to_line(),
        }
    }

    fn to_line(&self) -> String {
        match self {
            Self::Helo { hostname } => format!("HELO {hostname}"),
            Self::StartTls => "STARTTLS".to_string(),
            Self::AuthLogin => "AUTH LOGIN".to_string(),
            Self::Credential(encoded) => encoded.clone(),
            Self::MailFrom { from } => format!("MAIL FROM:<{from}>"),
            Self::RcptTo { to } => format!("RCPT TO:<{to}>"),
            Self::Data => "DATA".to_string(),
            Self::Quit => "QUIT".to_string(),
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Prepares a message for the DATA phase.
///
/// Line endings are normalised to CRLF, every line starting with `.` gets
/// a second `.` (RFC 5321 section 4.5.2) and the `<CRLF>.<CRLF>`
/// terminator is appended.
#[must_use]
pub fn data_payload(message: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(message.len() + 64);

    for line in message.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.starts_with('.') {
            buf.push(b'.');
        }
        buf.extend_from_slice(line.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    buf.extend_from_slice(b".\r\n");
    buf
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_helo_command() {
        let cmd = Command::Helo {
            hostname: "client.example.com".to_string(),
        };
        assert_eq!(cmd.serialize(), b"HELO client.example.com\r\n");
    }

    #[test]
    fn test_starttls_command() {
        assert_eq!(Command::StartTls.serialize(), b"STARTTLS\r\n");
    }

    #[test]
    fn test_auth_login_sequence() {
        assert_eq!(Command::AuthLogin.serialize(), b"AUTH LOGIN\r\n");
        assert_eq!(Command::credential("user").serialize(), b"dXNlcg==\r\n");
        assert_eq!(Command::credential("pass").serialize(), b"cGFzcw==\r\n");
    }

    #[test]
    fn test_credentials_redacted() {
        let cmd = Command::credential("hunter2");
        assert_eq!(cmd.redacted(), REDACTED);
        assert_eq!(format!("{cmd:?}"), REDACTED);
    }

    #[test]
    fn test_envelope_commands() {
        let from = Command::MailFrom {
            from: "sender@example.com".to_string(),
        };
        let to = Command::RcptTo {
            to: "recipient@example.com".to_string(),
        };
        assert_eq!(from.serialize(), b"MAIL FROM:<sender@example.com>\r\n");
        assert_eq!(to.serialize(), b"RCPT TO:<recipient@example.com>\r\n");
        assert_eq!(Command::Data.serialize(), b"DATA\r\n");
        assert_eq!(Command::Quit.serialize(), b"QUIT\r\n");
    }

    #[test]
    fn test_payload_terminator() {
        assert_eq!(data_payload("Hi"), b"Hi\r\n.\r\n");
    }

    #[test]
    fn test_payload_normalises_line_endings() {
        assert_eq!(data_payload("a\nb\r\nc"), b"a\r\nb\r\nc\r\n.\r\n");
    }

    #[test]
    fn test_payload_dot_stuffing() {
        assert_eq!(data_payload("a\n.\nb"), b"a\r\n..\r\nb\r\n.\r\n");
        assert_eq!(data_payload(".hidden"), b"..hidden\r\n.\r\n");
    }
}
