//! RFC 2822 header assembly.

use crate::address::{Address, Role};
use crate::encoding::{encode_rfc2047, is_plain};
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use std::fmt;

/// Value of the `X-Mailer` header.
pub const X_MAILER: &str = concat!("herald/", env!("CARGO_PKG_VERSION"));

/// Ordered collection of header fields.
///
/// Fields render in insertion order, one `Name: value` per CRLF line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header field.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Gets the first value for a header (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if a header with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns an iterator over all fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.fields {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

/// Renders an envelope's header block.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderBuilder;

impl HeaderBuilder {
    /// Collects the header fields for `envelope`.
    ///
    /// Bcc recipients never appear here; they only exist at the SMTP
    /// envelope level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSender`] if the envelope has no sender.
    pub fn headers(envelope: &Envelope) -> Result<Headers> {
        let sender = envelope.sender().ok_or(Error::MissingSender)?;
        let mut headers = Headers::new();

        headers.add("From", mailbox(sender));

        let to = mailbox_list(envelope, Role::To);
        if !to.is_empty() {
            headers.add("To", to);
        }

        let cc = mailbox_list(envelope, Role::Cc);
        if !cc.is_empty() {
            headers.add("Cc", cc);
        }

        headers.add("Subject", encode_rfc2047(envelope.subject()));
        headers.add("Reply-To", mailbox(envelope.reply_to().unwrap_or(sender)));
        headers.add("Return-Path", format!("<{}>", sender.email()));
        headers.add("X-Mailer", X_MAILER);
        headers.add("MIME-Version", "1.0");
        headers.add(
            "Content-type",
            format!("{}; charset=utf-8", envelope.content_type()),
        );

        Ok(headers)
    }

    /// Renders the header block followed by the blank separator line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSender`] if the envelope has no sender.
    pub fn build(envelope: &Envelope) -> Result<String> {
        Ok(format!("{}\r\n", Self::headers(envelope)?))
    }

    /// Renders the complete message: header block, blank line and body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSender`] if the envelope has no sender.
    pub fn compose(envelope: &Envelope) -> Result<String> {
        let mut message = Self::build(envelope)?;
        message.push_str(&envelope.rendered_body());
        Ok(message)
    }
}

/// Renders one address as `"Display Name" <local@domain>`.
fn mailbox(address: &Address) -> String {
    let name = address.name();
    if name.is_empty() {
        format!("<{}>", address.email())
    } else if is_plain(name) {
        format!("\"{name}\" <{}>", address.email())
    } else {
        format!("{} <{}>", encode_rfc2047(name), address.email())
    }
}

fn mailbox_list(envelope: &Envelope, role: Role) -> String {
    envelope
        .group(role)
        .map(mailbox)
        .collect::<Vec<_>>()
        .join(", ")
}
