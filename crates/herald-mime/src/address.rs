//! Email identities and the address book they are collected in.

use crate::error::{Error, Result};
use std::fmt;

/// Characters removed from display names so they cannot break out of a
/// quoted header value.
const UNSAFE_NAME_CHARS: [char; 6] = ['"', '\'', '<', '>', '/', '\\'];

/// Recipient role of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Role {
    /// Primary recipient.
    #[default]
    To,
    /// Carbon copy.
    Cc,
    /// Blind carbon copy, never rendered in headers.
    Bcc,
}

impl Role {
    /// Returns the role as it appears in configuration and transcripts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::To => "to",
            Self::Cc => "cc",
            Self::Bcc => "bcc",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated email identity with a display name and a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    email: String,
    name: String,
    role: Role,
}

impl Address {
    /// Creates an address whose display name is derived from the local part.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the address fails validation.
    pub fn new(email: impl Into<String>) -> Result<Self> {
        let email = email.into();
        validate(&email)?;
        let name = pretty_name(&email);
        Ok(Self {
            email,
            name,
            role: Role::To,
        })
    }

    /// Creates an address with an explicit display name.
    ///
    /// The name is sanitised the same way a derived name is; a name that is
    /// empty after sanitising falls back to the derived one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the address fails validation.
    pub fn with_name(email: impl Into<String>, name: &str) -> Result<Self> {
        let mut address = Self::new(email)?;
        let name = sanitize_name(name);
        if !name.is_empty() {
            address.name = name;
        }
        Ok(address)
    }

    /// Sets the recipient role.
    #[must_use]
    pub const fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the recipient role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.email)
    }
}

/// Validates an email address (local@domain).
fn validate(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(Error::InvalidAddress("Address cannot be empty".into()));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(Error::InvalidAddress(format!("{email}: missing @")));
    };

    if domain.contains('@') {
        return Err(Error::InvalidAddress(format!(
            "{email}: must have exactly one @"
        )));
    }

    if local.is_empty() || domain.is_empty() {
        return Err(Error::InvalidAddress(format!(
            "{email}: local and domain parts cannot be empty"
        )));
    }

    // Anything that could terminate an SMTP command or a header value.
    if email
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | ',' | '"'))
    {
        return Err(Error::InvalidAddress(format!(
            "{email}: contains forbidden characters"
        )));
    }

    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return Err(Error::InvalidAddress(format!("{email}: malformed domain")));
    }

    Ok(())
}

/// Derives a display name from the local part of an address.
///
/// `john.doe123@example.com` becomes `John Doe`: digits are dropped, dots
/// become spaces, each word gets an upper-case initial and quoting
/// characters are stripped.
#[must_use]
pub fn pretty_name(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();

    let without_digits: String = local.chars().filter(|c| !c.is_ascii_digit()).collect();
    let spaced = without_digits.replace('.', " ");

    let mut titled = String::with_capacity(spaced.len());
    let mut word_start = true;
    for c in spaced.chars() {
        if word_start {
            titled.extend(c.to_uppercase());
        } else {
            titled.push(c);
        }
        word_start = c.is_whitespace();
    }

    titled.replace(UNSAFE_NAME_CHARS, "")
}

/// Strips quoting and control characters from a caller-supplied name.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control() && !UNSAFE_NAME_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sender, recipients and reply-to identities for outgoing mail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBook {
    sender: Option<Address>,
    recipients: Vec<Address>,
    reply_to: Option<Address>,
}

impl AddressBook {
    /// Creates an empty address book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a recipient.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the address fails validation.
    pub fn add_recipient(&mut self, email: &str, name: Option<&str>, role: Role) -> Result<()> {
        let address = build(email, name)?.with_role(role);
        self.recipients.push(address);
        Ok(())
    }

    /// Sets the sender, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the address fails validation.
    pub fn set_sender(&mut self, email: &str, name: Option<&str>) -> Result<()> {
        self.sender = Some(build(email, name)?);
        Ok(())
    }

    /// Sets the reply-to identity, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the address fails validation.
    pub fn set_reply_to(&mut self, email: &str, name: Option<&str>) -> Result<()> {
        self.reply_to = Some(build(email, name)?);
        Ok(())
    }

    /// Returns the sender, if set.
    #[must_use]
    pub const fn sender(&self) -> Option<&Address> {
        self.sender.as_ref()
    }

    /// Returns the reply-to identity, if set.
    #[must_use]
    pub const fn reply_to(&self) -> Option<&Address> {
        self.reply_to.as_ref()
    }

    /// Returns all recipients in insertion order.
    #[must_use]
    pub fn recipients(&self) -> &[Address] {
        &self.recipients
    }

    /// Returns true if no recipient has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}

fn build(email: &str, name: Option<&str>) -> Result<Address> {
    match name {
        Some(name) => Address::with_name(email, name),
        None => Address::new(email),
    }
}
