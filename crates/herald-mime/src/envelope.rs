//! The per-send message envelope.

use crate::address::{Address, AddressBook, Role};
use crate::wrap::{WRAP_WIDTH, wrap_text};
use std::borrow::Cow;
use std::fmt;

/// Body content type, inferred from the body itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// `text/plain`
    PlainText,
    /// `text/html`
    Html,
}

impl ContentType {
    /// Infers the content type: HTML if the trimmed body starts with `<`.
    #[must_use]
    pub fn infer(body: &str) -> Self {
        if body.trim_start().starts_with('<') {
            Self::Html
        } else {
            Self::PlainText
        }
    }

    /// Returns the MIME type string.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::PlainText => "text/plain",
            Self::Html => "text/html",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// An immutable snapshot of everything needed to transmit one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    sender: Option<Address>,
    recipients: Vec<Address>,
    reply_to: Option<Address>,
    subject: String,
    body: String,
    content_type: ContentType,
}

impl Envelope {
    /// Builds an envelope from the current state of an address book.
    #[must_use]
    pub fn new(book: &AddressBook, subject: impl Into<String>, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            sender: book.sender().cloned(),
            recipients: book.recipients().to_vec(),
            reply_to: book.reply_to().cloned(),
            subject: subject.into(),
            content_type: ContentType::infer(&body),
            body,
        }
    }

    /// Uses `sender` if the envelope has none.
    #[must_use]
    pub fn with_default_sender(mut self, sender: Address) -> Self {
        if self.sender.is_none() {
            self.sender = Some(sender);
        }
        self
    }

    /// Returns the sender, if any.
    #[must_use]
    pub const fn sender(&self) -> Option<&Address> {
        self.sender.as_ref()
    }

    /// Returns the explicit reply-to identity, if any.
    #[must_use]
    pub const fn reply_to(&self) -> Option<&Address> {
        self.reply_to.as_ref()
    }

    /// Returns the subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the body as given.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the inferred content type.
    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Returns all recipients in insertion order.
    #[must_use]
    pub fn recipients(&self) -> &[Address] {
        &self.recipients
    }

    /// Returns the recipients of one role, in insertion order.
    pub fn group(&self, role: Role) -> impl Iterator<Item = &Address> {
        self.recipients.iter().filter(move |a| a.role() == role)
    }

    /// Returns every recipient in transmission order: To, then Cc, then Bcc.
    #[must_use]
    pub fn transmission_order(&self) -> Vec<&Address> {
        [Role::To, Role::Cc, Role::Bcc]
            .into_iter()
            .flat_map(|role| self.group(role))
            .collect()
    }

    /// Returns the body ready for transmission: plain text is wrapped at
    /// 70 columns, HTML is never touched.
    #[must_use]
    pub fn rendered_body(&self) -> Cow<'_, str> {
        match self.content_type {
            ContentType::PlainText => Cow::Owned(wrap_text(&self.body, WRAP_WIDTH)),
            ContentType::Html => Cow::Borrowed(&self.body),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    fn book() -> AddressBook {
        let mut book = AddressBook::new();
        book.add_recipient("bcc1@example.com", None, Role::Bcc).unwrap();
        book.add_recipient("to1@example.com", None, Role::To).unwrap();
        book.add_recipient("cc1@example.com", None, Role::Cc).unwrap();
        book.add_recipient("to2@example.com", None, Role::To).unwrap();
        book
    }

    #[test]
    fn test_infer_html() {
        assert_eq!(ContentType::infer("  \n<p>Hi</p>"), ContentType::Html);
        assert_eq!(ContentType::infer("Hi <b>there</b>"), ContentType::PlainText);
        assert_eq!(ContentType::infer(""), ContentType::PlainText);
    }

    #[test]
    fn test_transmission_order() {
        let envelope = Envelope::new(&book(), "s", "b");
        let order: Vec<&str> = envelope
            .transmission_order()
            .into_iter()
            .map(Address::email)
            .collect();
        assert_eq!(
            order,
            vec![
                "to1@example.com",
                "to2@example.com",
                "cc1@example.com",
                "bcc1@example.com"
            ]
        );
    }

    #[test]
    fn test_plain_body_wrapped() {
        let body = "word ".repeat(30);
        let envelope = Envelope::new(&book(), "s", body.trim_end());
        assert!(
            envelope
                .rendered_body()
                .lines()
                .all(|l| l.chars().count() <= 70)
        );
    }

    #[test]
    fn test_html_body_never_wrapped() {
        let body = format!("<p>{}</p>", "word ".repeat(30));
        let envelope = Envelope::new(&book(), "s", body.clone());
        assert_eq!(envelope.content_type(), ContentType::Html);
        assert_eq!(envelope.rendered_body(), body);
    }

    #[test]
    fn test_default_sender_does_not_override() {
        let mut book = book();
        book.set_sender("me@example.com", None).unwrap();
        let envelope = Envelope::new(&book, "s", "b")
            .with_default_sender(Address::new("other@example.com").unwrap());
        assert_eq!(envelope.sender().unwrap().email(), "me@example.com");
    }
}
