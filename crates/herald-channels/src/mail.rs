//! Addressing shared by every mail-carrying channel.

use herald_mime::{Address, AddressBook, Envelope};

/// Sender, recipients and subject of mail-carrying channels.
///
/// The message body is supplied per send; everything else is fixed when the
/// channel is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mail {
    book: AddressBook,
    subject: String,
}

impl Mail {
    /// Creates the mail settings.
    #[must_use]
    pub fn new(book: AddressBook, subject: impl Into<String>) -> Self {
        Self {
            book,
            subject: subject.into(),
        }
    }

    /// Returns the address book.
    #[must_use]
    pub const fn book(&self) -> &AddressBook {
        &self.book
    }

    /// Returns the subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the sender, if set.
    #[must_use]
    pub const fn sender(&self) -> Option<&Address> {
        self.book.sender()
    }

    /// Builds the envelope for one message body.
    #[must_use]
    pub fn envelope(&self, body: &str) -> Envelope {
        Envelope::new(&self.book, self.subject.as_str(), body)
    }
}
