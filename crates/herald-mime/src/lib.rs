//! # herald-mime
//!
//! Address book, message envelope and RFC 2822 header assembly.
//!
//! ## Quick Start
//!
//! ```ignore
//! use herald_mime::{AddressBook, Envelope, HeaderBuilder, Role};
//!
//! let mut book = AddressBook::new();
//! book.set_sender("terry@example.com", None)?;
//! book.add_recipient("john.doe123@example.com", None, Role::To)?;
//! book.add_recipient("audit@example.com", None, Role::Bcc)?;
//!
//! let envelope = Envelope::new(&book, "Disk usage alert", "Disk /var is 95% full.");
//! let message = HeaderBuilder::compose(&envelope)?;
//! // From: "Terry" <terry@example.com>
//! // To: "John Doe" <john.doe123@example.com>
//! // ...no Bcc header...
//! ```
//!
//! ## Modules
//!
//! - [`encoding`]: RFC 2047 header value encoding
//! - [`wrap`]: plain-text body wrapping

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod envelope;
mod error;
mod header;

pub mod encoding;
pub mod wrap;

pub use address::{Address, AddressBook, Role, pretty_name};
pub use envelope::{ContentType, Envelope};
pub use error::{Error, Result};
pub use header::{HeaderBuilder, Headers, X_MAILER};
