//! SMTP connection management with type-state pattern.

mod client;
mod stream;

pub use client::{Authenticated, Client, Connected, Data, MailTransaction, RecipientAdded};
pub use stream::{MAX_LINE_LENGTH, SmtpStream, connect, connect_tls, create_tls_connector};
