//! # herald-smtp
//!
//! A small SMTP delivery client that keeps a step-by-step transcript of
//! every exchange.
//!
//! ## Features
//!
//! - **Type-state connection management**: compile-time enforcement of the
//!   HELO, AUTH, MAIL, RCPT, DATA order
//! - **TLS support**: implicit TLS (port 465) and STARTTLS
//! - **Authentication**: AUTH LOGIN
//! - **Transcripts**: every step recorded with credentials redacted,
//!   renderable as plain text or JSON
//! - **Failure policies**: fail at the first unexpected reply, or collect
//!   every reply and report at the end
//!
//! ## Quick Start
//!
//! ```ignore
//! use herald_mime::{AddressBook, Envelope, Role};
//! use herald_smtp::{Encryption, Format, SmtpConfig, SmtpSession};
//!
//! #[tokio::main]
//! async fn main() -> herald_smtp::Result<()> {
//!     let config = SmtpConfig::gmail(Encryption::Tls)
//!         .with_credentials("alerts@example.com", "app-password");
//!
//!     let mut book = AddressBook::new();
//!     book.add_recipient("ops@example.com", None, Role::To)?;
//!     let envelope = Envelope::new(&book, "Backup finished", "All volumes done.");
//!
//!     let report = SmtpSession::new(config).send(&envelope).await?;
//!     println!("{}", report.render(Format::PlainText));
//!     Ok(())
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! ┌──────────────┐
//! │  Connected   │ ─── auth_login() ───→ Authenticated
//! └──────────────┘                            │
//!        │                                    │
//!        └──────────── mail_from() ───────────┘
//!                          │
//!                          ↓
//!        MailTransaction ───→ RecipientAdded ───→ Data
//! ```
//!
//! ## Modules
//!
//! - [`command`]: SMTP command builders and DATA payload preparation
//! - [`connection`]: Connection management and type-state client
//! - [`parser`]: Reply parser
//! - [`types`]: Reply codes

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
mod config;
pub mod connection;
mod error;
pub mod parser;
mod session;
mod transcript;
pub mod types;

pub use config::{DEFAULT_HELO_NAME, DEFAULT_TIMEOUT, Encryption, FailurePolicy, SmtpConfig};
pub use connection::{Authenticated, Client, Connected, Data, MailTransaction, RecipientAdded};
pub use error::{Error, Result};
pub use session::SmtpSession;
pub use transcript::{Format, SendReport, Step, StepOutcome, StepRecord, Transcript};
pub use types::{NO_RESPONSE, Reply, ReplyCode};
