//! # herald-channels
//!
//! Delivers a notification through one of several channels behind a single
//! `send(message)` call: raw SMTP, the Mailgun and Sendgrid mail APIs, Slack
//! (bot or webhook), Telegram, LINE Notify and RocketChat.
//!
//! ## Quick Start
//!
//! ```ignore
//! use herald_channels::ChannelConfig;
//! use herald_smtp::Format;
//!
//! #[tokio::main]
//! async fn main() -> herald_channels::Result<()> {
//!     let channel = ChannelConfig::from_json(r#"{
//!         "type": "slack",
//!         "access_token": "xoxb-...",
//!         "channel": "#ops"
//!     }"#)?
//!     .build()?;
//!
//!     let outcome = channel.send("Nightly backup finished").await?;
//!     println!("{}", outcome.render(Format::PlainText));
//!     Ok(())
//! }
//! ```
//!
//! ## Failure handling
//!
//! With `debug` on (the default) a rejected message is an
//! [`Error::Rejected`] or an SMTP protocol error. With `debug` off the
//! rejection comes back as an [`Outcome`] whose `success` is false, carrying
//! the vendor reply or the full SMTP transcript.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod channel;
mod config;
mod error;
mod mail;
mod outcome;
pub mod vendor;

pub use channel::{Channel, HttpChannel, SmtpChannel};
pub use config::{
    ChannelConfig, ChannelKind, DEFAULT_TIMEOUT_SECS, IdentityConfig, MailConfig, RecipientConfig,
};
pub use error::{Error, Result};
pub use mail::Mail;
pub use outcome::Outcome;
pub use vendor::Vendor;
