//! One-shot delivery of an envelope over SMTP.

use crate::command::data_payload;
use crate::config::{Encryption, SmtpConfig};
use crate::connection::{Client, connect, connect_tls, create_tls_connector};
use crate::error::{Error, Result};
use crate::transcript::SendReport;
use herald_mime::{Address, Envelope, HeaderBuilder};
use tracing::{debug, info};

/// Delivers messages with a fixed [`SmtpConfig`].
///
/// Each [`SmtpSession::send`] opens its own connection and closes it
/// before returning.
#[derive(Debug, Clone)]
pub struct SmtpSession {
    config: SmtpConfig,
}

impl SmtpSession {
    /// Creates a session.
    #[must_use]
    pub const fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SmtpConfig {
        &self.config
    }

    /// Sends one message.
    ///
    /// The exchange runs in a fixed order: greeting, HELO, optional STARTTLS
    /// with a second HELO, AUTH LOGIN when a username is configured, MAIL
    /// FROM, RCPT TO for every To then Cc then Bcc recipient, DATA, the
    /// payload and QUIT. Without an explicit sender the username is used.
    ///
    /// Under [`crate::FailurePolicy::Collect`] a mismatch never produces an
    /// error; it shows up as `success: false` in the report.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedTransport`] outside a tokio runtime
    /// - [`Error::Mime`] with [`herald_mime::Error::MissingSender`] or
    ///   [`herald_mime::Error::NoRecipients`] before any connection is made
    /// - [`Error::Connection`] if the socket cannot be opened
    /// - [`Error::TlsUpgrade`] if STARTTLS is refused or the handshake fails
    /// - [`Error::ProtocolMismatch`] under `FailFast` at the first unexpected reply
    pub async fn send(&self, envelope: &Envelope) -> Result<SendReport> {
        tokio::runtime::Handle::try_current()
            .map_err(|e| Error::UnsupportedTransport(e.to_string()))?;

        let config = &self.config;
        let envelope = match (envelope.sender(), Address::new(config.username.as_str())) {
            (None, Ok(fallback)) => envelope.clone().with_default_sender(fallback),
            _ => envelope.clone(),
        };

        let message = HeaderBuilder::compose(&envelope)?;
        let sender = envelope
            .sender()
            .ok_or(herald_mime::Error::MissingSender)?
            .clone();

        let mut recipients = envelope.transmission_order().into_iter();
        let first = recipients
            .next()
            .ok_or(herald_mime::Error::NoRecipients)?;
        let payload = data_payload(&message);

        debug!(
            host = %config.host,
            port = config.port,
            encryption = ?config.encryption,
            recipients = envelope.recipients().len(),
            "Opening SMTP session"
        );

        let tls = || create_tls_connector(config.tls_config.clone());
        let stream = match config.encryption {
            Encryption::Ssl => {
                connect_tls(&config.host, config.port, config.timeout, &tls()?).await?
            }
            Encryption::None | Encryption::Tls => {
                connect(&config.host, config.port, config.timeout).await?
            }
        };

        let mut client = Client::greet(stream, config.policy)
            .await?
            .helo(&config.helo_name)
            .await?;
        if config.encryption == Encryption::Tls {
            client = client
                .starttls(&config.host, &config.helo_name, &tls()?)
                .await?;
        }

        let client = if config.username.is_empty() {
            client.mail_from(&sender).await?
        } else {
            client
                .auth_login(&config.username, &config.password)
                .await?
                .mail_from(&sender)
                .await?
        };

        let mut client = client.rcpt_to(first).await?;
        for recipient in recipients {
            client = client.rcpt_to(recipient).await?;
        }

        let transcript = client.data().await?.send_message(&payload).await?.quit().await;
        let report = SendReport::from_transcript(transcript);

        info!(
            host = %config.host,
            success = report.success,
            steps = report.transcript.len(),
            "SMTP session finished"
        );
        Ok(report)
    }
}
