//! The closed set of delivery channels.

use crate::error::{Error, Result};
use crate::mail::Mail;
use crate::outcome::Outcome;
use crate::vendor::{Auth, Body, Vendor, Verdict};
use herald_smtp::{FailurePolicy, SmtpSession};
use std::time::Duration;
use tracing::{debug, info, warn};

/// A configured delivery channel.
#[derive(Debug, Clone)]
pub enum Channel {
    /// Raw SMTP delivery.
    Smtp(SmtpChannel),
    /// HTTP vendor API.
    Http(HttpChannel),
}

impl Channel {
    /// Returns the channel name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Smtp(_) => "smtp",
            Self::Http(channel) => channel.vendor.name(),
        }
    }

    /// Delivers one message.
    ///
    /// # Errors
    ///
    /// See [`SmtpChannel::send`] and [`HttpChannel::send`].
    pub async fn send(&self, message: &str) -> Result<Outcome> {
        match self {
            Self::Smtp(channel) => channel.send(message).await,
            Self::Http(channel) => channel.send(message).await,
        }
    }
}

/// Mail delivery through an [`SmtpSession`].
#[derive(Debug, Clone)]
pub struct SmtpChannel {
    session: SmtpSession,
    mail: Mail,
}

impl SmtpChannel {
    /// Creates the channel.
    #[must_use]
    pub const fn new(session: SmtpSession, mail: Mail) -> Self {
        Self { session, mail }
    }

    /// Returns the underlying session.
    #[must_use]
    pub const fn session(&self) -> &SmtpSession {
        &self.session
    }

    /// Sends `message` as the body of one email.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Smtp`] for anything [`SmtpSession::send`] rejects.
    pub async fn send(&self, message: &str) -> Result<Outcome> {
        let report = self.session.send(&self.mail.envelope(message)).await?;
        Ok(Outcome::from(report))
    }
}

/// A vendor API reached over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpChannel {
    vendor: Vendor,
    client: reqwest::Client,
    policy: FailurePolicy,
}

impl HttpChannel {
    /// Creates the channel; `timeout` bounds both connecting and the whole
    /// request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(vendor: Vendor, timeout: Duration, policy: FailurePolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            vendor,
            client,
            policy,
        })
    }

    /// Returns the vendor.
    #[must_use]
    pub const fn vendor(&self) -> &Vendor {
        &self.vendor
    }

    /// Posts one message to the vendor.
    ///
    /// Under [`FailurePolicy::Collect`] a vendor rejection is reported as an
    /// unsuccessful [`Outcome`].
    ///
    /// # Errors
    ///
    /// - [`Error::Mime`] if a mail vendor has no sender
    /// - [`Error::Http`] if the request cannot be completed
    /// - [`Error::Rejected`] under `FailFast` if the vendor refuses the message
    pub async fn send(&self, message: &str) -> Result<Outcome> {
        let vendor = self.vendor.name();
        let request = self.vendor.request(message)?;
        debug!(vendor, "Posting notification");

        let mut builder = self.client.post(&request.url);
        builder = match &request.auth {
            Auth::None => builder,
            Auth::Bearer(token) => builder.bearer_auth(token.expose()),
            Auth::Basic { username, password } => {
                builder.basic_auth(username, Some(password.expose()))
            }
        };
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.expose());
        }
        builder = match &request.body {
            Body::Json(value) => builder.json(value),
            Body::Form(fields) => builder.form(fields),
        };

        // Some endpoints carry credentials in the URL.
        let response = builder.send().await.map_err(reqwest::Error::without_url)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;

        let verdict = self.vendor.interpret(status, &body);
        self.conclude(verdict, status)
    }

    fn conclude(&self, verdict: Verdict, status: u16) -> Result<Outcome> {
        let vendor = self.vendor.name();
        if verdict.success {
            info!(vendor, status, "Notification delivered");
        } else {
            warn!(vendor, status, reason = %verdict.message, "Notification rejected");
            if self.policy == FailurePolicy::FailFast {
                return Err(Error::Rejected {
                    vendor,
                    message: verdict.message,
                    http_status: Some(status),
                });
            }
        }

        Ok(Outcome {
            success: verdict.success,
            message: verdict.message,
            raw_result: verdict.raw,
            http_status: Some(status),
        })
    }
}
