//! JSON channel configuration.

use crate::channel::{Channel, HttpChannel, SmtpChannel};
use crate::error::Result;
use crate::mail::Mail;
use crate::vendor::{
    LineNotify, Mailgun, RocketChat, Sendgrid, Slack, SlackWebhook, Telegram, Vendor,
};
use herald_mime::{AddressBook, Role};
use herald_smtp::{Encryption, FailurePolicy, SmtpConfig, SmtpSession};
use serde::Deserialize;
use std::time::Duration;

/// Default timeout in seconds for connecting and for HTTP requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_debug() -> bool {
    true
}

/// One recipient entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecipientConfig {
    /// Email address.
    pub email: String,
    /// Display name; derived from the address when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Role, `to` when absent.
    #[serde(default)]
    pub role: Role,
}

/// An identity without a role.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityConfig {
    /// Email address.
    pub email: String,
    /// Display name; derived from the address when absent.
    #[serde(default)]
    pub name: Option<String>,
}

/// Addressing for mail-carrying channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MailConfig {
    /// Sender; SMTP channels fall back to the username.
    #[serde(default)]
    pub sender: Option<IdentityConfig>,
    /// Recipients in order.
    #[serde(default)]
    pub recipients: Vec<RecipientConfig>,
    /// Reply-to identity; the sender when absent.
    #[serde(default)]
    pub reply_to: Option<IdentityConfig>,
    /// Subject line.
    #[serde(default)]
    pub subject: String,
}

impl MailConfig {
    /// Validates every address and builds the mail settings.
    ///
    /// # Errors
    ///
    /// Returns [`herald_mime::Error::InvalidAddress`] for the first bad
    /// address.
    pub fn build(&self) -> Result<Mail> {
        let mut book = AddressBook::new();
        if let Some(sender) = &self.sender {
            book.set_sender(&sender.email, sender.name.as_deref())?;
        }
        if let Some(reply_to) = &self.reply_to {
            book.set_reply_to(&reply_to.email, reply_to.name.as_deref())?;
        }
        for recipient in &self.recipients {
            book.add_recipient(&recipient.email, recipient.name.as_deref(), recipient.role)?;
        }
        Ok(Mail::new(book, self.subject.as_str()))
    }
}

/// Channel selection and its credentials, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelKind {
    /// Any SMTP server.
    Smtp {
        /// Hostname, optionally prefixed with `tls://` or `ssl://`.
        host: String,
        /// Port; the encryption mode's default when absent.
        #[serde(default)]
        port: Option<u16>,
        /// AUTH LOGIN username; AUTH is skipped when empty.
        #[serde(default)]
        username: String,
        /// AUTH LOGIN password.
        #[serde(default)]
        password: String,
        /// Security mode; a host prefix takes precedence.
        #[serde(default)]
        encryption: Option<Encryption>,
        /// Addressing.
        mail: MailConfig,
    },
    /// Gmail SMTP.
    Gmail {
        /// Account address.
        username: String,
        /// App password.
        password: String,
        /// `ssl` for port 465, STARTTLS on 587 otherwise.
        #[serde(default)]
        encryption: Option<Encryption>,
        /// Addressing.
        mail: MailConfig,
    },
    /// Mailgun SMTP relay.
    MailgunSmtp {
        /// SMTP login.
        username: String,
        /// SMTP password.
        password: String,
        /// Addressing.
        mail: MailConfig,
    },
    /// Mailgun messages API.
    Mailgun {
        /// API key.
        api_key: String,
        /// Sending domain.
        domain: String,
        /// Addressing.
        mail: MailConfig,
    },
    /// Sendgrid v3 mail API.
    Sendgrid {
        /// API key.
        api_key: String,
        /// Addressing.
        mail: MailConfig,
    },
    /// Slack Web API.
    Slack {
        /// Bot token.
        access_token: String,
        /// Channel name or id.
        channel: String,
    },
    /// Slack incoming webhook.
    SlackWebhook {
        /// Webhook URL.
        webhook: String,
    },
    /// Telegram bot.
    Telegram {
        /// Bot key.
        api_key: String,
        /// Chat id or `@channel`.
        channel: String,
        /// Bot API server; `https://api.telegram.org` when absent.
        #[serde(default)]
        api_base: Option<String>,
    },
    /// LINE Notify.
    LineNotify {
        /// Personal access token.
        access_token: String,
    },
    /// RocketChat.
    RocketChat {
        /// Personal access token.
        access_token: String,
        /// User id owning the token.
        user_id: String,
        /// Server base URL.
        server_url: String,
        /// Channel; `#general` when absent.
        #[serde(default)]
        channel: Option<String>,
    },
}

/// A complete channel configuration.
///
/// ```json
/// {
///   "type": "telegram",
///   "api_key": "123:abc",
///   "channel": "@ops",
///   "debug": false,
///   "timeout_secs": 10
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelConfig {
    /// Channel selection.
    #[serde(flatten)]
    pub kind: ChannelKind,
    /// Fail at the first unexpected reply (the default) instead of
    /// collecting every reply.
    #[serde(default = "default_debug")]
    pub debug: bool,
    /// Connect and request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ChannelConfig {
    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if the document does not describe a
    /// channel.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns the failure policy selected by `debug`.
    #[must_use]
    pub const fn policy(&self) -> FailurePolicy {
        FailurePolicy::from_debug(self.debug)
    }

    /// Returns the configured timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validates the configuration and builds the channel.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Mime`] for an invalid address
    /// - [`crate::Error::InvalidConfig`] for an invalid webhook URL
    /// - [`crate::Error::Http`] if the HTTP client cannot be built
    pub fn build(&self) -> Result<Channel> {
        let vendor = match &self.kind {
            ChannelKind::Smtp {
                host,
                port,
                username,
                password,
                encryption,
                mail,
            } => {
                let mut config = SmtpConfig::new(host.as_str(), 0);
                if let Some(encryption) = (*encryption).filter(|_| !host.contains("://")) {
                    config = config.with_encryption(encryption);
                }
                config.port = port.unwrap_or_else(|| config.encryption.default_port());
                return self.smtp(config.with_credentials(username, password), mail);
            }
            ChannelKind::Gmail {
                username,
                password,
                encryption,
                mail,
            } => {
                let config = SmtpConfig::gmail(encryption.unwrap_or(Encryption::Tls));
                return self.smtp(config.with_credentials(username, password), mail);
            }
            ChannelKind::MailgunSmtp {
                username,
                password,
                mail,
            } => {
                let config = SmtpConfig::mailgun();
                return self.smtp(config.with_credentials(username, password), mail);
            }
            ChannelKind::Mailgun {
                api_key,
                domain,
                mail,
            } => Vendor::Mailgun(Mailgun::new(api_key, domain, mail.build()?)),
            ChannelKind::Sendgrid { api_key, mail } => {
                Vendor::Sendgrid(Sendgrid::new(api_key, mail.build()?))
            }
            ChannelKind::Slack {
                access_token,
                channel,
            } => Vendor::Slack(Slack::new(access_token, channel)),
            ChannelKind::SlackWebhook { webhook } => {
                Vendor::SlackWebhook(SlackWebhook::new(webhook)?)
            }
            ChannelKind::Telegram {
                api_key,
                channel,
                api_base,
            } => {
                let telegram = Telegram::new(api_key, channel);
                Vendor::Telegram(match api_base {
                    Some(base) => telegram.with_api_base(base),
                    None => telegram,
                })
            }
            ChannelKind::LineNotify { access_token } => {
                Vendor::LineNotify(LineNotify::new(access_token))
            }
            ChannelKind::RocketChat {
                access_token,
                user_id,
                server_url,
                channel,
            } => {
                let mut rocket = RocketChat::new(access_token, user_id, server_url);
                if let Some(channel) = channel {
                    rocket = rocket.with_channel(channel);
                }
                Vendor::RocketChat(rocket)
            }
        };

        Ok(Channel::Http(HttpChannel::new(
            vendor,
            self.timeout(),
            self.policy(),
        )?))
    }

    fn smtp(&self, config: SmtpConfig, mail: &MailConfig) -> Result<Channel> {
        let config = config
            .with_timeout(self.timeout())
            .with_policy(self.policy());
        Ok(Channel::Smtp(SmtpChannel::new(
            SmtpSession::new(config),
            mail.build()?,
        )))
    }
}
