//! Session configuration and provider presets.

use rustls::ClientConfig;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default connect timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default name announced in `HELO`.
pub const DEFAULT_HELO_NAME: &str = "localhost";

/// Connection security mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encryption {
    /// No encryption. Credentials travel in the clear.
    #[default]
    None,
    /// Start with plaintext, upgrade with STARTTLS.
    Tls,
    /// TLS from the first byte (SMTPS).
    Ssl,
}

impl Encryption {
    /// Returns the conventional port for this mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::None | Self::Tls => 587,
            Self::Ssl => 465,
        }
    }
}

/// What a session does when a step gets an unexpected reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first mismatch and return it as an error.
    #[default]
    FailFast,
    /// Record the mismatch and keep going so the transcript is complete.
    Collect,
}

impl FailurePolicy {
    /// Maps a debug flag onto a policy: debug mode fails fast.
    #[must_use]
    pub const fn from_debug(debug: bool) -> Self {
        if debug { Self::FailFast } else { Self::Collect }
    }
}

/// SMTP session configuration.
#[derive(Clone)]
pub struct SmtpConfig {
    /// Server hostname, without scheme prefix.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// AUTH LOGIN username; AUTH is skipped when empty.
    pub username: String,
    /// AUTH LOGIN password.
    pub password: String,
    /// Security mode.
    pub encryption: Encryption,
    /// Connect timeout.
    pub timeout: Duration,
    /// Name announced in `HELO`.
    pub helo_name: String,
    /// Mismatch handling.
    pub policy: FailurePolicy,
    /// TLS client settings; `None` trusts the bundled webpki roots.
    pub tls_config: Option<Arc<ClientConfig>>,
}

impl SmtpConfig {
    /// Creates a configuration for `host:port`.
    ///
    /// A `tls://` prefix selects STARTTLS and an `ssl://` prefix selects
    /// implicit TLS; the prefix is stripped from the stored host.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        let (host, encryption) = if let Some(rest) = host.strip_prefix("tls://") {
            (rest.to_string(), Encryption::Tls)
        } else if let Some(rest) = host.strip_prefix("ssl://") {
            (rest.to_string(), Encryption::Ssl)
        } else {
            (host, Encryption::None)
        };

        Self {
            host,
            port,
            username: String::new(),
            password: String::new(),
            encryption,
            timeout: DEFAULT_TIMEOUT,
            helo_name: DEFAULT_HELO_NAME.to_string(),
            policy: FailurePolicy::default(),
            tls_config: None,
        }
    }

    /// Gmail preset: `Ssl` uses port 465, anything else STARTTLS on 587.
    #[must_use]
    pub fn gmail(encryption: Encryption) -> Self {
        match encryption {
            Encryption::Ssl => Self::new("ssl://smtp.gmail.com", 465),
            Encryption::Tls | Encryption::None => Self::new("tls://smtp.gmail.com", 587),
        }
    }

    /// Mailgun preset: STARTTLS on port 587.
    #[must_use]
    pub fn mailgun() -> Self {
        Self::new("tls://smtp.mailgun.org", 587)
    }

    /// Sets the AUTH LOGIN credentials.
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Sets the security mode.
    #[must_use]
    pub const fn with_encryption(mut self, encryption: Encryption) -> Self {
        self.encryption = encryption;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the name announced in `HELO`.
    #[must_use]
    pub fn with_helo_name(mut self, name: impl Into<String>) -> Self {
        self.helo_name = name.into();
        self
    }

    /// Sets the mismatch policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Uses `tls_config` for STARTTLS and implicit TLS instead of the
    /// bundled root certificates.
    #[must_use]
    pub fn with_tls_config(mut self, tls_config: Arc<ClientConfig>) -> Self {
        self.tls_config = Some(tls_config);
        self
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("encryption", &self.encryption)
            .field("timeout", &self.timeout)
            .field("helo_name", &self.helo_name)
            .field("policy", &self.policy)
            .field("custom_tls", &self.tls_config.is_some())
            .finish()
    }
}
