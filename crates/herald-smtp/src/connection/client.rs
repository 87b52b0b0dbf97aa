//! Type-state SMTP client that records every exchange.

use super::SmtpStream;
use crate::command::Command;
use crate::config::FailurePolicy;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::transcript::{Step, StepOutcome, StepRecord, Transcript};
use crate::types::{Reply, ReplyCode};
use herald_mime::{Address, Role};
use std::marker::PhantomData;
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

/// Type-state marker for connected state.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker for authenticated state.
#[derive(Debug)]
pub struct Authenticated;

/// Type-state marker for mail transaction started.
#[derive(Debug)]
pub struct MailTransaction;

/// Type-state marker for recipient added.
#[derive(Debug)]
pub struct RecipientAdded;

/// Type-state marker for data mode.
#[derive(Debug)]
pub struct Data;

/// SMTP client with type-state pattern.
///
/// Every step is appended to the client's [`Transcript`]. When a reply does
/// not carry the expected code the [`FailurePolicy`] decides: `FailFast`
/// returns [`Error::ProtocolMismatch`], `Collect` records the mismatch and
/// lets the caller carry on.
#[derive(Debug)]
pub struct Client<State> {
    stream: SmtpStream,
    transcript: Transcript,
    policy: FailurePolicy,
    _state: PhantomData<State>,
}

impl Client<Connected> {
    /// Creates a client from a stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolMismatch`] under `FailFast` if the greeting
    /// is not a 220.
    pub async fn greet(stream: SmtpStream, policy: FailurePolicy) -> Result<Self> {
        let mut client = Self {
            stream,
            transcript: Transcript::new(),
            policy,
            _state: PhantomData,
        };

        let reply = client.read_reply().await;
        client.record(Step::Connection, None, Some(ReplyCode::SERVICE_READY), &reply);
        client.enforce()?;
        Ok(client)
    }

    /// Sends HELO.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolMismatch`] under `FailFast` if the server
    /// does not answer 250.
    pub async fn helo(mut self, client_hostname: &str) -> Result<Self> {
        let cmd = Command::Helo {
            hostname: client_hostname.to_string(),
        };
        self.expect(Step::Hello, &cmd, ReplyCode::OK).await?;
        Ok(self)
    }

    /// Upgrades the connection with STARTTLS, then repeats HELO.
    ///
    /// A refusal is never collected: continuing in plaintext would send the
    /// credentials unprotected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TlsUpgrade`] if the server does not answer 220 or the
    /// handshake fails.
    pub async fn starttls(
        mut self,
        server_host: &str,
        client_hostname: &str,
        connector: &TlsConnector,
    ) -> Result<Self> {
        let reply = self
            .exchange(Step::Tls, &Command::StartTls, Some(ReplyCode::SERVICE_READY))
            .await;
        if !reply.matches(ReplyCode::SERVICE_READY) {
            return Err(Error::TlsUpgrade(format!(
                "server refused STARTTLS: {}",
                reply.text()
            )));
        }

        self.stream = self.stream.upgrade_to_tls(server_host, connector).await?;
        debug!(host = %server_host, "SMTP connection upgraded to TLS");

        self.helo(client_hostname).await
    }

    /// Authenticates with AUTH LOGIN.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolMismatch`] under `FailFast` if any of the
    /// three exchanges gets an unexpected reply.
    pub async fn auth_login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated>> {
        self.expect(Step::AuthType, &Command::AuthLogin, ReplyCode::AUTH_CONTINUE)
            .await?;
        self.expect(
            Step::User,
            &Command::credential(username),
            ReplyCode::AUTH_CONTINUE,
        )
        .await?;
        self.expect(
            Step::Pass,
            &Command::credential(password),
            ReplyCode::AUTH_SUCCEEDED,
        )
        .await?;

        Ok(self.transition())
    }

    /// Starts a mail transaction without authentication.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolMismatch`] under `FailFast` if the server
    /// does not answer 250.
    pub async fn mail_from(self, from: &Address) -> Result<Client<MailTransaction>> {
        self.start_transaction(from).await
    }
}

impl Client<Authenticated> {
    /// Starts a mail transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolMismatch`] under `FailFast` if the server
    /// does not answer 250.
    pub async fn mail_from(self, from: &Address) -> Result<Client<MailTransaction>> {
        self.start_transaction(from).await
    }
}

impl Client<MailTransaction> {
    /// Adds the first recipient.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolMismatch`] under `FailFast` if the server
    /// does not answer 250.
    pub async fn rcpt_to(mut self, to: &Address) -> Result<Client<RecipientAdded>> {
        self.add_recipient(to).await?;
        Ok(self.transition())
    }
}

impl Client<RecipientAdded> {
    /// Adds another recipient.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolMismatch`] under `FailFast` if the server
    /// does not answer 250.
    pub async fn rcpt_to(mut self, to: &Address) -> Result<Self> {
        self.add_recipient(to).await?;
        Ok(self)
    }

    /// Begins sending message data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolMismatch`] under `FailFast` if the server
    /// does not answer 354.
    pub async fn data(mut self) -> Result<Client<Data>> {
        self.expect(Step::Data, &Command::Data, ReplyCode::START_DATA)
            .await?;
        Ok(self.transition())
    }
}

impl Client<Data> {
    /// Sends a payload prepared by [`crate::command::data_payload`].
    ///
    /// The transcript shows the payload size, not its content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolMismatch`] under `FailFast` if the server
    /// does not answer 250.
    pub async fn send_message(mut self, payload: &[u8]) -> Result<Client<Connected>> {
        let shown = format!("<{} bytes>", payload.len());
        let reply = self
            .round_trip(Step::Send, payload, &shown, Some(ReplyCode::OK))
            .await;
        self.record(Step::Send, Some(shown), Some(ReplyCode::OK), &reply);
        self.enforce()?;
        Ok(self.transition())
    }
}

// Common implementation for all states
impl<S> Client<S> {
    /// Returns the steps recorded so far.
    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Sends QUIT, closes the stream and hands back the transcript.
    ///
    /// The reply to QUIT is recorded but never checked.
    pub async fn quit(mut self) -> Transcript {
        self.exchange(Step::Quit, &Command::Quit, None).await;
        self.stream.close().await;
        self.transcript
    }

    async fn start_transaction(mut self, from: &Address) -> Result<Client<MailTransaction>> {
        let cmd = Command::MailFrom {
            from: from.email().to_string(),
        };
        self.expect(Step::From, &cmd, ReplyCode::OK).await?;
        Ok(self.transition())
    }

    async fn add_recipient(&mut self, to: &Address) -> Result<()> {
        let step = match to.role() {
            Role::To => Step::To,
            Role::Cc => Step::Cc,
            Role::Bcc => Step::Bcc,
        };
        let cmd = Command::RcptTo {
            to: to.email().to_string(),
        };
        self.expect(step, &cmd, ReplyCode::OK).await
    }

    fn transition<T>(self) -> Client<T> {
        Client {
            stream: self.stream,
            transcript: self.transcript,
            policy: self.policy,
            _state: PhantomData,
        }
    }

    /// Sends a command, records the reply and applies the failure policy.
    async fn expect(&mut self, step: Step, cmd: &Command, expected: ReplyCode) -> Result<()> {
        self.exchange(step, cmd, Some(expected)).await;
        self.enforce()
    }

    /// Sends a command and records the reply without applying the policy.
    async fn exchange(&mut self, step: Step, cmd: &Command, expected: Option<ReplyCode>) -> Reply {
        let shown = cmd.redacted();
        let reply = self
            .round_trip(step, &cmd.serialize(), &shown, expected)
            .await;
        self.record(step, Some(shown), expected, &reply);
        reply
    }

    async fn round_trip(
        &mut self,
        step: Step,
        wire: &[u8],
        shown: &str,
        expected: Option<ReplyCode>,
    ) -> Reply {
        debug!(%step, command = %shown, "SMTP >");
        if let Err(e) = self.stream.write_all(wire).await {
            warn!(%step, error = %e, "SMTP write failed");
            return Reply::empty();
        }

        let reply = self.read_reply().await;
        debug!(
            %step,
            code = ?reply.code.map(ReplyCode::as_u16),
            expected = ?expected.map(ReplyCode::as_u16),
            "SMTP <"
        );
        reply
    }

    /// Reads one complete reply; read failures end the reply early.
    async fn read_reply(&mut self) -> Reply {
        let mut lines = Vec::new();
        loop {
            let line = match self.stream.read_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "SMTP read failed");
                    break;
                }
            };
            if line.is_empty() {
                continue;
            }

            let is_last = is_last_reply_line(&line);
            lines.push(line);

            if is_last {
                break;
            }
        }

        parse_reply(lines)
    }

    fn record(
        &mut self,
        step: Step,
        command: Option<String>,
        expected: Option<ReplyCode>,
        reply: &Reply,
    ) {
        let outcome = StepOutcome::evaluate(expected, reply);
        if !outcome.is_ok() {
            warn!(%step, response = %outcome.response(), "SMTP step got unexpected reply");
        }

        self.transcript.push(StepRecord {
            step,
            command,
            outcome,
            code: reply.code.map(ReplyCode::as_u16),
        });
    }

    /// Turns the latest mismatch into an error when failing fast.
    fn enforce(&self) -> Result<()> {
        if self.policy == FailurePolicy::Collect {
            return Ok(());
        }

        match self.transcript.records().last() {
            Some(StepRecord {
                step,
                outcome: StepOutcome::Mismatch { expected, got, .. },
                ..
            }) => Err(Error::ProtocolMismatch {
                step: *step,
                expected: *expected,
                got: *got,
                transcript: Box::new(self.transcript.clone()),
            }),
            _ => Ok(()),
        }
    }
}
