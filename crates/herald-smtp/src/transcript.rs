//! Step-by-step record of one SMTP delivery.

use crate::types::{Reply, ReplyCode};
use serde::Serialize;
use std::fmt::{self, Write as _};

/// Protocol step of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Server greeting after connect.
    Connection,
    /// `HELO`, sent again after STARTTLS.
    Hello,
    /// `STARTTLS`.
    Tls,
    /// `AUTH LOGIN`.
    AuthType,
    /// Base64 username.
    User,
    /// Base64 password.
    Pass,
    /// `MAIL FROM`.
    From,
    /// `RCPT TO` for a To recipient.
    To,
    /// `RCPT TO` for a Cc recipient.
    Cc,
    /// `RCPT TO` for a Bcc recipient.
    Bcc,
    /// `DATA`.
    Data,
    /// Message payload.
    Send,
    /// `QUIT`.
    Quit,
}

impl Step {
    /// Returns the step key used in transcripts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Hello => "hello",
            Self::Tls => "tls",
            Self::AuthType => "auth_type",
            Self::User => "user",
            Self::Pass => "pass",
            Self::From => "from",
            Self::To => "to",
            Self::Cc => "cc",
            Self::Bcc => "bcc",
            Self::Data => "data",
            Self::Send => "send",
            Self::Quit => "quit",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The reply matched, or the step was not checked.
    Ok {
        /// Raw reply text.
        response: String,
    },
    /// The reply did not carry the expected code.
    Mismatch {
        /// Code the step expected.
        expected: u16,
        /// Code received; `None` if the reply was malformed or missing.
        got: Option<u16>,
        /// Raw reply text.
        response: String,
    },
}

impl StepOutcome {
    /// Evaluates a reply against the expected code; `None` means unchecked.
    #[must_use]
    pub fn evaluate(expected: Option<ReplyCode>, reply: &Reply) -> Self {
        let response = reply.text();
        match expected {
            Some(code) if !reply.matches(code) => Self::Mismatch {
                expected: code.as_u16(),
                got: reply.code.map(ReplyCode::as_u16),
                response,
            },
            _ => Self::Ok { response },
        }
    }

    /// Returns true for [`StepOutcome::Ok`].
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// Returns the raw reply text.
    #[must_use]
    pub fn response(&self) -> &str {
        match self {
            Self::Ok { response } | Self::Mismatch { response, .. } => response,
        }
    }
}

/// One request/response pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Step key.
    pub step: Step,
    /// Command as sent, with credentials redacted; `None` for the greeting.
    pub command: Option<String>,
    /// Step result.
    #[serde(flatten)]
    pub outcome: StepOutcome,
    /// Parsed reply code, if any.
    #[serde(skip)]
    pub code: Option<u16>,
}

/// Ordered record of every step of one delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    records: Vec<StepRecord>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    pub fn push(&mut self, record: StepRecord) {
        self.records.push(record);
    }

    /// Returns all records in order.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Returns the step keys in order.
    #[must_use]
    pub fn steps(&self) -> Vec<Step> {
        self.records.iter().map(|r| r.step).collect()
    }

    /// Returns true if every recorded step succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.records.iter().all(|r| r.outcome.is_ok())
    }

    /// Returns the first failed step, if any.
    #[must_use]
    pub fn first_failure(&self) -> Option<&StepRecord> {
        self.records.iter().find(|r| !r.outcome.is_ok())
    }

    /// Returns the code of the most recent reply that had one.
    #[must_use]
    pub fn last_code(&self) -> Option<u16> {
        self.records.iter().rev().find_map(|r| r.code)
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Transcript rendering format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// `key: value` lines.
    #[default]
    PlainText,
    /// Pretty-printed JSON.
    Json,
}

/// Outcome of one `send` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReport {
    /// True only if the socket opened and every checked step matched.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Full step transcript.
    #[serde(rename = "result")]
    pub transcript: Transcript,
}

impl SendReport {
    /// Builds the report for a finished transcript.
    #[must_use]
    pub fn from_transcript(transcript: Transcript) -> Self {
        let success = transcript.is_success();
        let message = match transcript.first_failure() {
            None => "Email is sent.".to_string(),
            Some(failed) => format!(
                "Email was not sent: step {} replied {}",
                failed.step,
                failed.outcome.response().trim()
            ),
        };

        Self {
            success,
            message,
            transcript,
        }
    }

    /// Renders the report for logging.
    #[must_use]
    pub fn render(&self, format: Format) -> String {
        match format {
            Format::Json => serde_json::to_string_pretty(self).unwrap_or_default(),
            Format::PlainText => {
                let mut out = String::new();
                let _ = writeln!(out, "success: {}", self.success);
                let _ = writeln!(out, "message: {}", self.message);
                out.push_str("--- result ---\n");
                for record in self.transcript.records() {
                    let _ = writeln!(
                        out,
                        "{}: {}",
                        record.step,
                        record.outcome.response().trim()
                    );
                }
                out
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    fn record(step: Step, expected: Option<u16>, line: &str) -> StepRecord {
        let reply = crate::parser::parse_reply(vec![line.to_string()]);
        StepRecord {
            step,
            command: None,
            outcome: StepOutcome::evaluate(expected.map(ReplyCode::new), &reply),
            code: reply.code.map(ReplyCode::as_u16),
        }
    }

    #[test]
    fn test_evaluate_match() {
        let r = record(Step::Connection, Some(220), "220 ready");
        assert!(r.outcome.is_ok());
    }

    #[test]
    fn test_evaluate_mismatch() {
        let r = record(Step::AuthType, Some(334), "535 bad");
        assert_eq!(
            r.outcome,
            StepOutcome::Mismatch {
                expected: 334,
                got: Some(535),
                response: "535 bad".to_string()
            }
        );
    }

    #[test]
    fn test_unchecked_step_always_ok() {
        assert!(record(Step::Quit, None, "garbage").outcome.is_ok());
    }

    #[test]
    fn test_success_requires_all_ok() {
        let mut transcript = Transcript::new();
        transcript.push(record(Step::Connection, Some(220), "220 ready"));
        assert!(transcript.is_success());
        transcript.push(record(Step::Hello, Some(250), "500 what"));
        transcript.push(record(Step::Quit, None, "221 bye"));
        assert!(!transcript.is_success());
        assert_eq!(transcript.first_failure().unwrap().step, Step::Hello);
        assert_eq!(transcript.last_code(), Some(221));
    }

    #[test]
    fn test_render_plaintext() {
        let mut transcript = Transcript::new();
        transcript.push(record(Step::Connection, Some(220), "220 ready"));
        let report = SendReport::from_transcript(transcript);
        assert_eq!(
            report.render(Format::PlainText),
            "success: true\nmessage: Email is sent.\n--- result ---\nconnection: 220 ready\n"
        );
    }

    #[test]
    fn test_render_json_keys() {
        let mut transcript = Transcript::new();
        transcript.push(record(Step::AuthType, Some(334), "535 bad"));
        let report = SendReport::from_transcript(transcript);
        let json: serde_json::Value =
            serde_json::from_str(&report.render(Format::Json)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["result"][0]["step"], "auth_type");
        assert_eq!(json["result"][0]["outcome"], "mismatch");
        assert_eq!(json["result"][0]["got"], 535);
    }
}
