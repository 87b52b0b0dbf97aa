//! SMTP reply types.

/// Text recorded when the server sent nothing usable.
pub const NO_RESPONSE: &str = "Unable to fetch expected response.";

/// SMTP reply as read off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Code of the final reply line, `None` if the reply was malformed or
    /// the server sent nothing.
    pub code: Option<ReplyCode>,
    /// Raw reply lines, without line terminators.
    pub lines: Vec<String>,
}

impl Reply {
    /// Creates a new reply.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec is not const-compatible
    pub fn new(code: Option<ReplyCode>, lines: Vec<String>) -> Self {
        Self { code, lines }
    }

    /// Creates the reply recorded when nothing could be read.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            code: None,
            lines: Vec::new(),
        }
    }

    /// Returns true if the reply carries the expected code.
    #[must_use]
    pub fn matches(&self, expected: ReplyCode) -> bool {
        self.code == Some(expected)
    }

    /// Returns the raw reply text, one line per reply line.
    #[must_use]
    pub fn text(&self) -> String {
        if self.lines.is_empty() {
            NO_RESPONSE.to_string()
        } else {
            self.lines.join("\n")
        }
    }
}

/// SMTP reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// Creates a new reply code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns true if this is a success code (2xx).
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Returns true if this is an intermediate reply (3xx).
    #[must_use]
    pub const fn is_intermediate(self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub const fn is_transient(self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        self.0 >= 500 && self.0 < 600
    }
}

impl std::fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Codes the delivery sequence expects
impl ReplyCode {
    /// 220 Service ready
    pub const SERVICE_READY: Self = Self(220);
    /// 221 Service closing transmission channel
    pub const CLOSING: Self = Self(221);
    /// 235 Authentication succeeded
    pub const AUTH_SUCCEEDED: Self = Self(235);
    /// 250 Requested mail action okay, completed
    pub const OK: Self = Self(250);
    /// 334 Continue with authentication
    pub const AUTH_CONTINUE: Self = Self(334);
    /// 354 Start mail input
    pub const START_DATA: Self = Self(354);
    /// 454 TLS not available due to temporary reason
    pub const TLS_UNAVAILABLE: Self = Self(454);
    /// 535 Authentication credentials invalid
    pub const AUTH_FAILED: Self = Self(535);
    /// 550 Mailbox unavailable (not found, access denied)
    pub const MAILBOX_UNAVAILABLE: Self = Self(550);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    mod reply_code_tests {
        use super::*;

        #[test]
        fn classes() {
            assert!(ReplyCode::OK.is_success());
            assert!(ReplyCode::SERVICE_READY.is_success());
            assert!(ReplyCode::AUTH_CONTINUE.is_intermediate());
            assert!(ReplyCode::START_DATA.is_intermediate());
            assert!(ReplyCode::TLS_UNAVAILABLE.is_transient());
            assert!(ReplyCode::AUTH_FAILED.is_permanent());
            assert!(!ReplyCode::OK.is_permanent());
        }

        #[test]
        fn display() {
            assert_eq!(format!("{}", ReplyCode::OK), "250");
            assert_eq!(ReplyCode::new(535), ReplyCode::AUTH_FAILED);
        }
    }

    mod reply_tests {
        use super::*;

        #[test]
        fn matches_expected_code() {
            let reply = Reply::new(Some(ReplyCode::OK), vec!["250 OK".to_string()]);
            assert!(reply.matches(ReplyCode::OK));
            assert!(!reply.matches(ReplyCode::SERVICE_READY));
        }

        #[test]
        fn malformed_never_matches() {
            let reply = Reply::new(None, vec!["garbage".to_string()]);
            assert!(!reply.matches(ReplyCode::OK));
            assert_eq!(reply.text(), "garbage");
        }

        #[test]
        fn empty_reply_text() {
            assert_eq!(Reply::empty().text(), NO_RESPONSE);
        }

        #[test]
        fn multi_line_text() {
            let reply = Reply::new(
                Some(ReplyCode::SERVICE_READY),
                vec!["220-smtp.example.com".to_string(), "220 ready".to_string()],
            );
            assert_eq!(reply.text(), "220-smtp.example.com\n220 ready");
        }
    }
}
