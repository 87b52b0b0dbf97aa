//! SMTP reply-line parser.

use crate::types::{Reply, ReplyCode};

/// Classification of one reply line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyLine {
    /// `DDD text`: the last line of a reply.
    Final(ReplyCode),
    /// `DDD-text`: more lines follow.
    Continuation(ReplyCode),
    /// Anything else.
    Malformed,
}

/// Classifies a reply line (terminator already stripped).
///
/// The first three characters must be digits and the fourth a space
/// (final line) or a hyphen (continuation). A bare code is malformed.
#[must_use]
pub fn parse_line(line: &str) -> ReplyLine {
    let bytes = line.as_bytes();
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return ReplyLine::Malformed;
    }

    let code = bytes[..3]
        .iter()
        .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'));
    let code = ReplyCode::new(code);

    match bytes.get(3) {
        Some(b' ') => ReplyLine::Final(code),
        Some(b'-') => ReplyLine::Continuation(code),
        _ => ReplyLine::Malformed,
    }
}

/// Checks if a line ends a reply.
///
/// Malformed lines end the reply too; the client never waits for more
/// after a line it cannot understand.
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    !matches!(parse_line(line), ReplyLine::Continuation(_))
}

/// Builds a reply from its raw lines.
///
/// The reply carries a code only if every line is well formed, the last
/// line is final and all lines agree on the code.
#[must_use]
pub fn parse_reply(lines: Vec<String>) -> Reply {
    let Some(last) = lines.last() else {
        return Reply::empty();
    };

    let code = match parse_line(last) {
        ReplyLine::Final(code) => Some(code),
        _ => None,
    };

    let consistent = lines[..lines.len() - 1]
        .iter()
        .all(|line| matches!(parse_line(line), ReplyLine::Continuation(c) if Some(c) == code));

    Reply::new(code.filter(|_| consistent), lines)
}
