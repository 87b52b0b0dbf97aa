//! Uniform result of a channel send.

use herald_smtp::{Format, SendReport};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;

/// Result of one `send` call on any channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// True if the channel accepted the message.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Vendor reply or SMTP transcript.
    #[serde(rename = "result")]
    pub raw_result: Value,
    /// HTTP status of the vendor reply; `None` for SMTP.
    pub http_status: Option<u16>,
}

impl Outcome {
    /// Renders the outcome for logging.
    #[must_use]
    pub fn render(&self, format: Format) -> String {
        match format {
            Format::Json => serde_json::to_string_pretty(self).unwrap_or_default(),
            Format::PlainText => {
                let mut out = String::new();
                let _ = writeln!(out, "success: {}", self.success);
                let _ = writeln!(out, "message: {}", self.message);
                if let Some(status) = self.http_status {
                    let _ = writeln!(out, "http_status: {status}");
                }
                out.push_str("--- result ---\n");
                write_result(&mut out, &self.raw_result);
                out
            }
        }
    }
}

impl From<SendReport> for Outcome {
    fn from(report: SendReport) -> Self {
        Self {
            success: report.success,
            raw_result: serde_json::to_value(&report.transcript).unwrap_or(Value::Null),
            message: report.message,
            http_status: None,
        }
    }
}

fn write_result(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, value) in map {
                let _ = writeln!(out, "{key}: {}", scalar(value));
            }
        }
        Value::Array(items) => {
            for item in items {
                match (item.get("step"), item.get("response")) {
                    (Some(step), Some(response)) => {
                        let _ = writeln!(out, "{}: {}", scalar(step), scalar(response).trim());
                    }
                    _ => {
                        let _ = writeln!(out, "{}", scalar(item));
                    }
                }
            }
        }
        other => {
            let _ = writeln!(out, "{}", scalar(other));
        }
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_vendor_object() {
        let outcome = Outcome {
            success: false,
            message: "Telegram API rejected the message (chat not found)".to_string(),
            raw_result: json!({"ok": false, "description": "chat not found"}),
            http_status: Some(400),
        };

        let text = outcome.render(Format::PlainText);
        assert!(text.starts_with("success: false\nmessage: Telegram API"));
        assert!(text.contains("http_status: 400\n--- result ---\n"));
        assert!(text.contains("description: chat not found\n"));
        assert!(text.contains("ok: false\n"));
    }

    #[test]
    fn test_render_transcript_array() {
        let outcome = Outcome {
            success: true,
            message: "Email is sent.".to_string(),
            raw_result: json!([
                {"step": "connection", "command": null, "outcome": "ok", "response": "220 ready"},
                {"step": "quit", "command": "QUIT", "outcome": "ok", "response": "221 bye"}
            ]),
            http_status: None,
        };

        assert_eq!(
            outcome.render(Format::PlainText),
            "success: true\nmessage: Email is sent.\n--- result ---\nconnection: 220 ready\nquit: 221 bye\n"
        );
    }

    #[test]
    fn test_render_json_uses_result_key() {
        let outcome = Outcome {
            success: true,
            message: "ok".to_string(),
            raw_result: Value::String("ok".to_string()),
            http_status: Some(200),
        };

        let json: Value = serde_json::from_str(&outcome.render(Format::Json)).unwrap();
        assert_eq!(json["result"], "ok");
        assert_eq!(json["http_status"], 200);
    }
}
