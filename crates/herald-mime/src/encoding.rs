//! Header value encoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes a header value using RFC 2047 if it is not plain ASCII.
///
/// Format: `=?utf-8?B?encoded-text?=`
#[must_use]
pub fn encode_rfc2047(text: &str) -> String {
    if is_plain(text) {
        return text.to_string();
    }

    format!("=?utf-8?B?{}?=", encode_base64(text.as_bytes()))
}

/// Returns true if the value can appear in a header without encoding.
#[must_use]
pub fn is_plain(text: &str) -> bool {
    !text.contains("=?") && text.chars().all(|c| c.is_ascii() && !c.is_ascii_control())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_encode() {
        assert_eq!(encode_base64(b"Hello, World!"), "SGVsbG8sIFdvcmxkIQ==");
    }

    #[test]
    fn test_rfc2047_ascii_untouched() {
        assert_eq!(encode_rfc2047("Hello"), "Hello");
    }

    #[test]
    fn test_rfc2047_non_ascii() {
        assert_eq!(encode_rfc2047("Héllo"), "=?utf-8?B?SMOpbGxv?=");
    }

    #[test]
    fn test_rfc2047_control_chars_encoded() {
        let encoded = encode_rfc2047("a\r\nBcc: x");
        assert!(encoded.starts_with("=?utf-8?B?"));
        assert!(!encoded.contains('\n'));
    }
}
