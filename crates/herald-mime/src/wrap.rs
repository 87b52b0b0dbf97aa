//! Plain-text line wrapping.

/// Column plain-text bodies are wrapped at.
pub const WRAP_WIDTH: usize = 70;

/// Wraps each line of `text` at `width` columns, breaking on spaces.
///
/// The space a line is broken at is replaced by the newline. Words longer
/// than `width` are left intact on a line of their own. Existing line
/// breaks are preserved.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / width.max(1));

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        wrap_line(line, width, &mut out);
    }

    out
}

fn wrap_line(line: &str, width: usize, out: &mut String) {
    let mut current = 0usize;
    let mut first = true;

    for word in line.split(' ') {
        let len = word.chars().count();
        if first {
            out.push_str(word);
            current = len;
            first = false;
        } else if current > 0 && current + 1 + len > width {
            out.push('\n');
            out.push_str(word);
            current = len;
        } else {
            out.push(' ');
            out.push_str(word);
            current += 1 + len;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_short_line_untouched() {
        assert_eq!(wrap_text("Hello, World!", WRAP_WIDTH), "Hello, World!");
    }

    #[test]
    fn test_wraps_at_width() {
        let text = "aaaa bbbb cccc";
        assert_eq!(wrap_text(text, 9), "aaaa bbbb\ncccc");
    }

    #[test]
    fn test_long_word_not_cut() {
        assert_eq!(wrap_text("abcdefghij xy", 5), "abcdefghij\nxy");
    }

    #[test]
    fn test_existing_breaks_kept() {
        assert_eq!(wrap_text("one\ntwo three", 7), "one\ntwo\nthree");
    }

    #[test]
    fn test_no_line_exceeds_width() {
        let text = "lorem ipsum dolor sit amet ".repeat(20);
        let wrapped = wrap_text(text.trim_end(), WRAP_WIDTH);
        assert!(wrapped.lines().all(|l| l.chars().count() <= WRAP_WIDTH));
        assert_eq!(wrapped.replace('\n', " "), text.trim_end());
    }
}
