//! Filesystem-safe subject tokens.

/// Substituted when nothing usable is left of the subject.
pub const FALLBACK_SUBJECT: &str = "untitled";

/// Byte budget for the subject so the whole name stays under NAME_MAX (255)
/// after the timestamp, a hash token, a numeric suffix and the extension.
pub const MAX_SUBJECT_BYTES: usize = 200;

/// Characters rejected by at least one common filesystem.
const ILLEGAL: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Sanitizes a decoded subject for use in a filename.
///
/// - Replaces each run of `\ / : * ? " < > |`, control characters and
///   whitespace with a single space
/// - Trims leading/trailing whitespace
/// - Limits to `max_len` characters and [`MAX_SUBJECT_BYTES`] bytes
/// - Falls back to [`FALLBACK_SUBJECT`] when the result is empty
///
/// Pure and idempotent.
pub fn sanitize_subject(subject: &str, max_len: usize) -> String {
    let max_len = max_len.max(1);

    let mut out = String::with_capacity(subject.len());
    let mut pending_space = false;
    for c in subject.chars() {
        if ILLEGAL.contains(&c) || c.is_control() || c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }

    let truncated = truncate(&out, max_len);
    if truncated.is_empty() {
        truncate(FALLBACK_SUBJECT, max_len).to_string()
    } else {
        truncated.to_string()
    }
}

/// Cuts to `max_chars` characters and [`MAX_SUBJECT_BYTES`] bytes on a char
/// boundary, then drops trailing whitespace.
fn truncate(s: &str, max_chars: usize) -> &str {
    let mut end = s
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    if end > MAX_SUBJECT_BYTES {
        end = MAX_SUBJECT_BYTES;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
    }
    s[..end].trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn replaces_illegal_runs_with_one_space() {
        assert_eq!(sanitize_subject("Hello/World:Test", 120), "Hello World Test");
        assert_eq!(sanitize_subject("a<>|b", 120), "a b");
        assert_eq!(sanitize_subject("what?*\"now\"", 120), "what now");
    }

    #[test]
    fn collapses_and_trims_whitespace() {
        assert_eq!(sanitize_subject("  Re:   lunch \r\n plans\t ", 120), "Re lunch plans");
    }

    #[test]
    fn empty_and_illegal_only_fall_back() {
        assert_eq!(sanitize_subject("", 120), "untitled");
        assert_eq!(sanitize_subject(" /:*? ", 120), "untitled");
        assert_eq!(sanitize_subject("\r\n", 120), "untitled");
    }

    #[test]
    fn truncates_by_chars_and_trims() {
        assert_eq!(sanitize_subject("abc def", 4), "abc");
        assert_eq!(sanitize_subject("안녕하세요 여러분", 5), "안녕하세요");
    }

    #[test]
    fn caps_bytes_on_char_boundary() {
        let long = "한".repeat(100);
        let out = sanitize_subject(&long, 120);
        assert!(out.len() <= MAX_SUBJECT_BYTES);
        assert_eq!(out.chars().count(), MAX_SUBJECT_BYTES / 3);
    }

    #[test]
    fn tiny_limit_still_non_empty() {
        assert_eq!(sanitize_subject("", 3), "unt");
        assert_eq!(sanitize_subject("unt", 3), "unt");
        assert_eq!(sanitize_subject("xyz", 0), "x");
    }

    proptest! {
        #[test]
        fn idempotent(s in any::<String>(), max in 1usize..160) {
            let once = sanitize_subject(&s, max);
            prop_assert_eq!(sanitize_subject(&once, max), once);
        }

        #[test]
        fn total(s in any::<String>(), max in 1usize..160) {
            let out = sanitize_subject(&s, max);
            prop_assert!(!out.is_empty());
            prop_assert!(!out.contains(ILLEGAL));
            prop_assert!(!out.contains(['\r', '\n']));
            prop_assert!(out.chars().count() <= max);
            prop_assert!(out.len() <= MAX_SUBJECT_BYTES);
            prop_assert_eq!(out.trim(), out.as_str());
        }
    }
}
