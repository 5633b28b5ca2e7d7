//! Header extraction: best-effort timestamp and decoded subject.
//!
//! Absence of a timestamp is an expected result, not an error. Decoding
//! problems are recovered here and never reach the caller.

mod date;

pub use date::{localize, parse_header_date, ParsedDate};

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::config::Settings;
use crate::headers::MessageHeaders;

/// What the renamer needs from a header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Timestamp in the display zone, if any header yielded one.
    pub timestamp: Option<DateTime<Tz>>,
    /// Decoded subject; empty when the header is missing.
    pub subject: String,
}

/// Sender-side fields shown by `inspect`; not used for naming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub from: String,
    pub to: String,
    /// `X-Originating-IP` without its surrounding brackets.
    pub originating_ip: String,
    /// Some header value mentions `PHPMailer`, a common mark of bulk or phishing mail.
    pub phpmailer: bool,
}

/// Collects [`Envelope`] fields. Missing headers are empty strings.
pub fn envelope(headers: &MessageHeaders) -> Envelope {
    let text = |name: &str| headers.get(name).map(decode_header_text).unwrap_or_default();
    Envelope {
        from: text("From"),
        to: text("To"),
        originating_ip: headers
            .get("X-Originating-IP")
            .map(|v| v.trim().trim_start_matches('[').trim_end_matches(']').to_string())
            .unwrap_or_default(),
        phpmailer: headers.iter().any(|f| f.value.contains("PHPMailer")),
    }
}

/// Extracts timestamp and subject. Pure: same headers and settings, same result.
pub fn extract(headers: &MessageHeaders, settings: &Settings) -> Extracted {
    Extracted {
        timestamp: select_timestamp(headers, settings),
        subject: headers
            .get("Subject")
            .map(decode_header_text)
            .unwrap_or_default(),
    }
}

fn select_timestamp(headers: &MessageHeaders, settings: &Settings) -> Option<DateTime<Tz>> {
    let resolve = |raw: &str| {
        parse_header_date(raw)
            .and_then(|p| localize(p, settings.default_zone, settings.display_zone))
    };

    if settings.uses_received() {
        let received = headers.get_all("Received");
        // Trace lines are prepended in transit: the last one is the oldest.
        if let Some(ts) = received
            .last()
            .and_then(|v| received_date_fragment(v))
            .and_then(resolve)
        {
            return Some(ts);
        }
        if !received.is_empty() {
            tracing::debug!("oldest Received header has no usable date, using Date");
        }
    } else if let Some(name) = settings.sent_header.as_deref() {
        if let Some(ts) = headers.get(name).and_then(resolve) {
            return Some(ts);
        }
        tracing::debug!(header = name, "sent header missing or unparseable, using Date");
    }

    headers.get("Date").and_then(resolve)
}

/// The date part of a `Received` value: the text after its final `;`.
pub fn received_date_fragment(value: &str) -> Option<&str> {
    value
        .rsplit_once(';')
        .map(|(_, date)| date.trim())
        .filter(|date| !date.is_empty())
}

/// Decodes RFC 2047 encoded words in an unstructured header value.
///
/// Words in an unknown charset stay as written; if the value cannot be
/// parsed at all the raw text is used.
pub fn decode_header_text(raw: &str) -> String {
    if !raw.contains("=?") {
        return raw.trim().to_string();
    }
    let line = format!("X: {raw}\r\n");
    match mailparse::parse_header(line.as_bytes()) {
        Ok((header, _)) => header.get_value().trim().to_string(),
        Err(e) => {
            tracing::debug!(error = %e, "header decode failed, keeping raw text");
            raw.trim().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DateMode, RenameConfig};
    use chrono::{Datelike, Timelike};

    fn settings() -> Settings {
        RenameConfig::default().validate().unwrap()
    }

    fn hms(ts: &DateTime<Tz>) -> (u32, u32, u32) {
        (ts.hour(), ts.minute(), ts.second())
    }

    #[test]
    fn date_header_in_display_zone() {
        let h = MessageHeaders::from_fields([
            ("Date", "Mon, 1 Jan 2024 09:30:00 +0900"),
            ("Subject", "Hello/World:Test"),
        ]);
        let ex = extract(&h, &settings());
        let ts = ex.timestamp.unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 1, 1));
        assert_eq!(hms(&ts), (9, 30, 0));
        assert_eq!(ex.subject, "Hello/World:Test");
    }

    #[test]
    fn missing_date_is_absent() {
        let h = MessageHeaders::from_fields([("Subject", "x")]);
        assert!(extract(&h, &settings()).timestamp.is_none());
    }

    #[test]
    fn unparseable_date_is_absent() {
        let h = MessageHeaders::from_fields([("Date", "yesterday-ish")]);
        assert!(extract(&h, &settings()).timestamp.is_none());
    }

    #[test]
    fn prefer_received_uses_oldest_trace() {
        let h = MessageHeaders::from_fields([
            ("Received", "from b by c; Tue, 2 Jan 2024 10:00:00 +0000"),
            ("Received", "from a by b; Mon, 1 Jan 2024 09:00:00 +0000"),
            ("Date", "Sun, 31 Dec 2023 23:00:00 +0000"),
        ]);
        let mut s = settings();
        s.prefer_received = true;
        s.display_zone = chrono_tz::UTC;
        let ts = extract(&h, &s).timestamp.unwrap();
        assert_eq!(ts.day(), 1);
        assert_eq!(ts.hour(), 9);
    }

    #[test]
    fn received_mode_falls_back_to_date() {
        let h = MessageHeaders::from_fields([
            ("Received", "from a by b with no date"),
            ("Date", "Sun, 31 Dec 2023 23:00:00 +0000"),
        ]);
        let mut s = settings();
        s.mode = DateMode::Received;
        s.display_zone = chrono_tz::UTC;
        let ts = extract(&h, &s).timestamp.unwrap();
        assert_eq!((ts.day(), ts.hour()), (31, 23));
    }

    #[test]
    fn received_without_trace_uses_date() {
        let h = MessageHeaders::from_fields([("Date", "Sun, 31 Dec 2023 23:00:00 +0000")]);
        let mut s = settings();
        s.prefer_received = true;
        assert!(extract(&h, &s).timestamp.is_some());
    }

    #[test]
    fn sent_header_consulted_then_date() {
        let h = MessageHeaders::from_fields([
            ("X-Original-Date", "Wed, 3 Jan 2024 08:00:00 +0000"),
            ("Date", "Sun, 31 Dec 2023 23:00:00 +0000"),
        ]);
        let mut s = settings();
        s.display_zone = chrono_tz::UTC;
        s.sent_header = Some("x-original-date".to_string());
        assert_eq!(extract(&h, &s).timestamp.unwrap().day(), 3);

        s.sent_header = Some("X-Absent".to_string());
        assert_eq!(extract(&h, &s).timestamp.unwrap().day(), 31);
    }

    #[test]
    fn offsetless_gets_default_zone() {
        let h = MessageHeaders::from_fields([("Date", "Mon, 1 Jan 2024 09:30:00")]);
        let mut s = settings();
        s.display_zone = chrono_tz::UTC;
        s.default_zone = chrono_tz::Asia::Seoul;
        let ts = extract(&h, &s).timestamp.unwrap();
        assert_eq!(hms(&ts), (0, 30, 0));
    }

    #[test]
    fn extraction_is_deterministic() {
        let h = MessageHeaders::from_fields([
            ("Date", "Fri, 5 Jul 2019 08:15:00 GMT"),
            ("Subject", "=?utf-8?Q?caf=C3=A9?="),
        ]);
        let s = settings();
        assert_eq!(extract(&h, &s), extract(&h, &s));
    }

    #[test]
    fn subject_decoded_or_raw() {
        assert_eq!(decode_header_text("=?utf-8?B?SMOpbGxv?="), "Héllo");
        assert_eq!(decode_header_text("  plain  "), "plain");
        assert_eq!(
            decode_header_text("=?ISO-8859-1?Q?Caf=E9_au_lait?="),
            "Café au lait"
        );
        assert_eq!(
            decode_header_text("Re: =?utf-8?Q?H=C3=A9llo?= there"),
            "Re: Héllo there"
        );
    }

    #[test]
    fn adjacent_words_join_across_charsets() {
        assert_eq!(
            decode_header_text("=?EUC-KR?B?vsiz5w==?= =?UTF-8?B?7IS47JqU?="),
            "안녕세요"
        );
    }

    #[test]
    fn unknown_charset_keeps_word() {
        let out = decode_header_text("=?x-unknown?Q?abc?=");
        assert!(out.contains("abc"), "{out}");
    }

    #[test]
    fn envelope_fields() {
        let h = MessageHeaders::from_fields([
            ("From", "=?UTF-8?B?7ZmN6ri464+Z?= <hong@example.com>"),
            ("To", "a@example.com, b@example.com"),
            ("X-Originating-IP", "[203.0.113.7]"),
            ("X-Mailer", "PHPMailer 5.2.9"),
        ]);
        let env = envelope(&h);
        assert_eq!(env.from, "홍길동 <hong@example.com>");
        assert_eq!(env.to, "a@example.com, b@example.com");
        assert_eq!(env.originating_ip, "203.0.113.7");
        assert!(env.phpmailer);
    }

    #[test]
    fn envelope_of_sparse_headers_is_empty() {
        let h = MessageHeaders::from_fields([("X-Mailer", "phpmailer lowercase")]);
        assert_eq!(envelope(&h), Envelope::default());
    }

    #[test]
    fn received_fragment_after_last_semicolon() {
        assert_eq!(
            received_date_fragment("from a; by b; Mon, 1 Jan 2024 09:00:00 +0000"),
            Some("Mon, 1 Jan 2024 09:00:00 +0000")
        );
        assert_eq!(received_date_fragment("from a by b"), None);
        assert_eq!(received_date_fragment("from a;  "), None);
    }
}
