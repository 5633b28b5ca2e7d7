//! Lenient RFC 5322 date parsing.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;

/// Layouts tried when the date carries no usable zone.
const FLOATING_LAYOUTS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%a, %d %b %Y %H:%M",
    "%d %b %Y %H:%M",
    "%a %b %d %H:%M:%S %Y",
    "%Y-%m-%d %H:%M:%S",
];

/// A parsed header date, before zone policy is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    /// The source named its UTC offset.
    Zoned(DateTime<FixedOffset>),
    /// No offset, or the RFC 5322 "unknown local offset" `-0000`.
    Floating(NaiveDateTime),
}

/// Layouts with a numeric offset that RFC 2822 parsing does not cover.
const ZONED_LAYOUTS: &[&str] = &["%Y-%m-%d %H:%M:%S %z", "%Y-%m-%dT%H:%M:%S%z"];

/// Parses a header date. Returns `None` on anything unusable; never panics.
///
/// A date that names a numeric offset is either read with that offset or
/// rejected; it never falls through to a parser that would drop the offset.
pub fn parse_header_date(raw: &str) -> Option<ParsedDate> {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return None;
    }

    if let Some(local) = cleaned.strip_suffix(" -0000") {
        return parse_floating(strip_weekday(local)).map(ParsedDate::Floating);
    }

    if let Some(dt) = parse_zoned(&cleaned) {
        return Some(ParsedDate::Zoned(dt));
    }
    if ends_with_numeric_offset(&cleaned) {
        tracing::debug!(date = %cleaned, "date with numeric offset rejected");
        return None;
    }

    if let Some(naive) = parse_floating(&cleaned) {
        return Some(ParsedDate::Floating(naive));
    }

    // Unrecognized zone abbreviation ("KST", "CEST"): treat as offset-less.
    if let Some((head, zone)) = cleaned.rsplit_once(' ') {
        if zone.chars().all(|c| c.is_ascii_alphabetic()) {
            if let Some(naive) = parse_floating(head) {
                return Some(ParsedDate::Floating(naive));
            }
        }
    }

    if !cleaned.contains(|c: char| c.is_ascii_digit()) {
        return None;
    }
    // Nothing above found a zone, so the wall-clock value is all that is known.
    let secs = mailparse::dateparse(&cleaned).ok()?;
    let naive = DateTime::from_timestamp(secs, 0)?.naive_utc();
    Some(ParsedDate::Floating(naive))
}

fn parse_zoned(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt);
    }
    // A weekday that disagrees with the date is common in the wild.
    let no_weekday = strip_weekday(s);
    if no_weekday.len() != s.len() {
        if let Ok(dt) = DateTime::parse_from_rfc2822(no_weekday) {
            return Some(dt);
        }
    }
    ZONED_LAYOUTS
        .iter()
        .find_map(|layout| DateTime::parse_from_str(s, layout).ok())
}

/// Drops a leading `"Mon, "` style day name.
fn strip_weekday(s: &str) -> &str {
    match s.split_once(", ") {
        Some((day, rest)) if day.len() == 3 && day.chars().all(|c| c.is_ascii_alphabetic()) => rest,
        _ => s,
    }
}

/// True when the last token is `+HHMM` / `-HHMM`.
fn ends_with_numeric_offset(s: &str) -> bool {
    let last = s.rsplit(' ').next().unwrap_or(s);
    let b = last.as_bytes();
    b.len() == 5 && matches!(b[0], b'+' | b'-') && b[1..].iter().all(u8::is_ascii_digit)
}

/// Applies zone policy: offset-less dates get `default_zone`, all results are
/// rendered in `display_zone`.
pub fn localize(parsed: ParsedDate, default_zone: Tz, display_zone: Tz) -> Option<DateTime<Tz>> {
    match parsed {
        ParsedDate::Zoned(dt) => Some(dt.with_timezone(&display_zone)),
        ParsedDate::Floating(naive) => default_zone
            .from_local_datetime(&naive)
            .earliest()
            // Local time inside a DST gap: shift past it.
            .or_else(|| {
                default_zone
                    .from_local_datetime(&(naive + TimeDelta::hours(1)))
                    .earliest()
            })
            .map(|dt| dt.with_timezone(&display_zone)),
    }
}

fn parse_floating(s: &str) -> Option<NaiveDateTime> {
    FLOATING_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(s, layout).ok())
}

/// Drops `(comments)`, collapses whitespace, and trims stray trailing punctuation.
fn clean(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;
    for c in raw.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth > 0 => {}
            c if c.is_whitespace() => {
                if !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            c => out.push(c),
        }
    }
    let out = out.trim().trim_end_matches([',', '.']).trim_end();
    normalize_colon_offset(out)
}

/// Rewrites a trailing `+09:00` as `+0900`.
fn normalize_colon_offset(s: &str) -> String {
    let (head, last) = s.rsplit_once(' ').unwrap_or(("", s));
    let b = last.as_bytes();
    let colon_form = b.len() == 6
        && matches!(b[0], b'+' | b'-')
        && b[1..3].iter().all(u8::is_ascii_digit)
        && b[3] == b':'
        && b[4..].iter().all(u8::is_ascii_digit);
    if !colon_form || head.is_empty() {
        return s.to_string();
    }
    format!("{head} {}{}", &last[..3], &last[4..])
}
