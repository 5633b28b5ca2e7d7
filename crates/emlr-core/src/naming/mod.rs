//! Candidate filename derivation.
//!
//! A candidate is `"<YYYY-MM-DD HHMMSS> <subject>"`, a pure function of the
//! extracted timestamp and subject. Collision handling lives in
//! [`crate::disambiguate`].

mod sanitize;

pub use sanitize::{sanitize_subject, FALLBACK_SUBJECT, MAX_SUBJECT_BYTES};

use chrono::DateTime;
use chrono_tz::Tz;
use std::fmt;

/// strftime layout of the timestamp prefix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H%M%S";

/// Extension given to every renamed message.
pub const EXTENSION: &str = "eml";

/// Filename stem proposed for a message, before disambiguation. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateName(String);

impl CandidateName {
    /// Builds the stem from a timestamp and a raw (decoded, unsanitized) subject.
    pub fn new(timestamp: &DateTime<Tz>, subject: &str, max_subject_len: usize) -> Self {
        CandidateName(format!(
            "{} {}",
            timestamp.format(TIMESTAMP_FORMAT),
            sanitize_subject(subject, max_subject_len)
        ))
    }

    pub fn stem(&self) -> &str {
        &self.0
    }

    /// `stem.eml`
    pub fn file_name(&self) -> String {
        with_extension(&self.0)
    }
}

impl fmt::Display for CandidateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Appends the message extension to a stem.
pub fn with_extension(stem: &str) -> String {
    format!("{stem}.{EXTENSION}")
}

/// True when `name` ends in `.eml`, ignoring case.
pub fn has_message_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case(EXTENSION))
}
