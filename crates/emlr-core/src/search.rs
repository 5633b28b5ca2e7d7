//! Case-insensitive regex search over header blocks. Bodies are never read.

use std::io;
use std::path::Path;

use encoding_rs::Encoding;
use regex::{Regex, RegexBuilder};

use crate::headers::decode_header_bytes;
use crate::source::MessageSource;

/// A compiled header pattern. `^` and `$` match at line boundaries.
#[derive(Debug, Clone)]
pub struct HeaderPattern {
    regex: Regex,
}

impl HeaderPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .multi_line(true)
            .build()?;
        Ok(Self { regex })
    }

    /// True when the raw header block matches. Folded lines are searched as written.
    pub fn matches_block(&self, block: &[u8], legacy: &'static Encoding) -> bool {
        self.regex.is_match(&decode_header_bytes(block, legacy))
    }

    /// Reads the header block of `path` through `source` and tests it.
    pub fn matches<S>(&self, path: &Path, source: &S, legacy: &'static Encoding) -> io::Result<bool>
    where
        S: MessageSource + ?Sized,
    {
        let block = source.read_headers(path)?;
        let hit = self.matches_block(&block, legacy);
        tracing::debug!(path = %path.display(), hit, "header search");
        Ok(hit)
    }
}
