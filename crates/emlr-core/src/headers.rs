//! Ordered, case-insensitive view of a message's header block.

use encoding_rs::{Encoding, WINDOWS_1252};
use std::borrow::Cow;

/// One header line, unfolded. `value` is the raw text; encoded words are left intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    pub name: String,
    pub value: String,
}

/// Header fields in file order. Repeated names (e.g. `Received`) are kept.
#[derive(Debug, Clone, Default)]
pub struct MessageHeaders {
    fields: Vec<HeaderField>,
}

impl MessageHeaders {
    /// Parses a raw header block (everything before the first empty line).
    ///
    /// Splitting and continuation handling are delegated to `mailparse`;
    /// values are unfolded but encoded words are left intact. Raw 8-bit
    /// values that are not UTF-8 are read as `legacy`.
    pub fn parse(raw: &[u8], legacy: &'static Encoding) -> Result<Self, mailparse::MailParseError> {
        let (parsed, _) = mailparse::parse_headers(raw)?;
        let fields = parsed
            .iter()
            .map(|h| HeaderField {
                name: h.get_key().trim().to_string(),
                value: unfold(&decode_header_bytes(h.get_value_raw(), legacy)),
            })
            .collect();
        Ok(Self { fields })
    }

    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| HeaderField {
                    name: k.into(),
                    value: v.into(),
                })
                .collect(),
        }
    }

    /// First value for `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.value.as_str())
    }

    /// All values for `name` in file order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.value.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderField> {
        self.fields.iter()
    }
}

/// Text of an unencoded header value: UTF-8 if valid, else `legacy` if it
/// decodes cleanly, else Windows-1252, which accepts any byte.
pub fn decode_header_bytes<'a>(bytes: &'a [u8], legacy: &'static Encoding) -> Cow<'a, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }
    if let Some(text) = legacy.decode_without_bom_handling_and_without_replacement(bytes) {
        return text;
    }
    WINDOWS_1252.decode_without_bom_handling(bytes).0
}

/// Removes line breaks that precede folding whitespace, then trims.
fn unfold(value: &str) -> String {
    if !value.contains('\n') {
        return value.trim().to_string();
    }
    let mut out = String::with_capacity(value.len());
    for (i, line) in value.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if i > 0 && !line.starts_with([' ', '\t']) {
            out.push(' ');
        }
        out.push_str(line);
    }
    out.trim().replace('\t', " ")
}
