use anyhow::{Context, Result};
use chrono_tz::Tz;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::disambiguate::DisambiguationPolicy;
use crate::error::RenameError;

/// Default cap on the sanitized subject, in characters.
pub const DEFAULT_MAX_SUBJECT_LEN: usize = 120;

/// Default zone used both for display and for offset-less dates.
pub const DEFAULT_ZONE: &str = "Asia/Seoul";

/// Charset tried for raw 8-bit header bytes that are not UTF-8.
pub const DEFAULT_LEGACY_CHARSET: &str = "euc-kr";

/// Which header the timestamp is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    /// `Date` (or the configured `sent_header`, falling back to `Date`).
    #[default]
    Sent,
    /// Oldest `Received` trace line, falling back to `Date`.
    Received,
}

/// Configuration loaded from `~/.config/emlr/config.toml`. CLI flags override these values.
///
/// `dry_run` and `verbose` belong to a single invocation: they are never
/// written to or read from the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameConfig {
    /// Timestamp source: "sent" (default) or "received".
    pub mode: DateMode,
    /// Use the oldest `Received` header even in "sent" mode.
    pub prefer_received: bool,
    /// Collision policy: "hash", "numeric-suffix", "skip" or "overwrite".
    pub uniqueness: DisambiguationPolicy,
    /// Report would-be names without touching the filesystem.
    #[serde(skip)]
    pub dry_run: bool,
    /// Report unchanged and skipped files too.
    #[serde(skip)]
    pub verbose: bool,
    /// Maximum subject length in characters after sanitization.
    pub max_subject_length: usize,
    /// IANA zone timestamps are rendered in (e.g. "Asia/Seoul", "UTC").
    pub display_zone: String,
    /// Zone attached to dates that carry no UTC offset. Defaults to `display_zone`.
    pub default_zone: Option<String>,
    /// Alternate header consulted first in "sent" mode. Unset means `Date` only.
    pub sent_header: Option<String>,
    /// WHATWG label of the charset for unencoded 8-bit header text (e.g. "euc-kr", "shift_jis").
    pub legacy_charset: String,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            mode: DateMode::Sent,
            prefer_received: false,
            uniqueness: DisambiguationPolicy::Hash,
            dry_run: false,
            verbose: false,
            max_subject_length: DEFAULT_MAX_SUBJECT_LEN,
            display_zone: DEFAULT_ZONE.to_string(),
            default_zone: None,
            sent_header: None,
            legacy_charset: DEFAULT_LEGACY_CHARSET.to_string(),
        }
    }
}

/// Validated, immutable settings for one run. Built by [`RenameConfig::validate`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub mode: DateMode,
    pub prefer_received: bool,
    pub policy: DisambiguationPolicy,
    pub dry_run: bool,
    pub verbose: bool,
    pub max_subject_length: usize,
    pub display_zone: Tz,
    pub default_zone: Tz,
    pub sent_header: Option<String>,
    pub legacy_charset: &'static Encoding,
}

impl Settings {
    /// True when the timestamp should come from the `Received` trace.
    pub fn uses_received(&self) -> bool {
        self.prefer_received || self.mode == DateMode::Received
    }
}

impl RenameConfig {
    /// Rejects bad zones and lengths. Nothing is processed if this fails.
    pub fn validate(&self) -> std::result::Result<Settings, RenameError> {
        if self.max_subject_length == 0 {
            return Err(RenameError::InvalidConfig(
                "max_subject_length must be at least 1".to_string(),
            ));
        }
        let display_zone = parse_zone(&self.display_zone)?;
        let default_zone = match self.default_zone.as_deref() {
            Some(name) => parse_zone(name)?,
            None => display_zone,
        };
        let sent_header = self
            .sent_header
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string);
        let legacy_charset = Encoding::for_label(self.legacy_charset.trim().as_bytes())
            .ok_or_else(|| {
                RenameError::InvalidConfig(format!(
                    "unknown charset {:?}",
                    self.legacy_charset
                ))
            })?;

        Ok(Settings {
            mode: self.mode,
            prefer_received: self.prefer_received,
            policy: self.uniqueness,
            dry_run: self.dry_run,
            verbose: self.verbose,
            max_subject_length: self.max_subject_length,
            display_zone,
            default_zone,
            sent_header,
            legacy_charset,
        })
    }
}

fn parse_zone(name: &str) -> std::result::Result<Tz, RenameError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| RenameError::InvalidConfig(format!("unknown time zone {name:?}: {e}")))
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("emlr")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RenameConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RenameConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Load configuration from an explicit file. Unknown policy or mode strings are errors.
pub fn load_from_path(path: &Path) -> Result<RenameConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: RenameConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
