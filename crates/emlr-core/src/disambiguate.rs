//! Collision policy: turn a candidate name into a final path in the target directory.
//!
//! The existence check and the later rename are not atomic with respect to
//! other processes writing the same directory. The orchestrator re-checks
//! right before renaming; anything faster than that is an accepted race.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::checksum::short_digest;
use crate::error::RenameError;
use crate::naming::{with_extension, CandidateName};

/// Upper bound for the ` (n)` search before a file is given up on.
pub const MAX_NUMERIC_SUFFIX: u32 = 9999;

/// How name collisions are resolved. Selected once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisambiguationPolicy {
    /// Append `_` and the first 8 hex chars of the content's SHA-256.
    #[default]
    Hash,
    /// Append ` (1)`, ` (2)`, ... before the extension.
    NumericSuffix,
    /// Leave both files alone.
    Skip,
    /// Replace the existing file.
    Overwrite,
}

impl DisambiguationPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            DisambiguationPolicy::Hash => "hash",
            DisambiguationPolicy::NumericSuffix => "numeric-suffix",
            DisambiguationPolicy::Skip => "skip",
            DisambiguationPolicy::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for DisambiguationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisambiguationPolicy {
    type Err = RenameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hash" => Ok(DisambiguationPolicy::Hash),
            "numeric-suffix" | "suffix" => Ok(DisambiguationPolicy::NumericSuffix),
            "skip" => Ok(DisambiguationPolicy::Skip),
            "overwrite" => Ok(DisambiguationPolicy::Overwrite),
            other => Err(RenameError::InvalidConfig(format!(
                "unknown uniqueness policy {other:?}"
            ))),
        }
    }
}

/// Outcome of collision resolution for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Free path (or the source's own current path).
    Target(PathBuf),
    /// Occupied path the caller may replace.
    Overwrite(PathBuf),
    /// Occupied path; the file must be left where it is.
    Skip(PathBuf),
}

/// Resolves `base` inside `directory` under `policy`.
///
/// `digest` yields the full hex SHA-256 of the source content. It is called
/// at most once, and only when the `hash` policy meets a collision.
/// A candidate equal to `source` counts as free, which makes re-runs idempotent.
pub fn resolve<F>(
    directory: &Path,
    base: &CandidateName,
    source: &Path,
    policy: DisambiguationPolicy,
    digest: F,
) -> Result<Resolution, RenameError>
where
    F: FnOnce() -> Result<String, RenameError>,
{
    let first = directory.join(base.file_name());
    if is_free(&first, source)? {
        return Ok(Resolution::Target(first));
    }

    match policy {
        DisambiguationPolicy::Skip => Ok(Resolution::Skip(first)),
        DisambiguationPolicy::Overwrite => Ok(Resolution::Overwrite(first)),
        DisambiguationPolicy::NumericSuffix => {
            first_free_numeric(directory, base.stem(), source, MAX_NUMERIC_SUFFIX)
                .map(Resolution::Target)
        }
        DisambiguationPolicy::Hash => {
            let full = digest()?;
            let stem = format!("{}_{}", base.stem(), short_digest(&full));
            let hashed = directory.join(with_extension(&stem));
            if is_free(&hashed, source)? {
                return Ok(Resolution::Target(hashed));
            }
            tracing::warn!(
                path = %hashed.display(),
                "hash-suffixed name already taken by other content, probing numeric suffixes"
            );
            first_free_numeric(directory, &stem, source, MAX_NUMERIC_SUFFIX).map(Resolution::Target)
        }
    }
}

fn first_free_numeric(
    directory: &Path,
    stem: &str,
    source: &Path,
    limit: u32,
) -> Result<PathBuf, RenameError> {
    for n in 1..=limit {
        let candidate = directory.join(with_extension(&format!("{stem} ({n})")));
        if is_free(&candidate, source)? {
            return Ok(candidate);
        }
    }
    Err(RenameError::NameCollisionExhausted {
        base: with_extension(stem),
        attempts: limit,
    })
}

/// A dangling symlink counts as occupied: renaming over it would destroy it.
pub(crate) fn is_free(candidate: &Path, source: &Path) -> Result<bool, RenameError> {
    if candidate == source {
        return Ok(true);
    }
    match fs::symlink_metadata(candidate) {
        Ok(_) => Ok(false),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(RenameError::Filesystem {
            op: "stat",
            path: candidate.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::Cell;

    fn base(subject: &str) -> CandidateName {
        let ts = chrono_tz::UTC
            .with_ymd_and_hms(2024, 1, 1, 9, 30, 0)
            .single()
            .unwrap();
        CandidateName::new(&ts, subject, 120)
    }

    fn no_digest() -> Result<String, RenameError> {
        panic!("digest must not be computed without a collision")
    }

    fn fixed_digest() -> Result<String, RenameError> {
        Ok("deadbeefcafef00d".to_string())
    }

    #[test]
    fn free_name_is_returned_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.eml");
        for policy in [
            DisambiguationPolicy::Hash,
            DisambiguationPolicy::NumericSuffix,
            DisambiguationPolicy::Skip,
            DisambiguationPolicy::Overwrite,
        ] {
            let r = resolve(dir.path(), &base("Hi"), &src, policy, no_digest).unwrap();
            assert_eq!(
                r,
                Resolution::Target(dir.path().join("2024-01-01 093000 Hi.eml"))
            );
        }
    }

    #[test]
    fn own_name_counts_as_free() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("2024-01-01 093000 Hi.eml");
        fs::write(&src, "x").unwrap();
        let r = resolve(dir.path(), &base("Hi"), &src, DisambiguationPolicy::Skip, no_digest)
            .unwrap();
        assert_eq!(r, Resolution::Target(src));
    }

    #[test]
    fn numeric_suffix_tried_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("2024-01-01 093000 Hi.eml"), "a").unwrap();
        fs::write(dir.path().join("2024-01-01 093000 Hi (1).eml"), "b").unwrap();
        let src = dir.path().join("in.eml");
        let r = resolve(
            dir.path(),
            &base("Hi"),
            &src,
            DisambiguationPolicy::NumericSuffix,
            no_digest,
        )
        .unwrap();
        assert_eq!(
            r,
            Resolution::Target(dir.path().join("2024-01-01 093000 Hi (2).eml"))
        );
    }

    #[test]
    fn numeric_search_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        for n in 1..=3 {
            fs::write(dir.path().join(format!("x ({n}).eml")), "a").unwrap();
        }
        let err = first_free_numeric(dir.path(), "x", &dir.path().join("in.eml"), 3).unwrap_err();
        assert!(matches!(
            err,
            RenameError::NameCollisionExhausted { attempts: 3, .. }
        ));
    }

    #[test]
    fn skip_and_overwrite_report_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("2024-01-01 093000 Hi.eml");
        fs::write(&existing, "a").unwrap();
        let src = dir.path().join("in.eml");
        let skip = resolve(dir.path(), &base("Hi"), &src, DisambiguationPolicy::Skip, no_digest);
        assert_eq!(skip.unwrap(), Resolution::Skip(existing.clone()));
        let over = resolve(
            dir.path(),
            &base("Hi"),
            &src,
            DisambiguationPolicy::Overwrite,
            no_digest,
        );
        assert_eq!(over.unwrap(), Resolution::Overwrite(existing));
    }

    #[test]
    fn hash_appends_short_digest_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("2024-01-01 093000 Hi.eml"), "a").unwrap();
        let calls = Cell::new(0);
        let r = resolve(
            dir.path(),
            &base("Hi"),
            &dir.path().join("in.eml"),
            DisambiguationPolicy::Hash,
            || {
                calls.set(calls.get() + 1);
                fixed_digest()
            },
        )
        .unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(
            r,
            Resolution::Target(dir.path().join("2024-01-01 093000 Hi_deadbeef.eml"))
        );
    }

    #[test]
    fn hash_collision_falls_back_to_numeric() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("2024-01-01 093000 Hi.eml"), "a").unwrap();
        fs::write(dir.path().join("2024-01-01 093000 Hi_deadbeef.eml"), "b").unwrap();
        let r = resolve(
            dir.path(),
            &base("Hi"),
            &dir.path().join("in.eml"),
            DisambiguationPolicy::Hash,
            fixed_digest,
        )
        .unwrap();
        assert_eq!(
            r,
            Resolution::Target(dir.path().join("2024-01-01 093000 Hi_deadbeef (1).eml"))
        );
    }

    #[test]
    fn digest_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("2024-01-01 093000 Hi.eml"), "a").unwrap();
        let missing = dir.path().join("gone.eml");
        let r = resolve(dir.path(), &base("Hi"), &missing, DisambiguationPolicy::Hash, || {
            Err(RenameError::InvalidSourceFile {
                path: missing.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "gone"),
            })
        });
        assert!(matches!(r, Err(RenameError::InvalidSourceFile { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_occupied() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("2024-01-01 093000 Hi.eml");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), &link).unwrap();
        let r = resolve(
            dir.path(),
            &base("Hi"),
            &dir.path().join("in.eml"),
            DisambiguationPolicy::Skip,
            no_digest,
        )
        .unwrap();
        assert_eq!(r, Resolution::Skip(link));
    }

    #[test]
    fn policy_parses_from_str() {
        assert_eq!("hash".parse::<DisambiguationPolicy>().unwrap(), DisambiguationPolicy::Hash);
        assert_eq!(
            "Numeric-Suffix".parse::<DisambiguationPolicy>().unwrap(),
            DisambiguationPolicy::NumericSuffix
        );
        assert_eq!(
            "suffix".parse::<DisambiguationPolicy>().unwrap(),
            DisambiguationPolicy::NumericSuffix
        );
        assert!("random".parse::<DisambiguationPolicy>().is_err());
        assert_eq!(DisambiguationPolicy::Overwrite.to_string(), "overwrite");
    }
}
