//! Per-file rename outcomes and the run summary.

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// Why a file was left where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// No header yielded a timestamp.
    NoDate,
    /// Target exists and the policy is `skip`.
    Exists,
    /// The file already carries its final name.
    Unchanged,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NoDate => "no-date",
            SkipReason::Exists => "exists",
            SkipReason::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result for one input file. Emitted once, in input order, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum RenameOutcome {
    Renamed {
        #[serde(serialize_with = "lossy_path")]
        from: PathBuf,
        #[serde(serialize_with = "lossy_path")]
        to: PathBuf,
    },
    DryRun {
        #[serde(serialize_with = "lossy_path")]
        from: PathBuf,
        #[serde(serialize_with = "lossy_path")]
        to: PathBuf,
    },
    Skipped {
        #[serde(serialize_with = "lossy_path")]
        path: PathBuf,
        reason: SkipReason,
        /// The occupying file, for `exists`.
        #[serde(
            skip_serializing_if = "Option::is_none",
            serialize_with = "lossy_opt_path"
        )]
        existing: Option<PathBuf>,
    },
    Failed {
        #[serde(serialize_with = "lossy_path")]
        path: PathBuf,
        reason: String,
    },
}

impl RenameOutcome {
    /// The input path this outcome is about.
    pub fn source(&self) -> &Path {
        match self {
            RenameOutcome::Renamed { from, .. } | RenameOutcome::DryRun { from, .. } => from,
            RenameOutcome::Skipped { path, .. } | RenameOutcome::Failed { path, .. } => path,
        }
    }

    /// Final (or would-be) path, when there is one.
    pub fn target(&self) -> Option<&Path> {
        match self {
            RenameOutcome::Renamed { to, .. } | RenameOutcome::DryRun { to, .. } => Some(to),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RenameOutcome::Renamed { .. } => "renamed",
            RenameOutcome::DryRun { .. } => "dry-run",
            RenameOutcome::Skipped { .. } => "skipped",
            RenameOutcome::Failed { .. } => "failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RenameOutcome::Failed { .. })
    }
}

fn file_name(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| p.display().to_string())
}

impl fmt::Display for RenameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenameOutcome::Renamed { from, to } => {
                write!(f, "[OK]   '{}' -> '{}'", from.display(), file_name(to))
            }
            RenameOutcome::DryRun { from, to } => {
                write!(f, "[DRY]  '{}' -> '{}'", from.display(), file_name(to))
            }
            RenameOutcome::Skipped {
                path,
                reason,
                existing,
            } => {
                write!(f, "[SKIP] '{}': {}", path.display(), reason)?;
                if let Some(e) = existing {
                    write!(f, " ('{}')", file_name(e))?;
                }
                Ok(())
            }
            RenameOutcome::Failed { path, reason } => {
                write!(f, "[FAIL] '{}': {}", path.display(), reason)
            }
        }
    }
}

fn lossy_path<S: Serializer>(p: &PathBuf, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&p.to_string_lossy())
}

fn lossy_opt_path<S: Serializer>(p: &Option<PathBuf>, s: S) -> Result<S::Ok, S::Error> {
    match p {
        Some(p) => s.serialize_some(&p.to_string_lossy()),
        None => s.serialize_none(),
    }
}

/// Counts per outcome kind for the end-of-run line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub renamed: usize,
    pub dry_run: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &RenameOutcome) {
        match outcome {
            RenameOutcome::Renamed { .. } => self.renamed += 1,
            RenameOutcome::DryRun { .. } => self.dry_run += 1,
            RenameOutcome::Skipped { .. } => self.skipped += 1,
            RenameOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.renamed + self.dry_run + self.skipped + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s): {} renamed, {} dry-run, {} skipped, {} failed",
            self.total(),
            self.renamed,
            self.dry_run,
            self.skipped,
            self.failed
        )
    }
}
