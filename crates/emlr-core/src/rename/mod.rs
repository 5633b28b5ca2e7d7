//! Rename orchestration: one outcome per input file, in input order.
//!
//! Every per-file error is caught here and reported as a `Failed` outcome;
//! a bad file never stops the run.

mod outcome;

pub use outcome::{RenameOutcome, RunSummary, SkipReason};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::disambiguate::{self, Resolution};
use crate::error::RenameError;
use crate::extract::{extract, Extracted};
use crate::headers::MessageHeaders;
use crate::naming::CandidateName;
use crate::source::MessageSource;

/// What the engine would name a message, before looking at the directory.
#[derive(Debug, Clone)]
pub struct Proposal {
    pub headers: MessageHeaders,
    pub extracted: Extracted,
    /// `None` when no timestamp could be extracted.
    pub candidate: Option<CandidateName>,
}

/// Reads and parses the headers of `path` and derives its candidate name.
pub fn propose<S>(path: &Path, settings: &Settings, source: &S) -> Result<Proposal, RenameError>
where
    S: MessageSource + ?Sized,
{
    let raw = source
        .read_headers(path)
        .map_err(|e| invalid_source(path, e))?;
    let headers = MessageHeaders::parse(&raw, settings.legacy_charset)
        .map_err(|e| invalid_source(path, io::Error::new(io::ErrorKind::InvalidData, e)))?;

    let extracted = extract(&headers, settings);
    let candidate = extracted
        .timestamp
        .as_ref()
        .map(|ts| CandidateName::new(ts, &extracted.subject, settings.max_subject_length));
    Ok(Proposal {
        headers,
        extracted,
        candidate,
    })
}

/// Lazy sequence of outcomes; each file is handled when pulled.
pub struct Renamer<'a, S: ?Sized> {
    paths: std::vec::IntoIter<PathBuf>,
    settings: &'a Settings,
    source: &'a S,
}

impl<S: MessageSource + ?Sized> Iterator for Renamer<'_, S> {
    type Item = RenameOutcome;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths.next()?;
        Some(rename_one(&path, self.settings, self.source))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.paths.size_hint()
    }
}

/// Renames `paths` one after another under `settings`.
pub fn process<'a, S>(paths: Vec<PathBuf>, settings: &'a Settings, source: &'a S) -> Renamer<'a, S>
where
    S: MessageSource + ?Sized,
{
    Renamer {
        paths: paths.into_iter(),
        settings,
        source,
    }
}

/// Handles a single file. Never panics on bad input; errors become `Failed`.
pub fn rename_one<S>(path: &Path, settings: &Settings, source: &S) -> RenameOutcome
where
    S: MessageSource + ?Sized,
{
    match decide_and_apply(path, settings, source) {
        Ok(outcome) => {
            match &outcome {
                RenameOutcome::Renamed { to, .. } => tracing::info!(
                    path = %path.display(),
                    target = %to.display(),
                    policy = settings.policy.as_str(),
                    "renamed"
                ),
                RenameOutcome::Skipped { reason, .. } => {
                    tracing::debug!(path = %path.display(), reason = reason.as_str(), "skipped")
                }
                _ => {}
            }
            outcome
        }
        Err(RenameError::NoTimestamp) => RenameOutcome::Skipped {
            path: path.to_path_buf(),
            reason: SkipReason::NoDate,
            existing: None,
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "rename failed");
            RenameOutcome::Failed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    }
}

fn decide_and_apply<S>(
    path: &Path,
    settings: &Settings,
    source: &S,
) -> Result<RenameOutcome, RenameError>
where
    S: MessageSource + ?Sized,
{
    let proposal = propose(path, settings, source)?;
    let candidate = proposal.candidate.ok_or(RenameError::NoTimestamp)?;
    tracing::debug!(candidate = %candidate, "proposed name for {}", path.display());

    let directory = path.parent().unwrap_or_else(|| Path::new(""));
    let resolution = disambiguate::resolve(directory, &candidate, path, settings.policy, || {
        source
            .content_digest(path)
            .map_err(|e| invalid_source(path, e))
    })?;

    let (target, overwrite) = match resolution {
        Resolution::Skip(existing) => {
            return Ok(RenameOutcome::Skipped {
                path: path.to_path_buf(),
                reason: SkipReason::Exists,
                existing: Some(existing),
            })
        }
        Resolution::Target(target) => (target, false),
        Resolution::Overwrite(target) => (target, true),
    };

    if target == path {
        return Ok(RenameOutcome::Skipped {
            path: path.to_path_buf(),
            reason: SkipReason::Unchanged,
            existing: None,
        });
    }
    if settings.dry_run {
        return Ok(RenameOutcome::DryRun {
            from: path.to_path_buf(),
            to: target,
        });
    }

    apply(path, &target, overwrite)?;
    Ok(RenameOutcome::Renamed {
        from: path.to_path_buf(),
        to: target,
    })
}

/// Moves `from` to `to`. Without `overwrite`, the target is checked once more
/// so a file created since resolution is not replaced.
fn apply(from: &Path, to: &Path, overwrite: bool) -> Result<(), RenameError> {
    if overwrite {
        tracing::warn!("overwriting {}", to.display());
    } else if !disambiguate::is_free(to, from)? {
        return Err(RenameError::TargetAppeared(to.to_path_buf()));
    }
    fs::rename(from, to).map_err(|source| RenameError::Filesystem {
        op: "rename",
        path: from.to_path_buf(),
        source,
    })
}

fn invalid_source(path: &Path, source: io::Error) -> RenameError {
    RenameError::InvalidSourceFile {
        path: path.to_path_buf(),
        source,
    }
}
