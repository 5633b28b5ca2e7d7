//! Grep command: print message files whose header block matches a pattern.

use anyhow::{Context, Result};
use emlr_core::{collect_message_files, FsSource, HeaderPattern, MessageSource};
use encoding_rs::Encoding;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use super::load_config;
use crate::cli::GrepArgs;

/// Exit status is success only when at least one file matched.
pub fn run_grep(args: &GrepArgs) -> Result<ExitCode> {
    let pattern = HeaderPattern::new(&args.pattern)
        .with_context(|| format!("invalid pattern {:?}", args.pattern))?;
    let settings = load_config(args.config.as_deref())?
        .validate()
        .context("refusing to start")?;

    let found = collect_message_files(&args.paths, args.recursive);
    for path in &found.missing {
        eprintln!("emlr: no such file or directory: {}", path.display());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let hits = grep_files(
        &mut out,
        &pattern,
        &found.files,
        &FsSource,
        settings.legacy_charset,
    )?;

    Ok(if hits > 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Writes each matching path on its own line; unreadable files go to stderr.
fn grep_files<W, S>(
    out: &mut W,
    pattern: &HeaderPattern,
    files: &[PathBuf],
    source: &S,
    legacy: &'static Encoding,
) -> Result<usize>
where
    W: Write,
    S: MessageSource + ?Sized,
{
    let mut hits = 0;
    for path in files {
        match pattern.matches(path, source, legacy) {
            Ok(true) => {
                hits += 1;
                writeln!(out, "{}", path.display())?;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read headers");
                eprintln!("emlr: cannot read {}: {}", path.display(), e);
            }
        }
    }
    Ok(hits)
}
