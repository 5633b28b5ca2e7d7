//! Rename command: process message files and report one line per file.

use anyhow::{Context, Result};
use emlr_core::config::RenameConfig;
use emlr_core::{
    collect_message_files, process, DisambiguationPolicy, FsSource, RenameOutcome, RunSummary,
};
use std::io::{self, Write};
use std::process::ExitCode;

use super::{apply_extract_overrides, load_config};
use crate::cli::RenameArgs;

/// Folds command-line flags over the file configuration.
pub fn apply_overrides(args: &RenameArgs, cfg: &mut RenameConfig) {
    apply_extract_overrides(&args.extract, cfg);
    if let Some(policy) = args.uniq {
        cfg.uniqueness = policy;
    }
    if args.force {
        cfg.uniqueness = DisambiguationPolicy::Overwrite;
    }
    cfg.dry_run = args.dry_run;
    cfg.verbose = args.verbose;
}

/// Exit status is failure when nothing was found or any file failed.
pub fn run_rename(args: &RenameArgs) -> Result<ExitCode> {
    let mut cfg = load_config(args.extract.config.as_deref())?;
    apply_overrides(args, &mut cfg);
    let settings = cfg.validate().context("refusing to start")?;
    tracing::debug!(
        policy = settings.policy.as_str(),
        dry_run = settings.dry_run,
        "rename run starting"
    );

    let found = collect_message_files(&args.paths, args.recursive);
    for path in &found.missing {
        eprintln!("emlr: no such file or directory: {}", path.display());
    }
    for path in &found.ignored {
        if settings.verbose {
            eprintln!("emlr: not an .eml file, ignored: {}", path.display());
        }
    }
    if found.files.is_empty() {
        eprintln!("emlr: no .eml files found");
        return Ok(ExitCode::FAILURE);
    }

    let mut summary = RunSummary::default();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for outcome in process(found.files, &settings, &FsSource) {
        summary.record(&outcome);
        report(&mut out, &outcome, args.json, settings.verbose)?;
    }
    if !args.json {
        writeln!(out, "{summary}")?;
    }
    tracing::info!("{}", summary);

    Ok(if summary.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// JSON mode prints every outcome; human mode hides skips unless verbose.
fn report<W: Write>(out: &mut W, outcome: &RenameOutcome, json: bool, verbose: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(outcome)?)?;
    } else if verbose || !matches!(outcome, RenameOutcome::Skipped { .. }) {
        writeln!(out, "{outcome}")?;
    }
    Ok(())
}
