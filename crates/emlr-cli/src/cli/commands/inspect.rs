//! Inspect command: show what rename would derive for each file.

use anyhow::{Context, Result};
use emlr_core::extract::{envelope, Envelope};
use emlr_core::rename::Proposal;
use emlr_core::{collect_message_files, propose, FsSource};
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use super::{apply_extract_overrides, load_config};
use crate::cli::InspectArgs;

/// Prints timestamp, subject, envelope fields and proposed name; touches nothing.
pub fn run_inspect(args: &InspectArgs) -> Result<ExitCode> {
    let mut cfg = load_config(args.extract.config.as_deref())?;
    apply_extract_overrides(&args.extract, &mut cfg);
    let settings = cfg.validate().context("refusing to start")?;

    let found = collect_message_files(&args.paths, args.recursive);
    for path in &found.missing {
        eprintln!("emlr: no such file or directory: {}", path.display());
    }
    if found.files.is_empty() {
        eprintln!("emlr: no .eml files found");
        return Ok(ExitCode::FAILURE);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failed = false;
    for path in &found.files {
        match propose(path, &settings, &FsSource) {
            Ok(proposal) => write_row(&mut out, path, &proposal, args.json)?,
            Err(e) => {
                failed = true;
                writeln!(out, "[FAIL] '{}': {}", path.display(), e)?;
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Human rows are tab-separated: path, timestamp, subject, from, to, ip, phpmailer, name.
fn write_row<W: Write>(out: &mut W, path: &Path, proposal: &Proposal, json: bool) -> Result<()> {
    let timestamp = proposal.extracted.timestamp.map(|ts| ts.to_rfc3339());
    let name = proposal.candidate.as_ref().map(|c| c.file_name());
    let Envelope {
        from,
        to,
        originating_ip,
        phpmailer,
    } = envelope(&proposal.headers);

    if json {
        let row = serde_json::json!({
            "path": path.to_string_lossy(),
            "timestamp": timestamp,
            "subject": proposal.extracted.subject,
            "from": from,
            "to": to,
            "x_originating_ip": originating_ip,
            "phpmailer": phpmailer,
            "name": name,
        });
        writeln!(out, "{row}")?;
    } else {
        let dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            path.display(),
            timestamp.as_deref().unwrap_or("-"),
            proposal.extracted.subject,
            dash(&from),
            dash(&to),
            dash(&originating_ip),
            if phpmailer { "phpmailer" } else { "-" },
            name.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}
