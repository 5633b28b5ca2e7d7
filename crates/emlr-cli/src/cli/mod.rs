//! CLI for the emlr message renamer.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use emlr_core::config::DateMode;
use emlr_core::DisambiguationPolicy;
use std::path::PathBuf;
use std::process::ExitCode;

use commands::{run_completions, run_grep, run_inspect, run_rename};

/// Top-level CLI for emlr.
#[derive(Debug, Parser)]
#[command(name = "emlr")]
#[command(about = "emlr: rename .eml files to \"<date> <subject>.eml\"", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Rename message files after their date and subject.
    Rename(RenameArgs),

    /// Show date, subject, sender, recipients and proposed name without renaming.
    Inspect(InspectArgs),

    /// List message files whose header block matches a regex (case-insensitive).
    Grep(GrepArgs),

    /// Print a shell completion script.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Timestamp source, as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Sent,
    Received,
}

impl From<ModeArg> for DateMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Sent => DateMode::Sent,
            ModeArg::Received => DateMode::Received,
        }
    }
}

/// Settings that shape the derived name, shared by `rename` and `inspect`.
#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Take the timestamp from `Date` (sent) or the oldest `Received` line.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Prefer the oldest `Received` header even in sent mode.
    #[arg(long)]
    pub prefer_received: bool,

    /// Maximum subject length in characters.
    #[arg(long, value_name = "N")]
    pub max_len: Option<usize>,

    /// IANA time zone for the timestamp prefix (e.g. UTC, Asia/Seoul).
    #[arg(long, value_name = "TZ")]
    pub zone: Option<String>,

    /// Read settings from this file instead of the default config.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Flags for `rename`. Anything left unset comes from the config file.
#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Message files or directories.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Descend into subdirectories.
    #[arg(short, long)]
    pub recursive: bool,

    #[command(flatten)]
    pub extract: ExtractArgs,

    /// Collision policy: hash, numeric-suffix, skip or overwrite.
    #[arg(long = "uniq", value_name = "POLICY")]
    pub uniq: Option<DisambiguationPolicy>,

    /// Report what would be renamed without touching any file.
    ///
    /// Each file is checked against the directory as it is now, so two files
    /// of the same run that want the same name are not reported as colliding.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Replace existing files (same as `--uniq overwrite`).
    #[arg(short, long, conflicts_with = "uniq")]
    pub force: bool,

    /// Also report skipped and unchanged files.
    #[arg(short, long)]
    pub verbose: bool,

    /// One JSON object per line instead of human-readable lines.
    #[arg(long)]
    pub json: bool,
}

/// Flags for `inspect`.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Message files or directories.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Descend into subdirectories.
    #[arg(short, long)]
    pub recursive: bool,

    #[command(flatten)]
    pub extract: ExtractArgs,

    /// One JSON object per line.
    #[arg(long)]
    pub json: bool,
}

/// Flags for `grep`.
#[derive(Debug, Args)]
pub struct GrepArgs {
    /// Regular expression matched against each raw header block.
    pub pattern: String,

    /// Message files or directories.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Descend into subdirectories.
    #[arg(short, long)]
    pub recursive: bool,

    /// Read the legacy charset from this file instead of the default config.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl CliCommand {
    pub fn run_from_args() -> Result<ExitCode> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Rename(args) => run_rename(&args),
            CliCommand::Inspect(args) => run_inspect(&args),
            CliCommand::Grep(args) => run_grep(&args),
            CliCommand::Completions { shell } => run_completions(shell),
        }
    }
}

#[cfg(test)]
mod tests;
