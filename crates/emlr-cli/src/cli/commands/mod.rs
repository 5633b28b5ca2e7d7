//! CLI command handlers, one file per subcommand.

mod completions;
mod grep;
mod inspect;
mod rename;

pub use completions::run_completions;
pub use grep::run_grep;
pub use inspect::run_inspect;
pub use rename::run_rename;

#[cfg(test)]
pub use rename::apply_overrides;

use anyhow::Result;
use emlr_core::config::{self, RenameConfig};
use std::path::Path;

use crate::cli::ExtractArgs;

/// Config from `--config`, or the default file (created when missing).
fn load_config(explicit: Option<&Path>) -> Result<RenameConfig> {
    let cfg = match explicit {
        Some(path) => config::load_from_path(path)?,
        None => config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

/// Folds the naming flags shared by `rename` and `inspect` over the file configuration.
pub fn apply_extract_overrides(args: &ExtractArgs, cfg: &mut RenameConfig) {
    if let Some(mode) = args.mode {
        cfg.mode = mode.into();
    }
    if args.prefer_received {
        cfg.prefer_received = true;
    }
    if let Some(n) = args.max_len {
        cfg.max_subject_length = n;
    }
    if let Some(zone) = &args.zone {
        cfg.display_zone = zone.clone();
    }
}
