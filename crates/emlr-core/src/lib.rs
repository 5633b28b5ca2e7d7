pub mod config;
pub mod logging;

pub mod checksum;
pub mod disambiguate;
pub mod error;
pub mod extract;
pub mod headers;
pub mod naming;
pub mod rename;
pub mod search;
pub mod source;

pub use config::{DateMode, RenameConfig, Settings};
pub use disambiguate::DisambiguationPolicy;
pub use error::RenameError;
pub use rename::{process, propose, rename_one, RenameOutcome, RunSummary, SkipReason};
pub use search::HeaderPattern;
pub use source::{collect_message_files, FsSource, MessageSource};
