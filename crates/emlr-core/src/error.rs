//! Per-file error taxonomy.
//!
//! Every variant except `InvalidConfig` is caught at the file boundary by the
//! rename orchestrator and turned into a `Skipped` or `Failed` outcome.

use std::io;
use std::path::PathBuf;

/// Errors raised while deciding or applying a rename for one message file.
#[derive(Debug, thiserror::Error)]
pub enum RenameError {
    /// Neither the selected trace header nor `Date` yielded a usable timestamp.
    #[error("no usable date header")]
    NoTimestamp,

    /// The numeric-suffix search ran out of candidates.
    #[error("too many files named like {base} ({attempts} suffixes tried)")]
    NameCollisionExhausted { base: String, attempts: u32 },

    /// Rename or existence check failed on disk.
    #[error("{op} {}: {source}", .path.display())]
    Filesystem {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The target appeared between the collision check and the rename.
    #[error("target appeared before rename: {}", .0.display())]
    TargetAppeared(PathBuf),

    /// The source file could not be opened or read.
    #[error("unreadable message file {}: {source}", .path.display())]
    InvalidSourceFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration rejected before any file was processed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_message_names_base_and_attempts() {
        let e = RenameError::NameCollisionExhausted {
            base: "2024-01-01 093000 Hi.eml".to_string(),
            attempts: 9999,
        };
        let msg = e.to_string();
        assert!(msg.contains("2024-01-01 093000 Hi.eml"));
        assert!(msg.contains("9999"));
    }

    #[test]
    fn filesystem_message_includes_op_and_path() {
        let e = RenameError::Filesystem {
            op: "rename",
            path: PathBuf::from("/tmp/a.eml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("rename /tmp/a.eml"));
        assert!(msg.contains("denied"));
    }
}
