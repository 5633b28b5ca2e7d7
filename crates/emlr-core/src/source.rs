//! Input side: finding message files and reading them.
//!
//! The rename engine only depends on [`MessageSource`]; [`FsSource`] is the
//! on-disk implementation and [`collect_message_files`] the directory walk
//! that feeds it.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::checksum;
use crate::naming::has_message_extension;

/// Header blocks larger than this are cut; the date and subject are long past.
const MAX_HEADER_BYTES: usize = 1024 * 1024;

/// Supplies header blocks and content digests for message paths.
pub trait MessageSource {
    /// Raw header block: every byte before the first empty line.
    fn read_headers(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Lowercase hex SHA-256 of the full file content.
    fn content_digest(&self, path: &Path) -> io::Result<String>;
}

/// Reads messages straight from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl MessageSource for FsSource {
    fn read_headers(&self, path: &Path) -> io::Result<Vec<u8>> {
        read_header_block(BufReader::new(File::open(path)?))
    }

    fn content_digest(&self, path: &Path) -> io::Result<String> {
        checksum::sha256_path(path)
    }
}

/// Reads lines until an empty line (`\n` or `\r\n`), EOF, or the size cap.
pub fn read_header_block<R: BufRead>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut block = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line)?;
        if n == 0 || line == b"\n" || line == b"\r\n" {
            break;
        }
        block.extend_from_slice(&line);
        if block.len() >= MAX_HEADER_BYTES {
            tracing::debug!("header block exceeds {} bytes, truncating", MAX_HEADER_BYTES);
            break;
        }
    }
    Ok(block)
}

/// Message files found under the CLI inputs, in a deterministic order.
#[derive(Debug, Default)]
pub struct Discovery {
    pub files: Vec<PathBuf>,
    /// Inputs that do not exist.
    pub missing: Vec<PathBuf>,
    /// Inputs named explicitly that are not `.eml` files.
    pub ignored: Vec<PathBuf>,
}

/// Expands files and directories into `.eml` paths.
///
/// Directories contribute their direct children, or the whole tree when
/// `recursive` is set; entries are sorted by name. Duplicates are dropped.
pub fn collect_message_files(inputs: &[PathBuf], recursive: bool) -> Discovery {
    let mut out = Discovery::default();
    let mut seen = HashSet::new();

    for input in inputs {
        if input.is_file() {
            let is_message = input
                .file_name()
                .map(|n| has_message_extension(&n.to_string_lossy()))
                .unwrap_or(false);
            if !is_message {
                out.ignored.push(input.clone());
            } else if seen.insert(input.clone()) {
                out.files.push(input.clone());
            }
            continue;
        }
        if !input.is_dir() {
            out.missing.push(input.clone());
            continue;
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(input)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file()
                || !has_message_extension(&entry.file_name().to_string_lossy())
            {
                continue;
            }
            let path = entry.into_path();
            if seen.insert(path.clone()) {
                out.files.push(path);
            }
        }
    }

    tracing::debug!(
        files = out.files.len(),
        missing = out.missing.len(),
        ignored = out.ignored.len(),
        "collected message files"
    );
    out
}
