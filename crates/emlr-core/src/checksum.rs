//! Content digests used as collision tokens.
//!
//! Computed on demand and only when a name collision needs one, so the common
//! path never reads message bodies.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Length of the hex token appended under the `hash` policy.
pub const SHORT_DIGEST_LEN: usize = 8;

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded; suitable for large exports.
pub fn sha256_path(path: &Path) -> io::Result<String> {
    let f = File::open(path)?;
    sha256_reader(f)
}

/// Compute SHA-256 of everything readable from `reader`.
pub fn sha256_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// First [`SHORT_DIGEST_LEN`] hex characters of a full digest.
pub fn short_digest(full_hex: &str) -> &str {
    let end = full_hex.len().min(SHORT_DIGEST_LEN);
    &full_hex[..end]
}
