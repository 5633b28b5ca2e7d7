//! Throwaway mail directories for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub struct Mailbox {
    pub dir: TempDir,
}

impl Mailbox {
    pub fn new() -> Self {
        Mailbox {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes a message with the given header lines and body.
    pub fn message(&self, name: &str, headers: &[&str], body: &str) -> PathBuf {
        let mut raw = String::new();
        for h in headers {
            raw.push_str(h);
            raw.push_str("\r\n");
        }
        raw.push_str("\r\n");
        raw.push_str(body);
        let path = self.dir.path().join(name);
        fs::write(&path, raw).unwrap();
        path
    }

    /// Sorted file names currently in the directory.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
