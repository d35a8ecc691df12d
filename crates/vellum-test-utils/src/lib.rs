//! Test fixtures and helpers for Vellum development.
//!
//! Provides sample documents, legacy-encoding helpers, a scratch directory
//! wrapper for file-system tests, and proptest strategies over JSON values.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod strategies;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vellum_codec::Codepage;

pub use fixtures::{player_document, PLAYER_JSON, PLAYER_NAME};

/// Encode a Rust string as Windows-1251 bytes, the way a script would.
pub fn legacy(text: &str) -> Vec<u8> {
    Codepage::WINDOWS_1251.decode(text.as_bytes())
}

/// A temporary directory that is removed on drop.
///
/// Paths handed out are absolute and live under the directory.
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create scratch directory");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `name` inside the scratch directory.
    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `contents` to `name`, creating parent directories.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directory");
        }
        fs::write(&path, contents).expect("failed to write scratch file");
        path
    }

    /// Delete `name` from the scratch directory.
    pub fn remove(&self, name: &str) {
        fs::remove_file(self.join(name)).expect("failed to remove scratch file");
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new()
    }
}
