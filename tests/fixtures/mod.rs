//! Shared fixtures for integration tests.
//!
//! - `project.bnd`: a project file with comments, continuations and a local
//!   `-plugin` member
//! - `workspace.bnd`: the parent it inherits from
//! - `malformed.bnd`: a file the scanner rejects on line 2

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/bnd")
        .join(name)
}

pub fn fixture_text(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture is readable")
}

/// A writable copy of a fixture in a fresh directory.
pub struct Scratch {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl Scratch {
    pub fn copy(name: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join(name);
        fs::copy(fixture_path(name), &path).expect("fixture copy");
        Self { dir, path }
    }

    pub fn text(&self) -> String {
        fs::read_to_string(&self.path).expect("scratch file is readable")
    }
}
