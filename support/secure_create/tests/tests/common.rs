// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch tree with a directory the caller may write to and one an
/// attacker wants the caller to write to instead.
pub struct Tree {
    pub root: TempDir,
}

impl Tree {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("safe")).unwrap();
        std::fs::create_dir(root.path().join("evil")).unwrap();
        Self { root }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    pub fn safe(&self) -> PathBuf {
        self.path("safe")
    }

    pub fn evil(&self) -> PathBuf {
        self.path("evil")
    }
}

pub fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}
