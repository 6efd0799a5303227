//! Testing utilities for the apiguard workspace
//!
//! Shared registry fixtures and throwaway source trees.

#![allow(missing_docs)]

use apiguard_registry::{ApiConfig, Registry};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Config with `registry` and the given deprecations
pub fn api_config(registry: Registry, deprecated: &[(&str, &str)]) -> ApiConfig {
    let table: IndexMap<String, String> = deprecated
        .iter()
        .map(|(old, new)| ((*old).to_string(), (*new).to_string()))
        .collect();
    ApiConfig::new("test", registry, table).unwrap()
}

/// Small consistent table: categories, tags, users and one deprecation
pub fn sample_config() -> ApiConfig {
    let registry = Registry::from_pairs([
        ("categories.list", "getCategoryList"),
        ("categories.create", "createCategory"),
        ("tags.list", "getTagList"),
        ("tags.delete", "deleteTag"),
        ("users.list", "getUserList"),
        ("users.detail", "getUser"),
        ("things.list", "getNewThing"),
    ])
    .unwrap();
    api_config(registry, &[("getOldThing", "getNewThing")])
}

/// Source tree in a temporary directory, removed on drop
pub struct ProjectTree {
    dir: TempDir,
}

impl ProjectTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Write `content` to `rel`, creating parent directories
    pub fn file(&self, rel: &str, content: &str) -> &Self {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        self
    }

    /// Write raw bytes to `rel`
    pub fn bytes(&self, rel: &str, content: &[u8]) -> &Self {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        self
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.dir.path().join(rel)).unwrap()
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }
}

impl Default for ProjectTree {
    fn default() -> Self {
        Self::new()
    }
}
