//! Options for one consistency checker

use crate::error::CheckError;
use apiguard_scanner::{CallConvention, SourceLanguage};
use std::path::{Path, PathBuf};

/// Extensions scanned by default, in match order
pub const DEFAULT_EXTENSIONS: &[&str] = &["vue", "js", "ts", "jsx", "tsx"];

/// Directory names never descended into by default
pub const DEFAULT_IGNORE_DIRS: &[&str] = &["node_modules", "dist", "build", ".git", "coverage"];

/// Where and how to look for call sites
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerConfig {
    root: PathBuf,
    convention: CallConvention,
    extensions: Vec<String>,
    ignore_dirs: Vec<String>,
    respect_gitignore: bool,
}

impl CheckerConfig {
    /// Defaults rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            convention: CallConvention::default(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|d| (*d).to_string()).collect(),
            respect_gitignore: false,
        }
    }

    /// Use `convention` for call extraction
    #[must_use]
    pub fn with_convention(mut self, convention: CallConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Replace the extension list; leading dots are stripped and
    /// duplicates dropped, first occurrence wins
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions.clear();
        for ext in extensions {
            let ext = ext.as_ref().trim_start_matches('.').to_ascii_lowercase();
            if !self.extensions.contains(&ext) {
                self.extensions.push(ext);
            }
        }
        self
    }

    /// Replace the ignored directory names
    #[must_use]
    pub fn with_ignore_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Ignore one more directory name
    #[must_use]
    pub fn add_ignore_dir(mut self, dir: impl Into<String>) -> Self {
        let dir = dir.into();
        if !self.ignore_dirs.contains(&dir) {
            self.ignore_dirs.push(dir);
        }
        self
    }

    /// Also honour `.gitignore` and `.ignore` files
    #[must_use]
    pub fn respect_gitignore(mut self, yes: bool) -> Self {
        self.respect_gitignore = yes;
        self
    }

    /// Check the extension list
    ///
    /// # Errors
    /// Returns [`CheckError::NoExtensions`] for an empty list and
    /// [`CheckError::UnsupportedExtension`] for an extension the scanner
    /// cannot parse
    pub fn validate(&self) -> Result<(), CheckError> {
        if self.extensions.is_empty() {
            return Err(CheckError::NoExtensions);
        }
        if let Some(bad) = self
            .extensions
            .iter()
            .find(|ext| SourceLanguage::from_extension(ext).is_none())
        {
            return Err(CheckError::UnsupportedExtension(bad.clone()));
        }
        Ok(())
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Calling convention
    #[inline]
    #[must_use]
    pub fn convention(&self) -> &CallConvention {
        &self.convention
    }

    /// Scanned extensions, without dots
    #[inline]
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Ignored directory names
    #[inline]
    #[must_use]
    pub fn ignore_dirs(&self) -> &[String] {
        &self.ignore_dirs
    }

    /// Whether ignore files are honoured
    #[inline]
    #[must_use]
    pub fn respects_gitignore(&self) -> bool {
        self.respect_gitignore
    }
}
