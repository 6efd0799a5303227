//! Source file discovery

use crate::config::CheckerConfig;
use crate::report::SkippedFile;
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Files found under the root
#[derive(Debug, Default)]
pub struct WalkResult {
    /// Matching files, sorted
    pub files: Vec<PathBuf>,
    /// Entries the walker could not read
    pub errors: Vec<SkippedFile>,
}

/// Collect source files under the configured root
///
/// Ignored directory names are pruned before descent. Walker errors are
/// recorded and the walk continues.
#[must_use]
pub fn collect_files(config: &CheckerConfig) -> WalkResult {
    let root = config.root();
    tracing::debug!(
        "Collecting files under {} (extensions: {:?}, ignored: {:?})",
        root.display(),
        config.extensions(),
        config.ignore_dirs()
    );

    let ignore_dirs: HashSet<String> = config.ignore_dirs().iter().cloned().collect();
    let extensions: HashSet<&str> = config.extensions().iter().map(String::as_str).collect();
    let gitignore = config.respects_gitignore();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .parents(gitignore)
        .ignore(gitignore)
        .git_ignore(gitignore)
        .git_global(gitignore)
        .git_exclude(gitignore)
        .require_git(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir
                && entry.depth() > 0
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| ignore_dirs.contains(name)))
        })
        .build();

    let mut result = WalkResult::default();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Walker error: {}", e);
                result.errors.push(SkippedFile {
                    path: error_path(&e).unwrap_or_else(|| root.to_path_buf()),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if has_extension(entry.path(), &extensions) {
            result.files.push(entry.into_path());
        }
    }
    result.files.sort();

    tracing::debug!("Collected {} files", result.files.len());
    result
}

fn has_extension(path: &Path, extensions: &HashSet<&str>) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.contains(ext.to_ascii_lowercase().as_str()))
}

fn error_path(error: &ignore::Error) -> Option<PathBuf> {
    match error {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}

/// `path` relative to `root` when it lies beneath it
#[must_use]
pub fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| relative_to(root, f).to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn filters_extensions_and_ignored_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for rel in [
            "src/a.js",
            "src/views/B.vue",
            "src/c.ts",
            "src/readme.md",
            "node_modules/pkg/index.js",
            "dist/bundle.js",
            "src/build/gen.js",
            ".git/hooks/x.js",
            "coverage/lcov.js",
            ".storybook/main.js",
        ] {
            touch(root, rel);
        }

        let result = collect_files(&CheckerConfig::new(root));
        assert_eq!(
            relative(root, &result.files),
            vec![".storybook/main.js", "src/a.js", "src/c.ts", "src/views/B.vue"]
        );
        assert!(result.errors.is_empty());
    }

    #[test]
    fn custom_extensions_and_ignores() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for rel in ["src/a.js", "src/b.ts", "legacy/c.js"] {
            touch(root, rel);
        }
        let config = CheckerConfig::new(root)
            .with_extensions(["js"])
            .add_ignore_dir("legacy");
        assert_eq!(relative(root, &collect_files(&config).files), vec!["src/a.js"]);
    }

    #[test]
    fn gitignore_is_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/a.js");
        touch(root, "gen/b.js");
        fs::write(root.join(".gitignore"), "gen/\n").unwrap();

        let all = collect_files(&CheckerConfig::new(root));
        assert_eq!(all.files.len(), 2);

        let filtered = collect_files(&CheckerConfig::new(root).respect_gitignore(true));
        assert_eq!(relative(root, &filtered.files), vec!["src/a.js"]);
    }
}
