//! Rewriting deprecated calls to their replacements

use crate::checker::ConsistencyChecker;
use crate::error::{CheckError, FixError};
use crate::report::SkippedFile;
use crate::walk::{collect_files, relative_to};
use apiguard_scanner::read_source;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One method-name replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    /// 1-based line of the call
    pub line: usize,
    /// Deprecated name
    pub from: String,
    /// Replacement written in its place
    pub to: String,
}

/// Planned edits for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFix {
    /// File path relative to the root
    pub path: PathBuf,
    /// Edits in source order
    pub edits: Vec<Edit>,
    #[serde(skip)]
    rewritten: String,
}

impl FileFix {
    /// File contents after the edits
    #[must_use]
    pub fn rewritten(&self) -> &str {
        &self.rewritten
    }
}

/// Edits for a whole tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixPlan {
    /// Files with at least one edit, sorted by path
    pub files: Vec<FileFix>,
    /// Files that could not be read or parsed
    pub skipped: Vec<SkippedFile>,
}

impl FixPlan {
    /// Total number of edits
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.files.iter().map(|f| f.edits.len()).sum()
    }

    /// Whether nothing needs rewriting
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every planned file under `root`
    ///
    /// # Errors
    /// Returns [`FixError::Io`] on the first failed write; files written
    /// before it stay rewritten
    pub fn apply(&self, root: &Path) -> Result<usize, FixError> {
        for file in &self.files {
            let path = root.join(&file.path);
            std::fs::write(&path, &file.rewritten).map_err(|source| FixError::Io {
                path: path.clone(),
                source,
            })?;
            tracing::info!("Rewrote {} call(s) in {}", file.edits.len(), file.path.display());
        }
        Ok(self.files.len())
    }
}

/// Plan rewrites of deprecated calls under the checker's root
///
/// Only the method identifier of each call is replaced, with the end of its
/// replacement chain. Calls are left alone, and listed in
/// [`FixPlan::skipped`], when the chain loops back into the deprecation
/// table or ends at a name the registry does not know.
///
/// # Errors
/// Returns [`FixError::UnsupportedConvention`] for the wrapper convention
/// and [`FixError::Check`] if the root is missing
pub fn plan_fixes(checker: &ConsistencyChecker) -> Result<FixPlan, FixError> {
    let convention = checker.config().convention();
    if !convention.is_member() {
        return Err(FixError::UnsupportedConvention(convention.to_string()));
    }
    let root = checker.config().root();
    if !root.is_dir() {
        return Err(CheckError::RootNotFound(root.to_path_buf()).into());
    }

    let walk = collect_files(checker.config());
    let results: Vec<FilePlan> = walk
        .files
        .par_iter()
        .map(|path| plan_file(checker, path))
        .collect();

    let mut plan = FixPlan {
        skipped: walk.errors,
        ..FixPlan::default()
    };
    for result in results {
        plan.files.extend(result.fix);
        plan.skipped.extend(result.skipped);
    }
    plan.files.sort_by(|a, b| a.path.cmp(&b.path));
    plan.skipped.sort();
    Ok(plan)
}

#[derive(Default)]
struct FilePlan {
    fix: Option<FileFix>,
    skipped: Vec<SkippedFile>,
}

fn plan_file(checker: &ConsistencyChecker, path: &Path) -> FilePlan {
    let rel = relative_to(checker.config().root(), path);
    let scanned = read_source(path).and_then(|source| {
        let occurrences = checker.scanner().occurrences(&rel, &source)?;
        Ok((source, occurrences))
    });
    let (source, occurrences) = match scanned {
        Ok(scanned) => scanned,
        Err(e) => {
            tracing::warn!("Skipping {}: {}", rel.display(), e);
            return FilePlan {
                fix: None,
                skipped: vec![SkippedFile {
                    path: rel,
                    reason: e.to_string(),
                }],
            };
        }
    };

    let api = checker.api_config();
    let deprecations = api.deprecations();
    let mut plan = FilePlan::default();
    let mut edits = Vec::new();
    let mut spans = Vec::new();
    for occurrence in occurrences {
        let method = &occurrence.site.method;
        let line = occurrence.site.line.unwrap_or_default();
        let Some(target) = deprecations.final_replacement(method) else {
            continue;
        };
        let refusal = if deprecations.is_deprecated(target) {
            Some("replacement chain loops")
        } else if !api.registry().is_known_method(target) {
            Some("replacement is not a registered method")
        } else {
            None
        };
        if let Some(refusal) = refusal {
            tracing::warn!(
                "Not rewriting {} -> {} at {}:{}: {}",
                method,
                target,
                rel.display(),
                line,
                refusal
            );
            plan.skipped.push(SkippedFile {
                path: rel.clone(),
                reason: format!("line {line}: not rewriting {method} -> {target}: {refusal}"),
            });
            continue;
        }
        edits.push(Edit {
            line,
            from: method.clone(),
            to: target.to_string(),
        });
        spans.push((occurrence.method_span, target));
    }
    if edits.is_empty() {
        return plan;
    }

    let mut rewritten = source;
    spans.sort_by_key(|(span, _)| std::cmp::Reverse(span.start));
    for (span, target) in spans {
        rewritten.replace_range(span, target);
    }

    plan.fix = Some(FileFix {
        path: rel,
        edits,
        rewritten,
    });
    plan
}
