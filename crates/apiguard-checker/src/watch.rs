//! Re-running checks when sources change

use crate::checker::ConsistencyChecker;
use crate::config::CheckerConfig;
use crate::error::CheckError;
use crate::report::ConsistencyReport;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::ops::ControlFlow;
use std::path::{Component, Path};
use std::sync::mpsc;
use std::time::Duration;

/// Default quiet period before a batch of changes triggers a run
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Run the checker now and after every batch of relevant changes
///
/// Each run is a full, independent check. `on_report` receives every
/// result; returning `ControlFlow::Break` stops watching.
///
/// # Errors
/// Returns [`CheckError::RootNotFound`] if the root cannot be resolved and
/// [`CheckError::Watch`] if the watcher cannot be started
pub fn watch<F>(
    checker: &ConsistencyChecker,
    debounce: Duration,
    mut on_report: F,
) -> Result<(), CheckError>
where
    F: FnMut(Result<ConsistencyReport, CheckError>) -> ControlFlow<()>,
{
    if on_report(checker.run()).is_break() {
        return Ok(());
    }

    let config = checker.config();
    // Events carry absolute paths even when the root is relative
    let root = config.root().canonicalize().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CheckError::RootNotFound(config.root().to_path_buf()),
        _ => CheckError::io_error(config.root(), e),
    })?;

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        tx.send(res).ok();
    })?;
    watcher.watch(&root, RecursiveMode::Recursive)?;
    tracing::info!("Watching {} for changes", root.display());

    while let Ok(first) = rx.recv() {
        let mut relevant = is_relevant_event(config, &root, first);
        // Drain the rest of the burst
        while let Ok(next) = rx.recv_timeout(debounce) {
            relevant |= is_relevant_event(config, &root, next);
        }
        if !relevant {
            continue;
        }
        tracing::debug!("Change detected; re-running check");
        if on_report(checker.run()).is_break() {
            break;
        }
    }
    Ok(())
}

fn is_relevant_event(config: &CheckerConfig, root: &Path, event: notify::Result<Event>) -> bool {
    match event {
        Ok(event) => {
            !matches!(event.kind, EventKind::Access(_))
                && event.paths.iter().any(|path| is_relevant_path(config, root, path))
        }
        Err(e) => {
            tracing::warn!("Watch error: {}", e);
            false
        }
    }
}

/// Whether a change to `path` can affect the report
///
/// `root` is the resolved watch root. Ignore-directory names are only
/// matched below it, so a checkout living under `~/build` still counts.
#[must_use]
pub fn is_relevant_path(config: &CheckerConfig, root: &Path, path: &Path) -> bool {
    let below_root = path
        .strip_prefix(root)
        .or_else(|_| path.strip_prefix(config.root()));
    if let Ok(rel) = below_root {
        let ignored = rel.components().any(|c| match c {
            Component::Normal(name) => name
                .to_str()
                .is_some_and(|name| config.ignore_dirs().iter().any(|d| d == name)),
            _ => false,
        });
        if ignored {
            return false;
        }
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| config.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
}
