use apiguard_checker::{watch, CheckerConfig, ConsistencyChecker};
use apiguard_test_utils::{sample_config, ProjectTree};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Rewrites `path` until `done` is set, so a change lands after the
/// watcher is registered
fn keep_editing(
    path: PathBuf,
    contents: &'static str,
    done: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !done.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(150));
            std::fs::write(&path, contents).unwrap();
        }
    })
}

#[test]
fn change_triggers_a_fresh_run() {
    let tree = ProjectTree::new();
    tree.file("src/a.js", "api.getTagList()\n");
    let checker =
        ConsistencyChecker::new(sample_config(), CheckerConfig::new(tree.root())).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let mut editor = None;
    let mut reports = Vec::new();
    watch(&checker, Duration::from_millis(50), |result| {
        let report = result.unwrap();
        reports.push(report.summary.invalid);
        if reports.len() == 1 {
            editor = Some(keep_editing(
                tree.path("src/a.js"),
                "api.getTagList()\napi.madeUpLater()\n",
                Arc::clone(&done),
            ));
            return ControlFlow::Continue(());
        }
        if report.summary.invalid == 0 {
            // Burst from before the edit
            return ControlFlow::Continue(());
        }
        ControlFlow::Break(())
    })
    .unwrap();

    done.store(true, Ordering::SeqCst);
    if let Some(editor) = editor {
        editor.join().unwrap();
    }
    assert_eq!(reports.first(), Some(&0));
    assert_eq!(reports.last(), Some(&1));
}
