//! Mergeable per-run scan results

use crate::report::SkippedFile;
use apiguard_scanner::{CallSite, FileScan, UnanalyzableCall};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Union of per-file scan results
///
/// `merge` is commutative and associative, so partial results from worker
/// threads can be folded in any order and still produce the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanAccumulator {
    files_scanned: usize,
    files_referencing: usize,
    call_sites: BTreeSet<CallSite>,
    unmapped: BTreeSet<PathBuf>,
    unanalyzable: BTreeSet<UnanalyzableCall>,
    skipped: BTreeSet<SkippedFile>,
}

impl ScanAccumulator {
    /// Empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator holding one file's scan
    #[must_use]
    pub fn from_scan(scan: FileScan) -> Self {
        let mut acc = Self::new();
        acc.add_scan(scan);
        acc
    }

    /// Accumulator holding one skipped file
    #[must_use]
    pub fn from_skipped(skipped: SkippedFile) -> Self {
        let mut acc = Self::new();
        acc.skipped.insert(skipped);
        acc
    }

    /// Add one file's scan
    pub fn add_scan(&mut self, scan: FileScan) {
        self.files_scanned += 1;
        if scan.references_object {
            self.files_referencing += 1;
        }
        if scan.is_unmapped_usage() {
            self.unmapped.insert(scan.path);
        }
        self.call_sites.extend(scan.call_sites);
        self.unanalyzable.extend(scan.unanalyzable);
    }

    /// Record a skipped file
    pub fn add_skipped(&mut self, skipped: SkippedFile) {
        self.skipped.insert(skipped);
    }

    /// Union of two accumulators
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.files_scanned += other.files_scanned;
        self.files_referencing += other.files_referencing;
        self.call_sites.extend(other.call_sites);
        self.unmapped.extend(other.unmapped);
        self.unanalyzable.extend(other.unanalyzable);
        self.skipped.extend(other.skipped);
        self
    }

    /// Files scanned
    #[inline]
    #[must_use]
    pub fn files_scanned(&self) -> usize {
        self.files_scanned
    }

    /// Files mentioning the client identifier
    #[inline]
    #[must_use]
    pub fn files_referencing(&self) -> usize {
        self.files_referencing
    }

    /// All call sites, ordered by method, count, file and line
    #[inline]
    #[must_use]
    pub fn call_sites(&self) -> &BTreeSet<CallSite> {
        &self.call_sites
    }

    /// Files with calls but no registry reference
    #[inline]
    #[must_use]
    pub fn unmapped(&self) -> &BTreeSet<PathBuf> {
        &self.unmapped
    }

    /// Unanalyzable calls
    #[inline]
    #[must_use]
    pub fn unanalyzable(&self) -> &BTreeSet<UnanalyzableCall> {
        &self.unanalyzable
    }

    /// Skipped files
    #[inline]
    #[must_use]
    pub fn skipped(&self) -> &BTreeSet<SkippedFile> {
        &self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scan(path: &str, methods: &[(&str, usize)], registry: bool) -> FileScan {
        FileScan {
            path: PathBuf::from(path),
            call_sites: methods
                .iter()
                .enumerate()
                .map(|(i, (m, n))| CallSite {
                    method: (*m).to_string(),
                    argument_count: *n,
                    file_path: PathBuf::from(path),
                    line: Some(i + 1),
                })
                .collect(),
            unanalyzable: vec![],
            references_object: !methods.is_empty(),
            references_registry: registry,
            has_syntax_errors: false,
        }
    }

    #[test]
    fn add_scan_tracks_unmapped() {
        let mut acc = ScanAccumulator::new();
        acc.add_scan(scan("a.js", &[("getTagList", 0)], false));
        acc.add_scan(scan("b.js", &[("getTagList", 1)], true));
        acc.add_scan(scan("c.js", &[], false));
        assert_eq!(acc.files_scanned(), 3);
        assert_eq!(acc.files_referencing(), 2);
        assert_eq!(acc.call_sites().len(), 2);
        assert_eq!(acc.unmapped().iter().collect::<Vec<_>>(), vec![&PathBuf::from("a.js")]);
    }

    fn arb_acc() -> impl Strategy<Value = ScanAccumulator> {
        let method = prop_oneof![Just("getTagList"), Just("getUser"), Just("nope")];
        let file = prop_oneof![Just("a.js"), Just("b.vue"), Just("c.ts")];
        let calls = proptest::collection::vec((method, 0usize..3), 0..4);
        proptest::collection::vec((file, calls, any::<bool>(), any::<bool>()), 0..4).prop_map(
            |files| {
                let mut acc = ScanAccumulator::new();
                for (path, methods, registry, skip) in files {
                    if skip {
                        acc.add_skipped(SkippedFile {
                            path: PathBuf::from(path),
                            reason: "unreadable".into(),
                        });
                    } else {
                        acc.add_scan(scan(path, &methods, registry));
                    }
                }
                acc
            },
        )
    }

    proptest! {
        #[test]
        fn prop_merge_commutative(a in arb_acc(), b in arb_acc()) {
            prop_assert_eq!(a.clone().merge(b.clone()), b.merge(a));
        }

        #[test]
        fn prop_merge_associative(a in arb_acc(), b in arb_acc(), c in arb_acc()) {
            let left = a.clone().merge(b.clone()).merge(c.clone());
            let right = a.merge(b.merge(c));
            prop_assert_eq!(left, right);
        }

        #[test]
        fn prop_empty_is_identity(a in arb_acc()) {
            prop_assert_eq!(a.clone().merge(ScanAccumulator::new()), a);
        }
    }
}
