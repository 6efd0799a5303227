//! Consistency checker orchestration

use crate::accumulator::ScanAccumulator;
use crate::config::CheckerConfig;
use crate::error::CheckError;
use crate::phase::{PhaseTracker, RunPhase};
use crate::report::{
    ArityMismatch, ArityVariant, ConsistencyReport, DeprecatedUsage, InvalidCall, ReportSummary,
    SkippedFile,
};
use crate::walk::{collect_files, relative_to};
use apiguard_registry::ApiConfig;
use apiguard_scanner::{read_source, CallConvention, CallSite, SourceScanner};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Runs consistency checks of a source tree against a registry
///
/// Holds only immutable configuration. Each call to [`run`] owns its own
/// state, so concurrent runs are independent.
///
/// [`run`]: ConsistencyChecker::run
#[derive(Debug, Clone)]
pub struct ConsistencyChecker {
    api: Arc<ApiConfig>,
    config: CheckerConfig,
    scanner: SourceScanner,
}

impl ConsistencyChecker {
    /// Create checker
    ///
    /// # Errors
    /// Returns error if the options are invalid or the convention's
    /// identifier is unusable
    pub fn new(api: impl Into<Arc<ApiConfig>>, config: CheckerConfig) -> Result<Self, CheckError> {
        config.validate()?;
        let api = api.into();
        let scanner = SourceScanner::for_config(config.convention().clone(), &api)?;
        Ok(Self {
            api,
            config,
            scanner,
        })
    }

    /// Registry configuration
    #[inline]
    #[must_use]
    pub fn api_config(&self) -> &ApiConfig {
        &self.api
    }

    /// Checker options
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Scanner used for every file
    #[inline]
    #[must_use]
    pub fn scanner(&self) -> &SourceScanner {
        &self.scanner
    }

    /// Scan the tree and build a report
    ///
    /// # Errors
    /// Returns error if the root is missing or not a directory. Per-file
    /// failures are reported as skipped files instead.
    pub fn run(&self) -> Result<ConsistencyReport, CheckError> {
        let root = self.config.root();
        if !root.exists() {
            return Err(CheckError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(CheckError::NotADirectory(root.to_path_buf()));
        }

        let started = Instant::now();
        let mut phase = PhaseTracker::new();

        phase.advance(RunPhase::Scanning)?;
        let walk = collect_files(&self.config);
        let mut acc = self.scan_files(&walk.files);
        for skipped in walk.errors {
            acc.add_skipped(skipped);
        }

        phase.advance(RunPhase::Aggregating)?;
        let report = classify(root, &self.api, self.config.convention().clone(), &acc);

        phase.advance(RunPhase::Reported)?;
        tracing::info!(
            "Checked {} files in {:?}: {} deprecated, {} invalid, {} arity mismatches",
            report.summary.files_scanned,
            started.elapsed(),
            report.summary.deprecated,
            report.summary.invalid,
            report.summary.arity_mismatches
        );
        Ok(report)
    }

    /// Scan `files` in parallel and fold the results
    ///
    /// Paths in the result are relative to the root.
    #[must_use]
    pub fn scan_files(&self, files: &[PathBuf]) -> ScanAccumulator {
        files
            .par_iter()
            .map(|path| self.scan_one(path))
            .reduce(ScanAccumulator::new, ScanAccumulator::merge)
    }

    fn scan_one(&self, path: &Path) -> ScanAccumulator {
        let rel = relative_to(self.config.root(), path);
        let scanned = read_source(path).and_then(|source| self.scanner.scan(&rel, &source));
        match scanned {
            Ok(scan) => ScanAccumulator::from_scan(scan),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", rel.display(), e);
                ScanAccumulator::from_skipped(SkippedFile {
                    path: rel,
                    reason: e.to_string(),
                })
            }
        }
    }
}

/// Classify merged scan results against the registry
///
/// Member calls name registry methods and are checked against the registry
/// and deprecation tables. Wrapper calls name endpoints instead, so only
/// argument counts and unanalyzable calls are reported for them.
#[must_use]
pub fn classify(
    root: &Path,
    api: &ApiConfig,
    convention: CallConvention,
    acc: &ScanAccumulator,
) -> ConsistencyReport {
    let registry = api.registry();
    let deprecations = api.deprecations();
    let names_methods = convention.is_member();

    let mut by_method: BTreeMap<&str, Vec<&CallSite>> = BTreeMap::new();
    for site in acc.call_sites() {
        by_method.entry(site.method.as_str()).or_default().push(site);
    }

    let mut deprecated = Vec::new();
    let mut invalid = Vec::new();
    let mut arity_mismatches = Vec::new();

    for (method, sites) in &by_method {
        if names_methods {
            if let Some(replacement) = deprecations.check_deprecated(method) {
                deprecated.push(DeprecatedUsage {
                    method: (*method).to_string(),
                    replacement: replacement.to_string(),
                    final_replacement: deprecations
                        .final_replacement(method)
                        .unwrap_or(replacement)
                        .to_string(),
                    call_sites: sorted_by_location(sites),
                });
            } else if !registry.is_known_method(method) {
                let suggestion = registry.closest_method(method).map(str::to_string);
                invalid.extend(sites.iter().map(|site| InvalidCall {
                    site: (*site).clone(),
                    suggestion: suggestion.clone(),
                }));
            }
        }

        let mut variants: BTreeMap<usize, Vec<&CallSite>> = BTreeMap::new();
        for site in sites {
            variants.entry(site.argument_count).or_default().push(*site);
        }
        if variants.len() > 1 {
            arity_mismatches.push(ArityMismatch {
                method: (*method).to_string(),
                variants: variants
                    .into_iter()
                    .map(|(argument_count, sites)| ArityVariant {
                        argument_count,
                        call_sites: sorted_by_location(&sites),
                    })
                    .collect(),
            });
        }
    }
    invalid.sort_by(|a, b| a.site.sort_key().cmp(&b.site.sort_key()));

    let unmapped_usage: Vec<PathBuf> = if names_methods {
        acc.unmapped().iter().cloned().collect()
    } else {
        Vec::new()
    };
    let unanalyzable: Vec<_> = acc.unanalyzable().iter().cloned().collect();
    let skipped: Vec<SkippedFile> = acc.skipped().iter().cloned().collect();

    let mut config_warnings = api.warnings().to_vec();
    config_warnings.sort();
    config_warnings.dedup();

    let summary = ReportSummary {
        files_scanned: acc.files_scanned(),
        files_referencing: acc.files_referencing(),
        call_sites: acc.call_sites().len(),
        distinct_methods: by_method.len(),
        deprecated: deprecated.len(),
        invalid: invalid.len(),
        arity_mismatches: arity_mismatches.len(),
        unmapped_files: unmapped_usage.len(),
        unanalyzable: unanalyzable.len(),
        skipped: skipped.len(),
    };

    ConsistencyReport {
        root: root.to_path_buf(),
        config_version: api.version().to_string(),
        convention,
        summary,
        deprecated,
        invalid,
        arity_mismatches,
        unmapped_usage,
        unanalyzable,
        skipped,
        config_warnings,
        duplicate_methods: registry.find_duplicates().into_iter().collect(),
    }
}

fn sorted_by_location(sites: &[&CallSite]) -> Vec<CallSite> {
    let mut sites: Vec<CallSite> = sites.iter().map(|s| (*s).clone()).collect();
    sites.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    sites
}
