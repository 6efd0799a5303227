//! Consistency report model

use apiguard_registry::ConfigWarning;
use apiguard_scanner::{CallConvention, CallSite, UnanalyzableCall};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Category of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Call to a deprecated procedure
    Deprecated,
    /// Call to a procedure that is neither registered nor deprecated
    Invalid,
    /// Same procedure called with different argument counts
    ArityMismatch,
    /// File calls procedures without referencing the registry
    UnmappedUsage,
    /// Call target not statically known
    Unanalyzable,
}

impl FindingKind {
    /// Every kind, in report order
    pub const ALL: [Self; 5] = [
        Self::Deprecated,
        Self::Invalid,
        Self::ArityMismatch,
        Self::UnmappedUsage,
        Self::Unanalyzable,
    ];

    /// Severity of findings of this kind
    #[inline]
    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            Self::Invalid => Severity::Blocking,
            Self::Deprecated | Self::ArityMismatch | Self::UnmappedUsage | Self::Unanalyzable => {
                Severity::Advisory
            }
        }
    }
}

/// Whether a finding fails the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Reported, exit status unaffected
    Advisory,
    /// Fails the run
    Blocking,
}

/// All calls to one deprecated procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecatedUsage {
    /// Deprecated name
    pub method: String,
    /// Direct replacement from the table
    pub replacement: String,
    /// End of the replacement chain
    pub final_replacement: String,
    /// Call sites, ordered by file and line
    pub call_sites: Vec<CallSite>,
}

/// A call to an unknown procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidCall {
    /// The call site
    pub site: CallSite,
    /// Closest registered name, if any is close enough
    pub suggestion: Option<String>,
}

/// Call sites sharing one argument count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArityVariant {
    /// Argument count
    pub argument_count: usize,
    /// Call sites, ordered by file and line
    pub call_sites: Vec<CallSite>,
}

/// A procedure called with more than one argument count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArityMismatch {
    /// Procedure name
    pub method: String,
    /// One entry per distinct count, ascending
    pub variants: Vec<ArityVariant>,
}

impl ArityMismatch {
    /// Distinct argument counts, ascending
    #[must_use]
    pub fn counts(&self) -> Vec<usize> {
        self.variants.iter().map(|v| v.argument_count).collect()
    }
}

/// A file left out of the run
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkippedFile {
    /// File path
    pub path: PathBuf,
    /// Why it was skipped
    pub reason: String,
}

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Files read and scanned
    pub files_scanned: usize,
    /// Files mentioning the client identifier
    pub files_referencing: usize,
    /// Distinct call sites across all files
    pub call_sites: usize,
    /// Distinct procedure names called
    pub distinct_methods: usize,
    /// Deprecated procedures called
    pub deprecated: usize,
    /// Invalid call sites
    pub invalid: usize,
    /// Procedures with inconsistent argument counts
    pub arity_mismatches: usize,
    /// Files bypassing the registry
    pub unmapped_files: usize,
    /// Calls that could not be analysed
    pub unanalyzable: usize,
    /// Files skipped
    pub skipped: usize,
}

/// Result of one consistency run
///
/// Every list is sorted, so two runs over the same tree and configuration
/// produce equal reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    /// Root the run scanned
    pub root: PathBuf,
    /// Version of the registry configuration
    pub config_version: String,
    /// Calling convention used
    pub convention: CallConvention,
    /// Counters
    pub summary: ReportSummary,
    /// Deprecated calls, by method name
    pub deprecated: Vec<DeprecatedUsage>,
    /// Invalid calls, by file and line
    pub invalid: Vec<InvalidCall>,
    /// Argument-count mismatches, by method name
    pub arity_mismatches: Vec<ArityMismatch>,
    /// Files with calls but no registry reference
    pub unmapped_usage: Vec<PathBuf>,
    /// Calls that could not be analysed
    pub unanalyzable: Vec<UnanalyzableCall>,
    /// Files that could not be read or parsed
    pub skipped: Vec<SkippedFile>,
    /// Advisory findings about the registry configuration itself
    pub config_warnings: Vec<ConfigWarning>,
    /// Procedure names registered under several paths
    pub duplicate_methods: Vec<String>,
}

impl ConsistencyReport {
    /// Whether any blocking finding is present
    #[must_use]
    pub fn has_blocking_issues(&self) -> bool {
        FindingKind::ALL
            .iter()
            .any(|kind| kind.severity() == Severity::Blocking && self.count(*kind) > 0)
    }

    /// Number of findings of `kind`
    #[must_use]
    pub fn count(&self, kind: FindingKind) -> usize {
        match kind {
            FindingKind::Deprecated => self.deprecated.len(),
            FindingKind::Invalid => self.invalid.len(),
            FindingKind::ArityMismatch => self.arity_mismatches.len(),
            FindingKind::UnmappedUsage => self.unmapped_usage.len(),
            FindingKind::Unanalyzable => self.unanalyzable.len(),
        }
    }

    /// Whether the run found nothing at all
    #[must_use]
    pub fn is_clean(&self) -> bool {
        FindingKind::ALL.iter().all(|kind| self.count(*kind) == 0)
    }
}
