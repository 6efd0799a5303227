//! apiguard Checker
//!
//! Walks a source tree, extracts remote-procedure call sites and checks
//! them against the registry and deprecation table.
//!
//! # Overview
//!
//! - **ConsistencyChecker**: one immutable configuration, any number of runs
//! - **ScanAccumulator**: order-independent merge of per-file results
//! - **ConsistencyReport**: deprecated, invalid, arity and registry-bypass
//!   findings, serializable to JSON
//! - **plan_fixes**: rewrites deprecated calls to their replacements
//! - **watch**: re-runs on file changes
//!
//! # Example
//!
//! ```rust,no_run
//! use apiguard_checker::{CheckerConfig, ConsistencyChecker};
//! use apiguard_registry::ApiConfig;
//!
//! let checker = ConsistencyChecker::new(ApiConfig::builtin()?, CheckerConfig::new("web/src"))?;
//! let report = checker.run()?;
//! if report.has_blocking_issues() {
//!     eprintln!("{} invalid calls", report.invalid.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod accumulator;
pub mod checker;
pub mod config;
pub mod error;
pub mod fix;
pub mod phase;
pub mod render;
pub mod report;
pub mod walk;
pub mod watch;

// Re-exports
pub use accumulator::ScanAccumulator;
pub use checker::{classify, ConsistencyChecker};
pub use config::{CheckerConfig, DEFAULT_EXTENSIONS, DEFAULT_IGNORE_DIRS};
pub use error::{CheckError, FixError};
pub use fix::{plan_fixes, Edit, FileFix, FixPlan};
pub use phase::{allowed_transitions, validate_transition, PhaseTracker, RunPhase};
pub use render::{render, render_text, write_text, OutputFormat};
pub use report::{
    ArityMismatch, ArityVariant, ConsistencyReport, DeprecatedUsage, FindingKind, InvalidCall,
    ReportSummary, Severity, SkippedFile,
};
pub use walk::{collect_files, WalkResult};
pub use watch::{watch, DEFAULT_DEBOUNCE};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for consistency checks
    pub use crate::{
        CheckError, CheckerConfig, ConsistencyChecker, ConsistencyReport, FindingKind, OutputFormat,
        Severity,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
