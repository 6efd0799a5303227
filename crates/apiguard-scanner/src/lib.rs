//! apiguard Scanner
//!
//! Extracts remote-procedure call sites from JavaScript, TypeScript and Vue
//! sources using tree-sitter.
//!
//! # Example
//!
//! ```rust
//! use apiguard_scanner::{CallConvention, SourceScanner};
//! use std::path::Path;
//!
//! let scanner = SourceScanner::new(CallConvention::default()).unwrap();
//! let scan = scanner
//!     .scan(Path::new("src/views/Tags.js"), "api.getTagList({ page: 1 }, true)")
//!     .unwrap();
//!
//! assert_eq!(scan.call_sites[0].method, "getTagList");
//! assert_eq!(scan.call_sites[0].argument_count, 2);
//! ```

#![warn(missing_docs)]

pub mod convention;
pub mod error;
pub mod language;
pub mod scanner;
pub mod site;

// Re-exports
pub use convention::{CallConvention, DEFAULT_OBJECT, DEFAULT_WRAPPER};
pub use error::ScanError;
pub use language::{script_blocks, ScriptBlock, SourceLanguage};
pub use scanner::{read_source, SourceScanner};
pub use site::{CallOccurrence, CallSite, FileScan, UnanalyzableCall, UnanalyzableReason};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for scanning
    pub use crate::{CallConvention, CallSite, FileScan, ScanError, SourceLanguage, SourceScanner};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
