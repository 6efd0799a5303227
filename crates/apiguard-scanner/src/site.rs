//! Call sites and per-file scan results

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;

/// One invocation of a remote procedure in source code
///
/// Orders by method, then argument count, file and line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallSite {
    /// Method name as written at the call site; the endpoint literal for
    /// wrapper calls
    pub method: String,
    /// Number of syntactic arguments
    pub argument_count: usize,
    /// File containing the call
    pub file_path: PathBuf,
    /// 1-based line, when known
    pub line: Option<usize>,
}

impl CallSite {
    /// Ordering key: file, line, method, argument count
    #[must_use]
    pub fn sort_key(&self) -> (&PathBuf, Option<usize>, &str, usize) {
        (&self.file_path, self.line, &self.method, self.argument_count)
    }

    /// `path:line` for display
    #[must_use]
    pub fn location(&self) -> String {
        match self.line {
            Some(line) => format!("{}:{line}", self.file_path.display()),
            None => self.file_path.display().to_string(),
        }
    }
}

/// A raw call site with the byte span of its method name
///
/// Produced for every occurrence, before per-file dedup. The span covers
/// only the name (no quotes for string subscripts), so replacing
/// `source[method_span]` rewrites the call in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOccurrence {
    /// The call site
    pub site: CallSite,
    /// Byte range of the method name in the whole file
    pub method_span: Range<usize>,
}

/// Why a call could not be analysed statically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnanalyzableReason {
    /// `api[expr](...)` with a non-literal key
    ComputedMember,
    /// Wrapper call whose first argument is not a literal
    NonLiteralName,
    /// Wrapper call with no arguments
    MissingName,
}

impl std::fmt::Display for UnanalyzableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::ComputedMember => "computed member access",
            Self::NonLiteralName => "non-literal procedure name",
            Self::MissingName => "missing procedure name",
        })
    }
}

/// A call on the client whose target cannot be determined statically
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnanalyzableCall {
    /// File containing the call
    pub file_path: PathBuf,
    /// 1-based line
    pub line: usize,
    /// Callee text, truncated
    pub snippet: String,
    /// Why analysis gave up
    pub reason: UnanalyzableReason,
}

/// Everything the scanner learned about one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileScan {
    /// Scanned file
    pub path: PathBuf,
    /// Distinct `(method, argument_count)` call sites, first occurrence kept
    pub call_sites: Vec<CallSite>,
    /// Calls that could not be resolved statically
    pub unanalyzable: Vec<UnanalyzableCall>,
    /// File mentions the client identifier at all
    pub references_object: bool,
    /// File imports or references the registry module
    pub references_registry: bool,
    /// Parse tree contained syntax errors
    pub has_syntax_errors: bool,
}

impl FileScan {
    /// Empty scan for a file that never mentions the client identifier
    #[must_use]
    pub fn unreferenced(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// File calls remote procedures without going through the registry
    #[inline]
    #[must_use]
    pub fn is_unmapped_usage(&self) -> bool {
        !self.call_sites.is_empty() && !self.references_registry
    }
}
