//! Error types for the registry
//!
//! - Path errors (malformed operation paths, caller bugs)
//! - Lookup errors (path not present in the registry)
//! - Configuration errors (malformed tables, fail fast at construction)

use crate::path::OperationPath;
use std::path::PathBuf;

/// Malformed operation path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// No segments at all
    #[error("operation path is empty")]
    Empty,

    /// Empty segment such as `a..b`
    #[error("operation path '{0}' contains an empty segment")]
    EmptySegment(String),

    /// Segment with characters outside `[A-Za-z0-9_-]`
    #[error("invalid segment '{segment}' in operation path '{path}'")]
    InvalidSegment {
        /// Full path as written
        path: String,
        /// Offending segment
        segment: String,
    },
}

/// Lookup failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Some segment of the path is absent
    #[error("API mapping not found for path: {path} (no entry at '{failed_prefix}')")]
    NotFound {
        /// Requested path
        path: OperationPath,
        /// Shortest prefix that did not resolve
        failed_prefix: OperationPath,
    },

    /// Path stops on a group instead of a method
    #[error("path '{path}' names a group, not a method")]
    NotALeaf {
        /// Requested path
        path: OperationPath,
    },

    /// Path walks through a method as if it were a group
    #[error("path '{path}' continues past method '{method}' at '{leaf}'")]
    PastLeaf {
        /// Requested path
        path: OperationPath,
        /// Prefix that resolved to a method
        leaf: OperationPath,
        /// Method found at `leaf`
        method: String,
    },

    /// Path could not be parsed
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),
}

impl RegistryError {
    /// The prefix that failed to resolve, for diagnostics
    #[must_use]
    pub fn failed_prefix(&self) -> Option<&OperationPath> {
        match self {
            Self::NotFound { failed_prefix, .. } => Some(failed_prefix),
            Self::PastLeaf { leaf, .. } => Some(leaf),
            _ => None,
        }
    }
}

/// Malformed registry or deprecation table
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading a config file
    #[error("io error reading {path}: {source}")]
    Io {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File could not be decoded
    #[error("malformed {format} config{}: {message}", location(.path.as_ref()))]
    Malformed {
        /// Source format name
        format: &'static str,
        /// Config file, if loaded from disk
        path: Option<PathBuf>,
        /// Decoder message
        message: String,
    },

    /// Extension is not toml, json, yaml or yml
    #[error("unsupported config format for {0}")]
    UnsupportedFormat(PathBuf),

    /// Group key that cannot be addressed by an operation path
    #[error("invalid registry key: {0}")]
    InvalidKey(#[from] PathError),

    /// Empty method name
    #[error("empty method name at '{path}'")]
    EmptyMethod {
        /// Where the leaf sits
        path: String,
    },

    /// Method name that is not a JavaScript identifier
    #[error("method name '{method}' at '{path}' is not a valid identifier")]
    InvalidMethod {
        /// Where the leaf sits
        path: String,
        /// Offending name
        method: String,
    },

    /// Same dotted path declared both as method and as group
    #[error("registry path '{0}' is declared both as a method and as a group")]
    Conflict(String),

    /// Deprecation table entry with an invalid name
    #[error("deprecation entry '{deprecated}' -> '{replacement}' is not a pair of identifiers")]
    InvalidDeprecation {
        /// Old name
        deprecated: String,
        /// New name
        replacement: String,
    },

    /// Deprecated name mapped to itself
    #[error("deprecated method '{0}' is its own replacement")]
    SelfReplacement(String),

    /// Blank registry module fragment
    #[error("registry_module must not be empty")]
    EmptyRegistryModule,

    /// Identifier settings (remote object, wrapper function, markers)
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
}

fn location(path: Option<&PathBuf>) -> String {
    path.map(|p| format!(" {}", p.display())).unwrap_or_default()
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create decode error
    pub fn malformed(
        format: &'static str,
        path: Option<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::Malformed {
            format,
            path,
            message: message.into(),
        }
    }
}

/// Check that `name` is usable as a JavaScript identifier (ASCII subset)
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
