//! Error types for consistency runs and fixes

use crate::phase::RunPhase;
use apiguard_registry::ConfigError;
use apiguard_scanner::ScanError;
use std::path::PathBuf;

/// Errors that abort a consistency run
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// Root directory does not exist
    #[error("root directory not found: {0}")]
    RootNotFound(PathBuf),

    /// Root exists but is not a directory
    #[error("root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Run phase moved backwards or skipped ahead
    #[error("invalid run phase transition: {from} -> {to}")]
    InvalidTransition {
        /// Current phase
        from: RunPhase,
        /// Requested phase
        to: RunPhase,
    },

    /// Configured extension has no grammar
    #[error("no grammar for extension '{0}'")]
    UnsupportedExtension(String),

    /// No extensions configured
    #[error("at least one file extension is required")]
    NoExtensions,

    /// Registry configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Scanner construction error
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// IO error outside per-file scanning
    #[error("io error at {path}: {source}")]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File watcher error
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl CheckError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error comes from configuration or arguments rather
    /// than the scanned tree
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::RootNotFound(_)
                | Self::NotADirectory(_)
                | Self::UnsupportedExtension(_)
                | Self::NoExtensions
                | Self::Config(_)
                | Self::Scan(ScanError::InvalidIdentifier(_))
        )
    }
}

/// Errors while rewriting deprecated calls
#[derive(Debug, thiserror::Error)]
pub enum FixError {
    /// Only member calls carry a rewritable method identifier
    #[error("in-place fixes need the member calling convention, not {0}")]
    UnsupportedConvention(String),

    /// Walk or configuration failure
    #[error(transparent)]
    Check(#[from] CheckError),

    /// Rewritten file could not be written
    #[error("io error writing {path}: {source}")]
    Io {
        /// File being written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl FixError {
    /// Whether the error comes from configuration or arguments rather
    /// than from writing the tree
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        match self {
            Self::UnsupportedConvention(_) => true,
            Self::Check(e) => e.is_usage_error(),
            Self::Io { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors() {
        assert!(CheckError::RootNotFound(PathBuf::from("/nope")).is_usage_error());
        assert!(CheckError::UnsupportedExtension("py".into()).is_usage_error());
        let transition = CheckError::InvalidTransition {
            from: RunPhase::Reported,
            to: RunPhase::Scanning,
        };
        assert!(!transition.is_usage_error());
        assert_eq!(
            transition.to_string(),
            "invalid run phase transition: reported -> scanning"
        );
        let write = CheckError::io_error("report.txt", std::io::ErrorKind::NotFound.into());
        assert!(!write.is_usage_error());
    }

    #[test]
    fn fix_usage_errors() {
        assert!(FixError::UnsupportedConvention("ajax('<endpoint>', ...)".into()).is_usage_error());
        assert!(FixError::Check(CheckError::NoExtensions).is_usage_error());
        let write = FixError::Io {
            path: PathBuf::from("src/a.js"),
            source: std::io::ErrorKind::PermissionDenied.into(),
        };
        assert!(!write.is_usage_error());
    }
}
