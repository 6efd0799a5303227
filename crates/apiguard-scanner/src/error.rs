//! Error types for source scanning

use std::path::PathBuf;

/// Errors while reading or parsing one source file
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// No grammar registered for the file extension
    #[error("no grammar for extension of {0}")]
    UnsupportedExtension(PathBuf),

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid UTF-8
    #[error("{0} is not valid UTF-8")]
    NotUtf8(PathBuf),

    /// Grammar could not be loaded into the parser
    #[error("parser initialisation failed: {0}")]
    ParserInit(String),

    /// Parser gave up without producing a tree
    #[error("parsing {0} produced no syntax tree")]
    ParseFailed(PathBuf),

    /// Calling-convention identifier is not usable
    #[error("'{0}' is not a valid identifier for a calling convention")]
    InvalidIdentifier(String),
}

impl ScanError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
