//! Calling conventions recognised as remote-procedure calls

use crate::error::ScanError;
use apiguard_registry::is_identifier;
use serde::{Deserialize, Serialize};

/// Default client object for member calls
pub const DEFAULT_OBJECT: &str = "api";

/// Default wrapper function for URL-style calls
pub const DEFAULT_WRAPPER: &str = "ajax";

/// How source code invokes remote procedures
///
/// `Member` matches `api.method(...)` and `api['method'](...)`, where the
/// member names a registry method. `Wrapper` matches `ajax('admin/user',
/// 'get', ...)`, where the first argument is the endpoint URL; those
/// literals are never registry methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallConvention {
    /// Method calls on a shared client object
    Member {
        /// Client object identifier
        object: String,
    },
    /// Calls through a wrapper taking the endpoint URL first
    Wrapper {
        /// Wrapper function identifier
        function: String,
    },
}

impl CallConvention {
    /// Member convention on `object`
    ///
    /// # Errors
    /// Returns [`ScanError::InvalidIdentifier`] if `object` is not a
    /// JavaScript identifier
    pub fn member(object: impl Into<String>) -> Result<Self, ScanError> {
        let object = object.into();
        if !is_identifier(&object) {
            return Err(ScanError::InvalidIdentifier(object));
        }
        Ok(Self::Member { object })
    }

    /// Wrapper convention through `function`
    ///
    /// # Errors
    /// Returns [`ScanError::InvalidIdentifier`] if `function` is not a
    /// JavaScript identifier
    pub fn wrapper(function: impl Into<String>) -> Result<Self, ScanError> {
        let function = function.into();
        if !is_identifier(&function) {
            return Err(ScanError::InvalidIdentifier(function));
        }
        Ok(Self::Wrapper { function })
    }

    /// Identifier whose presence marks a file as relevant
    #[inline]
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Member { object } => object,
            Self::Wrapper { function } => function,
        }
    }

    /// Whether call sites can be rewritten in place
    #[inline]
    #[must_use]
    pub fn is_member(&self) -> bool {
        matches!(self, Self::Member { .. })
    }
}

impl Default for CallConvention {
    fn default() -> Self {
        Self::Member {
            object: DEFAULT_OBJECT.to_string(),
        }
    }
}

impl std::fmt::Display for CallConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Member { object } => write!(f, "{object}.<method>(...)"),
            Self::Wrapper { function } => write!(f, "{function}('<endpoint>', ...)"),
        }
    }
}
