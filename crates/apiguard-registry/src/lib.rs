//! apiguard Registry
//!
//! Single source of truth for remote-procedure names.
//!
//! # Overview
//!
//! - **OperationPath**: dotted logical operation name (`categories.list`)
//! - **Registry**: immutable path → remote-procedure name tree
//! - **DeprecationTracker**: old name → replacement table with advisory checks
//! - **ApiConfig**: the versioned bundle of both, loaded once
//!
//! # Example
//!
//! ```rust
//! use apiguard_registry::{OperationPath, Registry};
//!
//! let registry = Registry::from_pairs([
//!     ("categories.list", "getCategoryList"),
//!     ("tags.list", "getTagList"),
//! ])
//! .unwrap();
//!
//! let path: OperationPath = "categories.list".parse().unwrap();
//! assert_eq!(registry.resolve(&path).unwrap(), "getCategoryList");
//! assert!(registry.is_known_method("getTagList"));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod deprecation;
pub mod error;
pub mod path;
pub mod registry;

// Re-exports
pub use config::{ApiConfig, ConfigFormat, ConfigWarning, DEFAULT_MARKERS, DEFAULT_REGISTRY_MODULE};
pub use deprecation::DeprecationTracker;
pub use error::{is_identifier, ConfigError, PathError, RegistryError};
pub use path::OperationPath;
pub use registry::{MethodEntry, Registry, RegistryNode};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for registry operations
    pub use crate::{
        ApiConfig, ConfigError, ConfigWarning, DeprecationTracker, MethodEntry, OperationPath,
        Registry, RegistryError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
