//! Versioned API configuration
//!
//! [`ApiConfig`] is the single injection point for the registry and
//! deprecation tables. It is built once (from the built-in table or a TOML,
//! JSON or YAML file) and read by every check afterwards.

use crate::deprecation::DeprecationTracker;
use crate::error::{is_identifier, ConfigError};
use crate::registry::{Registry, RegistryNode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// Canonical table shipped with the crate
const BUILTIN_TOML: &str = include_str!("../config/default.toml");

/// Module specifier fragment that marks an import of the registry
pub const DEFAULT_REGISTRY_MODULE: &str = "api-mapping";

/// Identifiers whose presence marks use of the registry
pub const DEFAULT_MARKERS: &[&str] = &[
    "getApiMethod",
    "API_MAPPING",
    "validateApiCall",
    "createApiProxy",
];

/// Version reported when a config file does not declare one
pub const UNVERSIONED: &str = "unversioned";

/// Advisory configuration finding
///
/// Never fatal; surfaced in reports so table drift stays visible.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigWarning {
    /// Replacement name is not a registry leaf
    UnknownReplacement {
        /// Old name
        deprecated: String,
        /// Suggested name missing from the registry
        replacement: String,
    },
    /// Deprecated name is still a live registry leaf
    DeprecatedStillRegistered {
        /// Old name
        deprecated: String,
        /// Paths still mapping to it
        paths: Vec<String>,
    },
    /// Replacement is itself deprecated
    ChainedReplacement {
        /// Old name
        deprecated: String,
        /// Its replacement
        replacement: String,
        /// The replacement's own replacement
        next: String,
    },
    /// Same method registered at several paths
    DuplicateMethod {
        /// Method name
        method: String,
        /// Every path mapping to it
        paths: Vec<String>,
    },
}

impl Display for ConfigWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownReplacement {
                deprecated,
                replacement,
            } => write!(
                f,
                "replacement '{replacement}' for deprecated '{deprecated}' is not a registered method"
            ),
            Self::DeprecatedStillRegistered { deprecated, paths } => write!(
                f,
                "deprecated '{deprecated}' is still registered at {}",
                paths.join(", ")
            ),
            Self::ChainedReplacement {
                deprecated,
                replacement,
                next,
            } => write!(
                f,
                "'{deprecated}' is replaced by '{replacement}', which is itself deprecated in favour of '{next}'"
            ),
            Self::DuplicateMethod { method, paths } => {
                write!(f, "method '{method}' is registered at {}", paths.join(", "))
            }
        }
    }
}

/// Supported config file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl ConfigFormat {
    /// Detect format from file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Some(Self::Toml),
            Some("json") => Some(Self::Json),
            Some("yaml" | "yml") => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Human-readable name
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// On-disk shape of a config file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    version: Option<String>,
    #[serde(default)]
    registry: IndexMap<String, RegistryNode>,
    #[serde(default)]
    deprecated: IndexMap<String, String>,
    registry_module: Option<String>,
    markers: Option<Vec<String>>,
}

/// Registry, deprecation table and registry-usage markers, built once
#[derive(Debug, Clone)]
pub struct ApiConfig {
    version: String,
    registry: Registry,
    deprecations: DeprecationTracker,
    registry_module: String,
    markers: Vec<String>,
    warnings: Vec<ConfigWarning>,
}

impl ApiConfig {
    /// Build from already-constructed tables
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the deprecation table is malformed.
    pub fn new(
        version: impl Into<String>,
        registry: Registry,
        deprecated: IndexMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let deprecations = DeprecationTracker::new(deprecated, &registry)?;

        let mut warnings: Vec<ConfigWarning> = registry
            .find_duplicates()
            .into_iter()
            .map(|method| ConfigWarning::DuplicateMethod {
                paths: registry
                    .paths_for(&method)
                    .into_iter()
                    .map(ToString::to_string)
                    .collect(),
                method,
            })
            .collect();
        for warning in &warnings {
            tracing::warn!("registry: {warning}");
        }
        warnings.extend(deprecations.warnings().iter().cloned());

        Ok(Self {
            version: version.into(),
            registry,
            deprecations,
            registry_module: DEFAULT_REGISTRY_MODULE.to_string(),
            markers: DEFAULT_MARKERS.iter().map(|m| (*m).to_string()).collect(),
            warnings,
        })
    }

    /// The canonical table shipped with the crate
    ///
    /// # Errors
    /// Returns [`ConfigError`] only if the embedded table is broken.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_str_with(BUILTIN_TOML, ConfigFormat::Toml, None)
    }

    /// Load from a file, choosing the decoder by extension
    ///
    /// # Errors
    /// Returns [`ConfigError`] for IO failures, unknown extensions and
    /// malformed tables.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        tracing::debug!("loading {} config from {}", format.name(), path.display());
        Self::from_str_with(&text, format, Some(path.to_path_buf()))
    }

    /// Parse config text in the given format
    ///
    /// # Errors
    /// Returns [`ConfigError`] for malformed input.
    pub fn from_str_with(
        text: &str,
        format: ConfigFormat,
        origin: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let raw: RawConfig = match format {
            ConfigFormat::Toml => toml::from_str(text)
                .map_err(|e| ConfigError::malformed("toml", origin, e.to_string()))?,
            ConfigFormat::Json => serde_json::from_str(text)
                .map_err(|e| ConfigError::malformed("json", origin, e.to_string()))?,
            ConfigFormat::Yaml => serde_yaml::from_str(text)
                .map_err(|e| ConfigError::malformed("yaml", origin, e.to_string()))?,
        };
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let registry = Registry::new(raw.registry)?;
        let mut config = Self::new(
            raw.version.unwrap_or_else(|| UNVERSIONED.to_string()),
            registry,
            raw.deprecated,
        )?;
        if let Some(module) = raw.registry_module {
            config = config.with_registry_module(module)?;
        }
        if let Some(markers) = raw.markers {
            config = config.with_markers(markers)?;
        }
        Ok(config)
    }

    /// Replace the registry-usage marker identifiers
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidIdentifier`] for a non-identifier marker.
    pub fn with_markers<I, S>(mut self, markers: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markers: Vec<String> = markers.into_iter().map(Into::into).collect();
        if let Some(bad) = markers.iter().find(|m| !is_identifier(m)) {
            return Err(ConfigError::InvalidIdentifier(bad.clone()));
        }
        self.markers = markers;
        Ok(self)
    }

    /// Replace the registry module specifier fragment
    ///
    /// # Errors
    /// Returns [`ConfigError::EmptyRegistryModule`] for a blank fragment,
    /// which would match every import.
    pub fn with_registry_module(mut self, module: impl Into<String>) -> Result<Self, ConfigError> {
        let module = module.into();
        if module.trim().is_empty() {
            return Err(ConfigError::EmptyRegistryModule);
        }
        self.registry_module = module;
        Ok(self)
    }

    /// Config version label
    #[inline]
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The deprecation tracker
    #[inline]
    #[must_use]
    pub fn deprecations(&self) -> &DeprecationTracker {
        &self.deprecations
    }

    /// Module specifier fragment marking a registry import
    #[inline]
    #[must_use]
    pub fn registry_module(&self) -> &str {
        &self.registry_module
    }

    /// Identifiers marking registry use
    #[inline]
    #[must_use]
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Registry duplicates and deprecation advisories
    #[inline]
    #[must_use]
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }
}
