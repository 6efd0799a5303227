//! Deprecated remote-procedure names
//!
//! Provides [`DeprecationTracker`]: old name → replacement lookups, plus the
//! advisory consistency checks run against a [`Registry`] at construction.

use crate::config::ConfigWarning;
use crate::error::{is_identifier, ConfigError};
use crate::registry::Registry;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Deprecated name → replacement name table
///
/// A partially inconsistent table is still usable: mismatches with the
/// registry are reported as [`ConfigWarning`]s, never as errors, because
/// deprecation tables tend to move ahead of registries.
#[derive(Debug, Clone, Default)]
pub struct DeprecationTracker {
    table: IndexMap<String, String>,
    warnings: Vec<ConfigWarning>,
}

impl DeprecationTracker {
    /// Build tracker and run advisory checks against `registry`
    ///
    /// # Errors
    /// Returns [`ConfigError`] if a name is not an identifier or maps to
    /// itself. Registry mismatches are warnings, see [`Self::warnings`].
    pub fn new(table: IndexMap<String, String>, registry: &Registry) -> Result<Self, ConfigError> {
        for (deprecated, replacement) in &table {
            if !is_identifier(deprecated) || !is_identifier(replacement) {
                return Err(ConfigError::InvalidDeprecation {
                    deprecated: deprecated.clone(),
                    replacement: replacement.clone(),
                });
            }
            if deprecated == replacement {
                return Err(ConfigError::SelfReplacement(deprecated.clone()));
            }
        }

        let warnings = advisory_checks(&table, registry);
        for warning in &warnings {
            tracing::warn!("deprecation table: {warning}");
        }

        Ok(Self { table, warnings })
    }

    /// Recommended replacement for `name`, if it is deprecated
    #[inline]
    #[must_use]
    pub fn check_deprecated(&self, name: &str) -> Option<&str> {
        self.table.get(name).map(String::as_str)
    }

    /// Check if `name` is deprecated
    #[inline]
    #[must_use]
    pub fn is_deprecated(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Follow replacement chains to the last name that is not deprecated
    ///
    /// Stops at the last distinct name if the chain loops.
    #[must_use]
    pub fn final_replacement(&self, name: &str) -> Option<&str> {
        let mut current = self.check_deprecated(name)?;
        let mut seen = HashSet::from([name]);
        while let Some(next) = self.check_deprecated(current) {
            if !seen.insert(current) || seen.contains(next) {
                break;
            }
            current = next;
        }
        Some(current)
    }

    /// Advisory findings from construction
    #[inline]
    #[must_use]
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    /// Iterate `(deprecated, replacement)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of deprecated names
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if nothing is deprecated
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

fn advisory_checks(table: &IndexMap<String, String>, registry: &Registry) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    for (deprecated, replacement) in table {
        if !registry.is_known_method(replacement) {
            warnings.push(ConfigWarning::UnknownReplacement {
                deprecated: deprecated.clone(),
                replacement: replacement.clone(),
            });
        }
        if registry.is_known_method(deprecated) {
            warnings.push(ConfigWarning::DeprecatedStillRegistered {
                deprecated: deprecated.clone(),
                paths: registry
                    .paths_for(deprecated)
                    .into_iter()
                    .map(ToString::to_string)
                    .collect(),
            });
        }
        if let Some(next) = table.get(replacement) {
            warnings.push(ConfigWarning::ChainedReplacement {
                deprecated: deprecated.clone(),
                replacement: replacement.clone(),
                next: next.clone(),
            });
        }
    }
    warnings
}
