//! Operation-path registry
//!
//! Provides [`Registry`], the single source of truth mapping operation paths
//! to remote-procedure names.

use crate::error::{is_identifier, ConfigError, RegistryError};
use crate::path::{validate_segment, OperationPath};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Minimum Jaro-Winkler score for a "did you mean" suggestion
const SUGGESTION_THRESHOLD: f64 = 0.85;

/// One node of the registry tree
///
/// Deserializes from a plain nested string map: strings become methods,
/// maps become groups. Any other value type is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegistryNode {
    /// Remote-procedure name
    Method(String),
    /// Named children
    Group(IndexMap<String, RegistryNode>),
}

/// One `(path, method)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodEntry {
    /// Operation path of the leaf
    pub path: OperationPath,
    /// Remote-procedure name at that path
    pub method: String,
}

/// Immutable mapping from operation paths to remote-procedure names
///
/// The flattened entry list and the set of known names are computed once at
/// construction; every lookup afterwards is read-only.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    root: IndexMap<String, RegistryNode>,
    entries: Vec<MethodEntry>,
    known: HashSet<String>,
}

impl Registry {
    /// Build registry from a nested table
    ///
    /// # Errors
    /// Returns [`ConfigError`] for keys that are not valid path segments and
    /// for empty or non-identifier method names.
    pub fn new(root: IndexMap<String, RegistryNode>) -> Result<Self, ConfigError> {
        let mut entries = Vec::new();
        collect_entries(&root, None, &mut entries)?;
        let known = entries.iter().map(|e| e.method.clone()).collect();
        Ok(Self {
            root,
            entries,
            known,
        })
    }

    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build registry from dotted `(path, method)` pairs
    ///
    /// # Errors
    /// Returns [`ConfigError`] for malformed paths, invalid methods, or a path
    /// declared both as a method and as a group.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut root: IndexMap<String, RegistryNode> = IndexMap::new();
        for (raw_path, method) in pairs {
            let path: OperationPath = raw_path.parse()?;
            insert_leaf(&mut root, &path, method)?;
        }
        Self::new(root)
    }

    /// Resolve an operation path to its remote-procedure name
    ///
    /// # Errors
    /// - [`RegistryError::NotFound`] naming the first prefix that is absent
    /// - [`RegistryError::NotALeaf`] if the path stops on a group
    /// - [`RegistryError::PastLeaf`] if the path continues below a method
    pub fn resolve(&self, path: &OperationPath) -> Result<&str, RegistryError> {
        let mut current = &self.root;
        let segments = path.segments();

        for (depth, segment) in segments.iter().enumerate() {
            let Some(node) = current.get(segment) else {
                return Err(RegistryError::NotFound {
                    path: path.clone(),
                    failed_prefix: path.prefix(depth + 1),
                });
            };
            let is_last = depth + 1 == segments.len();
            match (node, is_last) {
                (RegistryNode::Method(method), true) => return Ok(method),
                (RegistryNode::Method(method), false) => {
                    return Err(RegistryError::PastLeaf {
                        path: path.clone(),
                        leaf: path.prefix(depth + 1),
                        method: method.clone(),
                    });
                }
                (RegistryNode::Group(_), true) => {
                    return Err(RegistryError::NotALeaf { path: path.clone() });
                }
                (RegistryNode::Group(children), false) => current = children,
            }
        }

        // OperationPath always has at least one segment
        Err(RegistryError::NotALeaf { path: path.clone() })
    }

    /// Parse and resolve a dotted path
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidPath`] for malformed input, otherwise
    /// the same errors as [`Registry::resolve`].
    pub fn resolve_str(&self, path: &str) -> Result<&str, RegistryError> {
        let path: OperationPath = path.parse()?;
        self.resolve(&path)
    }

    /// Resolve with the legacy contract: `None` plus a warning on failure
    ///
    /// Malformed paths cannot reach this function; they fail while parsing
    /// the [`OperationPath`].
    #[must_use]
    pub fn resolve_or_warn(&self, path: &OperationPath) -> Option<&str> {
        match self.resolve(path) {
            Ok(method) => Some(method),
            Err(err) => {
                tracing::warn!("API mapping not found for path: {path} ({err})");
                None
            }
        }
    }

    /// Check whether `name` appears as some leaf
    #[inline]
    #[must_use]
    pub fn is_known_method(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    /// Every `(path, method)` pair in declaration order
    #[inline]
    #[must_use]
    pub fn all_methods(&self) -> &[MethodEntry] {
        &self.entries
    }

    /// Paths at which `method` is registered
    #[must_use]
    pub fn paths_for(&self, method: &str) -> Vec<&OperationPath> {
        self.entries
            .iter()
            .filter(|e| e.method == method)
            .map(|e| &e.path)
            .collect()
    }

    /// Method names registered at more than one path
    #[must_use]
    pub fn find_duplicates(&self) -> BTreeSet<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.method.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(method, _)| method.to_string())
            .collect()
    }

    /// Entries whose path or method contains `term`, case-insensitively
    #[must_use]
    pub fn suggest(&self, term: &str) -> Vec<&MethodEntry> {
        let needle = term.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                e.method.to_lowercase().contains(&needle)
                    || e.path.to_string().to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Closest known method to `name`, if any is similar enough
    #[must_use]
    pub fn closest_method(&self, name: &str) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for entry in &self.entries {
            let score = strsim::jaro_winkler(name, &entry.method);
            if score < SUGGESTION_THRESHOLD || entry.method == name {
                continue;
            }
            match best {
                Some((_, best_score)) if best_score >= score => {}
                _ => best = Some((entry.method.as_str(), score)),
            }
        }
        best.map(|(method, _)| method)
    }

    /// Top-level groups as declared
    #[inline]
    #[must_use]
    pub fn root(&self) -> &IndexMap<String, RegistryNode> {
        &self.root
    }

    /// Number of leaves
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if registry has no leaves
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn collect_entries(
    group: &IndexMap<String, RegistryNode>,
    prefix: Option<&OperationPath>,
    out: &mut Vec<MethodEntry>,
) -> Result<(), ConfigError> {
    for (key, node) in group {
        let path = match prefix {
            Some(parent) => parent.child(key.as_str())?,
            None => OperationPath::single(key.as_str())?,
        };
        match node {
            RegistryNode::Method(method) => {
                if method.is_empty() {
                    return Err(ConfigError::EmptyMethod {
                        path: path.to_string(),
                    });
                }
                if !is_identifier(method) {
                    return Err(ConfigError::InvalidMethod {
                        path: path.to_string(),
                        method: method.clone(),
                    });
                }
                out.push(MethodEntry {
                    path,
                    method: method.clone(),
                });
            }
            RegistryNode::Group(children) => collect_entries(children, Some(&path), out)?,
        }
    }
    Ok(())
}

fn insert_leaf(
    root: &mut IndexMap<String, RegistryNode>,
    path: &OperationPath,
    method: &str,
) -> Result<(), ConfigError> {
    let segments = path.segments();
    let mut current = root;
    for (depth, segment) in segments.iter().enumerate() {
        validate_segment(&path.to_string(), segment)?;
        if depth + 1 == segments.len() {
            if matches!(current.get(segment), Some(RegistryNode::Group(_))) {
                return Err(ConfigError::Conflict(path.to_string()));
            }
            current.insert(segment.clone(), RegistryNode::Method(method.to_string()));
            return Ok(());
        }
        let node = current
            .entry(segment.clone())
            .or_insert_with(|| RegistryNode::Group(IndexMap::new()));
        current = match node {
            RegistryNode::Group(children) => children,
            RegistryNode::Method(_) => {
                return Err(ConfigError::Conflict(path.prefix(depth + 1).to_string()));
            }
        };
    }
    Ok(())
}
