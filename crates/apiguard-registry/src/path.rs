//! Operation paths for addressing registry entries
//!
//! Provides [`OperationPath`], the dotted `resource.action` name that is
//! resolved to a remote-procedure name.

use crate::error::PathError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Dotted path naming a logical API operation
///
/// # Examples
/// - `categories.list` → `["categories", "list"]`
/// - `examPapers.detail` → `["examPapers", "detail"]`
///
/// A path always has at least one segment; every segment is non-empty and
/// made of ASCII alphanumerics, `_` or `-`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationPath(Vec<String>);

impl OperationPath {
    /// Create path from segments
    ///
    /// # Errors
    /// Returns [`PathError`] if there are no segments or any segment is invalid
    pub fn new(segments: Vec<String>) -> Result<Self, PathError> {
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        let display = segments.join(".");
        for segment in &segments {
            validate_segment(&display, segment)?;
        }
        Ok(Self(segments))
    }

    /// Create path from a single segment
    ///
    /// # Errors
    /// Returns [`PathError`] if the segment is invalid
    pub fn single(segment: impl Into<String>) -> Result<Self, PathError> {
        Self::new(vec![segment.into()])
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Append a segment, returning new path
    ///
    /// # Errors
    /// Returns [`PathError`] if the segment is invalid
    pub fn child(&self, segment: impl Into<String>) -> Result<Self, PathError> {
        let segment = segment.into();
        validate_segment(&format!("{self}.{segment}"), &segment)?;
        let mut new = self.clone();
        new.0.push(segment);
        Ok(new)
    }

    /// First `len` segments of this path
    ///
    /// `len` is clamped to between one and the number of segments.
    #[must_use]
    pub fn prefix(&self, len: usize) -> Self {
        let len = len.clamp(1, self.0.len());
        Self(self.0[..len].to_vec())
    }
}

/// Check a single segment
pub(crate) fn validate_segment(path: &str, segment: &str) -> Result<(), PathError> {
    if segment.is_empty() {
        return Err(PathError::EmptySegment(path.to_string()));
    }
    if segment
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
    {
        return Err(PathError::InvalidSegment {
            path: path.to_string(),
            segment: segment.to_string(),
        });
    }
    Ok(())
}

impl Display for OperationPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for OperationPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        let segments = s.split('.').map(str::to_string).collect();
        Self::new(segments)
    }
}

impl Serialize for OperationPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OperationPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_from_str_valid() {
        let path: OperationPath = "categories.list".parse().unwrap();
        assert_eq!(path.segments(), &["categories", "list"]);
    }

    #[test]
    fn path_from_str_empty() {
        let result: Result<OperationPath, _> = "".parse();
        assert_eq!(result, Err(PathError::Empty));
    }

    #[test]
    fn path_from_str_empty_segment() {
        for raw in ["a..b", ".a", "a.", "."] {
            let result: Result<OperationPath, _> = raw.parse();
            assert!(
                matches!(result, Err(PathError::EmptySegment(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn path_from_str_invalid_chars() {
        let result: Result<OperationPath, _> = "users.list all".parse();
        assert!(matches!(result, Err(PathError::InvalidSegment { .. })));
    }

    #[test]
    fn path_allows_dash_and_underscore() {
        let path: OperationPath = "choice-questions.get_list".parse().unwrap();
        assert_eq!(path.segments().len(), 2);
    }

    #[test]
    fn path_prefix_is_clamped() {
        let path: OperationPath = "a.b.c".parse().unwrap();
        assert_eq!(path.prefix(0).to_string(), "a");
        assert_eq!(path.prefix(2).to_string(), "a.b");
        assert_eq!(path.prefix(10).to_string(), "a.b.c");
    }

    #[test]
    fn path_child() {
        let parent = OperationPath::single("tags").unwrap();
        assert_eq!(parent.child("list").unwrap().to_string(), "tags.list");
        assert!(parent.child("").is_err());
    }

    #[test]
    fn path_serde_as_string() {
        let path: OperationPath = "users.detail".parse().unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"users.detail\"");
        let back: OperationPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
        assert!(serde_json::from_str::<OperationPath>("\"a..b\"").is_err());
    }
}
