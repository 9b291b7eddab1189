//! Dotted field paths for partial document updates
//!
//! Provides [`FieldPath`] for addressing individual fields inside a stored
//! participant document, e.g. `mainStudy.last_scenario_stage` or
//! `mainStudy.observer_timeouts.stage_3`.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Path to a field within a stored document
///
/// Segments are joined with `.` in the wire form. Updates through a path
/// create intermediate objects as needed and replace only the addressed
/// field (last-write-wins at field granularity).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Create path from a single top-level field
    #[inline]
    #[must_use]
    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a segment, returning a new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        let segments: Vec<String> = s.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(PathError::EmptySegment(s.to_string()));
        }
        Ok(Self(segments))
    }
}

/// Path parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty path string
    #[error("field path must not be empty")]
    Empty,

    /// A segment between dots was empty
    #[error("field path contains an empty segment: {0:?}")]
    EmptySegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_path() {
        let path: FieldPath = "mainStudy.last_scenario_stage".parse().unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.segments()[0], "mainStudy");
        assert_eq!(path.to_string(), "mainStudy.last_scenario_stage");
    }

    #[test]
    fn rejects_empty_and_degenerate_paths() {
        assert_eq!("".parse::<FieldPath>(), Err(PathError::Empty));
        assert!(matches!(
            "mainStudy..x".parse::<FieldPath>(),
            Err(PathError::EmptySegment(_))
        ));
        assert!(matches!(
            ".leading".parse::<FieldPath>(),
            Err(PathError::EmptySegment(_))
        ));
    }

    #[test]
    fn child_appends_segment() {
        let base = FieldPath::single("mainStudy");
        let full = base.child("observer_timeouts").child("stage_2");
        assert_eq!(full.to_string(), "mainStudy.observer_timeouts.stage_2");
    }
}
