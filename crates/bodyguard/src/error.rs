// Error and path types for schema validation

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors raised while building or deriving schemas.
///
/// These are integration errors (caller bugs or malformed configuration),
/// not validation failures. Validation failures are data, reported as
/// [`Violation`](crate::violation::Violation)s, and never as `Err`.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema document is not valid JSON or names a malformed descriptor
    #[error("invalid schema document: {0}")]
    Parse(#[from] serde_json::Error),

    /// `optional()` derivation hit a descriptor with an unrecognized type tag
    #[error("descriptor for property '{property}' has an unrecognized type tag")]
    UnknownDescriptor { property: String },
}

/// Result type for schema construction and derivation
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Location of a violation within nested input, e.g. `users[2].email`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Create a new empty (root) path
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Push a property-name segment onto the path
    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(PathSegment::Key(key.into()));
    }

    /// Push an array-index segment onto the path
    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    /// Pop the last segment from the path
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Get the segments as a slice
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Check if the path is empty (the root of the checked value)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the length of the path
    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for Path {
    /// Renders `a.b[0].c`: keys joined with `.`, indices in brackets
    /// directly after their container. The root path renders empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && matches!(segment, PathSegment::Key(_)) {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// A segment in a violation path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PathSegment {
    /// Object property name
    Key(String),
    /// Array index
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}
