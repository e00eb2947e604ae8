//! Nesting paths
//!
//! A [`NestingPath`] identifies a doc part: the structural location shared by
//! every document of a collection. It is index-free. All elements of an array
//! stored under a field share that field's doc part, so `{"a": [1, 2]}` puts
//! both elements in doc part `a`.
//!
//! An array nested directly inside another array's element adds one
//! [`PathSegment::ArrayLevel`]: the inner elements of `{"a": [[1]]}` live in
//! doc part `a.$2`.
//!
//! | Document | Doc part of the innermost value |
//! |----------|---------------------------------|
//! | `{"a": 1}` | root |
//! | `{"a": {"b": 1}}` | `a` |
//! | `{"a": [{"b": 1}]}` | `a` |
//! | `{"a": [[1]]}` | `a.$2` |
//! | `{"a": [[[1]]]}` | `a.$2.$3` |

use serde::{Deserialize, Serialize};
use std::fmt;

/// A segment of a nesting path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PathSegment {
    /// Enter a named field
    Field(String),
    /// Enter an array nested in an array element
    ArrayLevel,
}

/// Index-free identity of a doc part
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NestingPath {
    segments: Vec<PathSegment>,
}

impl NestingPath {
    /// The root path (empty)
    pub fn root() -> Self {
        NestingPath {
            segments: Vec::new(),
        }
    }

    /// Create a path from a vector of segments
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        NestingPath { segments }
    }

    /// Get the path segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Check if this is the root path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Depth of the doc part (root is 0)
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Append a field segment (builder pattern)
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Field(name.into()));
        self
    }

    /// Append an array level (builder pattern)
    pub fn array_level(mut self) -> Self {
        self.segments.push(PathSegment::ArrayLevel);
        self
    }

    /// Push a field segment (mutating)
    pub fn push_field(&mut self, name: impl Into<String>) {
        self.segments.push(PathSegment::Field(name.into()));
    }

    /// Push an array level (mutating)
    pub fn push_array_level(&mut self) {
        self.segments.push(PathSegment::ArrayLevel);
    }

    /// Pop the last segment
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Child path for a named field
    pub fn child_field(&self, name: &str) -> NestingPath {
        self.clone().field(name)
    }

    /// Child path for an array nested in this doc part's array elements
    pub fn child_array_level(&self) -> NestingPath {
        self.clone().array_level()
    }

    /// Get the parent path (None if root)
    pub fn parent(&self) -> Option<NestingPath> {
        if self.segments.is_empty() {
            None
        } else {
            let mut parent = self.clone();
            parent.segments.pop();
            Some(parent)
        }
    }

    /// Get the last segment (None if root)
    pub fn last_segment(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Whether the last segment is an array level
    pub fn is_in_array(&self) -> bool {
        matches!(self.segments.last(), Some(PathSegment::ArrayLevel))
    }

    /// Name of the field under which rows of this doc part hang
    ///
    /// Skips trailing array levels, so `a.$2.$3` has cell name `a`.
    /// None for the root.
    pub fn cell_name(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|s| match s {
            PathSegment::Field(name) => Some(name.as_str()),
            PathSegment::ArrayLevel => None,
        })
    }

    /// Array dimension of this doc part
    ///
    /// 1 plus the number of trailing array levels; 0 for the root.
    pub fn array_dimension(&self) -> usize {
        if self.is_root() {
            return 0;
        }
        1 + self
            .segments
            .iter()
            .rev()
            .take_while(|s| matches!(s, PathSegment::ArrayLevel))
            .count()
    }

    /// Check if this path is an ancestor of another (or equal)
    pub fn is_ancestor_of(&self, other: &NestingPath) -> bool {
        self.segments.len() <= other.segments.len()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a == b)
    }
}

impl fmt::Display for NestingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dimension = 1;
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match seg {
                PathSegment::Field(name) => {
                    dimension = 1;
                    f.write_str(name)?;
                }
                PathSegment::ArrayLevel => {
                    dimension += 1;
                    write!(f, "${}", dimension)?;
                }
            }
        }
        Ok(())
    }
}
