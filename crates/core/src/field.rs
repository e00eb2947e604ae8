//! Column keys
//!
//! A doc part column is addressed by a [`FieldKey`] and a
//! [`ScalarType`](crate::ScalarType). The scalar pseudo-field that holds raw
//! array elements is its own variant, so it can never be reached by a user
//! field name, whatever the name is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a doc part column
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldKey {
    /// User field of a sub-document
    Named(String),
    /// Reserved pseudo-field holding the value of a scalar row
    Scalar,
}

impl FieldKey {
    /// Key for a user field
    pub fn named(name: impl Into<String>) -> Self {
        FieldKey::Named(name.into())
    }

    /// Whether this is the reserved scalar pseudo-field
    pub fn is_scalar(&self) -> bool {
        matches!(self, FieldKey::Scalar)
    }

    /// User field name, None for the scalar pseudo-field
    pub fn name(&self) -> Option<&str> {
        match self {
            FieldKey::Named(name) => Some(name),
            FieldKey::Scalar => None,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Named(name) => write!(f, "{:?}", name),
            FieldKey::Scalar => f.write_str("<scalar>"),
        }
    }
}
