//! Size limits for documents
//!
//! This module defines configurable limits that are checked before a document
//! is translated into rows. A violation aborts the document before any row is
//! emitted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Document;
use crate::value::DocValue;

/// Error type for document limit violations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LimitError {
    /// Document nesting exceeds maximum depth
    #[error("document nesting depth {depth} exceeds maximum of {max} levels")]
    NestingTooDeep {
        /// Actual nesting depth
        depth: usize,
        /// Maximum allowed depth
        max: usize,
    },

    /// Array exceeds maximum size
    #[error("array size {size} exceeds maximum of {max} elements")]
    ArrayTooLarge {
        /// Actual array size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// Field name exceeds maximum length
    #[error("field name of {length} bytes exceeds maximum of {max} bytes")]
    FieldNameTooLong {
        /// Actual name length in bytes
        length: usize,
        /// Maximum allowed length
        max: usize,
    },
}

/// Document limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum nesting depth, counting the root document (default: 128)
    pub max_nesting_depth: usize,

    /// Maximum array length (default: 1M elements)
    pub max_array_len: usize,

    /// Maximum field name length in bytes (default: 1024)
    pub max_field_name_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_nesting_depth: 128,
            max_array_len: 1_000_000,
            max_field_name_bytes: 1024,
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        Limits {
            max_nesting_depth: 8,
            max_array_len: 100,
            max_field_name_bytes: 32,
        }
    }

    /// Validate a root document
    ///
    /// Walks the whole document and returns the first violation found.
    pub fn validate_document(&self, doc: &Document) -> Result<(), LimitError> {
        self.validate_document_impl(doc, 1)
    }

    fn validate_document_impl(&self, doc: &Document, depth: usize) -> Result<(), LimitError> {
        self.check_depth(depth)?;
        for (name, value) in doc.iter() {
            if name.len() > self.max_field_name_bytes {
                return Err(LimitError::FieldNameTooLong {
                    length: name.len(),
                    max: self.max_field_name_bytes,
                });
            }
            self.validate_value_impl(value, depth)?;
        }
        Ok(())
    }

    fn validate_value_impl(&self, value: &DocValue, depth: usize) -> Result<(), LimitError> {
        match value {
            DocValue::Scalar(_) => Ok(()),
            DocValue::Array(elements) => {
                self.check_depth(depth + 1)?;
                if elements.len() > self.max_array_len {
                    return Err(LimitError::ArrayTooLarge {
                        size: elements.len(),
                        max: self.max_array_len,
                    });
                }
                for element in elements {
                    self.validate_value_impl(element, depth + 1)?;
                }
                Ok(())
            }
            DocValue::Document(doc) => self.validate_document_impl(doc, depth + 1),
        }
    }

    fn check_depth(&self, depth: usize) -> Result<(), LimitError> {
        if depth > self.max_nesting_depth {
            return Err(LimitError::NestingTooDeep {
                depth,
                max: self.max_nesting_depth,
            });
        }
        Ok(())
    }
}
