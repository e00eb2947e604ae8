//! Schema resolver contract
//!
//! The write path asks the resolver for a handle the first time it meets a
//! doc part, and again the first time it meets a (field key, type) pair in
//! that doc part. Handles are opaque: physical table and column naming
//! belongs to the storage layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use tessera_core::{FieldKey, NestingPath, Result, ScalarType};

/// Handle of a doc part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocPartId(pub u32);

/// Handle of a typed field within a doc part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(pub u32);

impl fmt::Display for DocPartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "docpart#{}", self.0)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field#{}", self.0)
    }
}

/// Doc part schema resolver
///
/// Thread safety: implementations are shared between translators running on
/// different threads (requires Send + Sync).
///
/// # Errors
///
/// Failures are reported as `Error::Resolver` and abort the document being
/// translated.
pub trait SchemaResolver: Send + Sync {
    /// Resolve the doc part at `path`, creating it if it does not exist
    fn resolve_or_create_doc_part(&self, path: &NestingPath) -> Result<DocPartId>;

    /// Resolve the field (`key`, `ty`) of a doc part, creating it if needed
    fn resolve_field(&self, doc_part: DocPartId, key: &FieldKey, ty: ScalarType)
        -> Result<FieldId>;
}
