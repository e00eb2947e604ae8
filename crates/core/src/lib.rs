//! Core types for Tessera
//!
//! This crate defines the foundational types shared by the write path
//! (document to rows) and the read path (rows to documents):
//! - DocValue, ScalarValue, ScalarType: the document value model
//! - Document: ordered sub-document
//! - NestingPath: index-free identity of a doc part
//! - FieldKey: column key, with a structurally reserved scalar pseudo-field
//! - Limits: document limits checked before translation
//! - Error: error type hierarchy
//! - JSON conversion with typed special encodings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod field;
pub mod json;
pub mod limits;
pub mod path;
pub mod value;

pub use document::Document;
pub use error::{Error, Result};
pub use field::FieldKey;
pub use json::{document_from_json_str, document_to_json, json_to_document, json_to_value, value_to_json};
pub use limits::{LimitError, Limits};
pub use path::{NestingPath, PathSegment};
pub use value::{DocValue, ScalarType, ScalarValue, OBJECT_ID_LEN};

/// Identifier of a row within its doc part
///
/// Root rows use their document id as row id.
pub type RowId = u64;
