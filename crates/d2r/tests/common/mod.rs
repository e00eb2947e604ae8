//! Shared helpers for the translation test suites.
//!
//! Import via `mod common;` from any test file.

#![allow(dead_code)]

use std::sync::Arc;
use tessera_core::{document_from_json_str, Document, Error, NestingPath, Result, RowId};
pub use tessera_d2r::{
    CollectionData, D2RTranslator, OrphanPolicy, R2DTranslator, ReadDocument, TranslatorConfig,
};
pub use tessera_metainf::{MetaCollection, RowIdAllocator, SchemaResolver, SequenceAllocator};

// ============================================================================
// Fixtures
// ============================================================================

/// Parse a JSON document, panicking on malformed test input
pub fn doc(json: &str) -> Document {
    document_from_json_str(json).unwrap()
}

/// Translator over fresh in-memory collaborators
pub fn translator() -> D2RTranslator {
    D2RTranslator::new(
        "db",
        "coll",
        Arc::new(SequenceAllocator::new()),
        Arc::new(MetaCollection::new("db", "coll")),
        TranslatorConfig::default(),
    )
}

/// Write every document, then read them all back
pub fn round_trip(docs: &[Document]) -> Vec<ReadDocument> {
    let mut d2r = translator();
    d2r.translate_all(docs).unwrap();
    let batches = d2r.finish().into_result_batches();
    R2DTranslator::new(OrphanPolicy::Error)
        .translate(batches)
        .unwrap()
}

/// Round trip one document and assert it comes back equal, field order
/// included
pub fn assert_round_trip(json: &str) {
    let original = doc(json);
    let read = round_trip(std::slice::from_ref(&original));
    assert_eq!(read.len(), 1, "one document expected for {}", json);
    assert_eq!(read[0].document, original, "document changed: {}", json);
}

// ============================================================================
// Collaborators
// ============================================================================

/// Allocator that fails for one doc part
pub struct FailingAllocator {
    pub inner: SequenceAllocator,
    pub fail_on: NestingPath,
}

impl RowIdAllocator for FailingAllocator {
    fn next_row_id(&self, database: &str, collection: &str, path: &NestingPath) -> Result<RowId> {
        if *path == self.fail_on {
            return Err(Error::Allocator(format!("no ids left for '{}'", path)));
        }
        self.inner.next_row_id(database, collection, path)
    }
}
