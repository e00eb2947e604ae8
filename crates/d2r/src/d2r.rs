//! Document to relational translation (write path)
//!
//! [`D2RTranslator`] walks documents depth-first and splits them into rows,
//! one doc part per nesting path:
//!
//! ```text
//! {"_id": 1, "tags": ["a", "b"], "addr": {"city": "X"}}
//!
//! root  did=1 rid=1 pid=1          _id=1 tags=<child:array> addr=<child:doc>
//! tags  did=1 rid=1 pid=1 seq=0    <scalar>="a"
//! tags  did=1 rid=2 pid=1 seq=1    <scalar>="b"
//! addr  did=1 rid=1 pid=1          city="X"
//! ```
//!
//! The document id is the first row id allocated in the root doc part.
//! Each translator owns its accumulator and is used from one thread; many
//! translators may share one allocator and one resolver.

use std::sync::Arc;
use tessera_core::{DocValue, Document, Error, FieldKey, NestingPath, Result, RowId};
use tessera_metainf::{RowIdAllocator, SchemaResolver};
use tracing::{debug, warn};

use crate::collection_data::CollectionData;
use crate::config::TranslatorConfig;
use crate::path_stack::PathStack;
use crate::row::{RowBuilder, RowIds};

/// Counters for one translation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationStats {
    /// Documents translated
    pub documents: u64,
    /// Documents rejected and rolled back
    pub rejected: u64,
    /// Rows produced by translated documents
    pub rows: u64,
}

/// Write-path translator for one collection
pub struct D2RTranslator {
    database: String,
    collection: String,
    allocator: Arc<dyn RowIdAllocator>,
    resolver: Arc<dyn SchemaResolver>,
    config: TranslatorConfig,
    data: CollectionData,
    stats: TranslationStats,
}

impl std::fmt::Debug for D2RTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("D2RTranslator")
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("doc_parts", &self.data.doc_part_count())
            .field("stats", &self.stats)
            .finish()
    }
}

impl D2RTranslator {
    /// Create a translator with an empty accumulator
    pub fn new(
        database: impl Into<String>,
        collection: impl Into<String>,
        allocator: Arc<dyn RowIdAllocator>,
        resolver: Arc<dyn SchemaResolver>,
        config: TranslatorConfig,
    ) -> Self {
        D2RTranslator {
            database: database.into(),
            collection: collection.into(),
            allocator,
            resolver,
            config,
            data: CollectionData::new(),
            stats: TranslationStats::default(),
        }
    }

    /// Translate one document into rows
    ///
    /// Returns the document id. On error nothing of this document stays in
    /// the accumulator.
    ///
    /// # Errors
    ///
    /// - `Error::Limit` if the document exceeds a configured limit
    /// - `Error::Allocator` / `Error::Resolver` from the collaborators
    pub fn translate(&mut self, document: &Document) -> Result<RowId> {
        if let Err(e) = self.config.limits.validate_document(document) {
            self.stats.rejected += 1;
            warn!(target: "tessera::d2r", collection = %self.collection, error = %e, "Document rejected");
            return Err(e.into());
        }

        let checkpoint = self.data.checkpoint();
        let rows_before = self.data.row_count();
        let mut walker = Walker {
            database: &self.database,
            collection: &self.collection,
            allocator: self.allocator.as_ref(),
            resolver: self.resolver.as_ref(),
            data: &mut self.data,
            stack: PathStack::new(),
            did: 0,
        };

        match walker.walk_root(document) {
            Ok(did) => {
                self.stats.documents += 1;
                self.stats.rows += (self.data.row_count() - rows_before) as u64;
                Ok(did)
            }
            Err(e) => {
                self.data.rollback(checkpoint);
                self.stats.rejected += 1;
                warn!(target: "tessera::d2r", collection = %self.collection, error = %e, "Document rolled back");
                Err(e)
            }
        }
    }

    /// Translate many documents, stopping at the first failure
    pub fn translate_all<'d>(&mut self, documents: impl IntoIterator<Item = &'d Document>) -> Result<Vec<RowId>> {
        documents.into_iter().map(|d| self.translate(d)).collect()
    }

    /// Rows produced so far
    pub fn data(&self) -> &CollectionData {
        &self.data
    }

    /// Counters of this pass
    pub fn stats(&self) -> TranslationStats {
        self.stats
    }

    /// End the pass and hand the rows over
    pub fn finish(self) -> CollectionData {
        debug!(
            target: "tessera::d2r",
            database = %self.database,
            collection = %self.collection,
            documents = self.stats.documents,
            rejected = self.stats.rejected,
            rows = self.stats.rows,
            doc_parts = self.data.doc_part_count(),
            "Translation pass finished"
        );
        self.data
    }
}

// ============================================================================
// Walker
// ============================================================================

struct Walker<'a> {
    database: &'a str,
    collection: &'a str,
    allocator: &'a dyn RowIdAllocator,
    resolver: &'a dyn SchemaResolver,
    data: &'a mut CollectionData,
    stack: PathStack,
    did: RowId,
}

impl Walker<'_> {
    fn walk_root(&mut self, document: &Document) -> Result<RowId> {
        self.did = self.next_row_id(&NestingPath::root())?;
        self.walk_document(document)?;
        if !self.stack.is_balanced() {
            return Err(Error::invariant("path stack unbalanced after document"));
        }
        Ok(self.did)
    }

    fn next_row_id(&self, path: &NestingPath) -> Result<RowId> {
        self.allocator
            .next_row_id(self.database, self.collection, path)
    }

    fn parent_rid(&self) -> Result<RowId> {
        self.stack
            .parent_rid()
            .ok_or_else(|| Error::invariant("non-root row without a parent row"))
    }

    /// Sub-document: one row in the doc part of the current path
    fn walk_document(&mut self, document: &Document) -> Result<()> {
        let path = self.stack.path().clone();
        self.data.doc_part_or_create(&path, self.resolver)?;

        let ids = if path.is_root() {
            RowIds::root(self.did)
        } else {
            RowIds {
                did: self.did,
                rid: self.next_row_id(&path)?,
                pid: self.parent_rid()?,
                seq: self.stack.seq(),
            }
        };
        let mut row = RowBuilder::new(ids);

        self.stack.push_row(ids.rid);
        for (name, value) in document.iter() {
            match value {
                DocValue::Scalar(scalar) => row.add_scalar(name, scalar.clone()),
                DocValue::Document(sub) => {
                    row.add_child_marker(FieldKey::named(name), false);
                    self.stack.push_field(name);
                    self.walk_document(sub)?;
                    self.stack.pop()?;
                }
                DocValue::Array(elements) => {
                    row.add_child_marker(FieldKey::named(name), true);
                    self.stack.push_field(name);
                    self.walk_array(elements)?;
                    self.stack.pop()?;
                }
            }
        }
        self.stack.pop()?;

        self.data.push_row(&path, row, self.resolver)
    }

    /// Array: elements share the doc part of the array's path
    fn walk_array(&mut self, elements: &[DocValue]) -> Result<()> {
        self.stack.push_array();
        let path = self.stack.path().clone();
        self.data.doc_part_or_create(&path, self.resolver)?;
        let pid = self.parent_rid()?;

        for (index, element) in elements.iter().enumerate() {
            let seq = u32::try_from(index)
                .map_err(|_| Error::invariant(format!("array index {} out of range", index)))?;
            match element {
                DocValue::Scalar(scalar) => {
                    let ids = self.element_ids(&path, pid, seq)?;
                    let row = RowBuilder::scalar(ids, scalar.clone());
                    self.data.push_row(&path, row, self.resolver)?;
                }
                DocValue::Document(sub) => {
                    self.stack.push_index(seq);
                    self.walk_document(sub)?;
                    self.stack.pop()?;
                }
                DocValue::Array(inner) => {
                    let ids = self.element_ids(&path, pid, seq)?;
                    self.data
                        .push_row(&path, RowBuilder::nested_array(ids), self.resolver)?;
                    self.stack.push_index(seq);
                    self.stack.push_row(ids.rid);
                    self.walk_array(inner)?;
                    self.stack.pop()?;
                    self.stack.pop()?;
                }
            }
        }

        self.stack.pop()
    }

    fn element_ids(&self, path: &NestingPath, pid: RowId, seq: u32) -> Result<RowIds> {
        Ok(RowIds {
            did: self.did,
            rid: self.next_row_id(path)?,
            pid,
            seq: Some(seq),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{ScalarType, ScalarValue};
    use tessera_metainf::{MetaCollection, SequenceAllocator};

    fn translator() -> D2RTranslator {
        D2RTranslator::new(
            "db",
            "coll",
            Arc::new(SequenceAllocator::new()),
            Arc::new(MetaCollection::new("db", "coll")),
            TranslatorConfig::default(),
        )
    }

    fn value_of(data: &CollectionData, path: &NestingPath, row: usize, key: FieldKey, ty: ScalarType) -> Option<ScalarValue> {
        let part = data.doc_part(path)?;
        let pos = part.column_position(&key, ty)?;
        part.rows()[row].value(pos).cloned()
    }

    #[test]
    fn test_first_document_id_is_one() {
        let mut t = translator();
        assert_eq!(t.translate(&Document::new().with("a", 1)).unwrap(), 1);
        assert_eq!(t.translate(&Document::new().with("a", 2)).unwrap(), 2);
        assert_eq!(t.stats().documents, 2);
    }

    #[test]
    fn test_nested_array_rows() {
        // {"m": [1, [2]]}
        let doc = Document::new().with(
            "m",
            vec![DocValue::from(1), DocValue::Array(vec![DocValue::from(2)])],
        );
        let mut t = translator();
        t.translate(&doc).unwrap();
        let data = t.finish();

        let m = NestingPath::root().field("m");
        let m2 = m.child_array_level();
        assert_eq!(data.doc_part_count(), 3);

        let outer = data.doc_part(&m).unwrap();
        assert_eq!(outer.row_count(), 2);
        assert_eq!(
            value_of(&data, &m, 0, FieldKey::Scalar, ScalarType::Integer),
            Some(ScalarValue::Integer(1))
        );
        assert_eq!(
            value_of(&data, &m, 1, FieldKey::Scalar, ScalarType::Child),
            Some(ScalarValue::Boolean(true))
        );

        let marker_rid = outer.rows()[1].ids.rid;
        let inner = data.doc_part(&m2).unwrap();
        assert_eq!(inner.row_count(), 1);
        assert_eq!(inner.rows()[0].ids.pid, marker_rid);
        assert_eq!(inner.rows()[0].ids.seq, Some(0));
    }

    #[test]
    fn test_empty_array_keeps_marker_and_doc_part() {
        let mut t = translator();
        t.translate(&Document::new().with("x", Vec::<DocValue>::new()))
            .unwrap();
        let data = t.finish();
        let x = NestingPath::root().field("x");
        assert_eq!(data.doc_part(&x).unwrap().row_count(), 0);
        assert_eq!(
            value_of(&data, &NestingPath::root(), 0, FieldKey::named("x"), ScalarType::Child),
            Some(ScalarValue::Boolean(true))
        );
    }

    #[test]
    fn test_limit_violation_produces_no_rows() {
        let mut config = TranslatorConfig::default();
        config.limits.max_array_len = 2;
        let mut t = D2RTranslator::new(
            "db",
            "coll",
            Arc::new(SequenceAllocator::new()),
            Arc::new(MetaCollection::new("db", "coll")),
            config,
        );
        let doc = Document::new().with("a", vec![DocValue::from(1), DocValue::from(2), DocValue::from(3)]);
        assert!(matches!(t.translate(&doc), Err(Error::Limit(_))));
        assert!(t.data().is_empty());
        assert_eq!(t.stats().rejected, 1);
    }
}
