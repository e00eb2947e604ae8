//! In-memory collection schema
//!
//! [`MetaCollection`] is the reference [`SchemaResolver`]: it keeps every doc
//! part of one collection behind a single lock and hands out sequential
//! handles. Storage backends that persist their schema can seed it with
//! [`MetaCollection::from_doc_parts`].
//!
//! Handles are dense: `DocPartId(n)` and `FieldId(n)` index the internal
//! tables directly.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tessera_core::{Error, FieldKey, NestingPath, Result, ScalarType};
use tracing::debug;

use crate::doc_part::MetaDocPart;
use crate::resolver::{DocPartId, FieldId, SchemaResolver};

#[derive(Debug, Default)]
struct Inner {
    by_path: FxHashMap<NestingPath, DocPartId>,
    doc_parts: Vec<MetaDocPart>,
    next_field: u32,
}

impl Inner {
    fn next_doc_part_id(&self) -> Result<DocPartId> {
        doc_part_id(self.doc_parts.len())
    }

    fn field_candidate(&self) -> Result<FieldId> {
        // u32::MAX stays unused so the counter can always move past a handle
        if self.next_field == u32::MAX {
            return Err(Error::Resolver("field handles exhausted".to_string()));
        }
        Ok(FieldId(self.next_field))
    }

    fn part_mut(&mut self, id: DocPartId) -> Result<&mut MetaDocPart> {
        self.doc_parts
            .get_mut(id.0 as usize)
            .ok_or_else(|| Error::Resolver(format!("unknown doc part {}", id)))
    }
}

fn doc_part_id(index: usize) -> Result<DocPartId> {
    u32::try_from(index)
        .map(DocPartId)
        .map_err(|_| Error::Resolver(format!("doc part handle {} out of range", index)))
}

/// Schema of one collection
#[derive(Debug)]
pub struct MetaCollection {
    database: String,
    name: String,
    inner: RwLock<Inner>,
}

impl MetaCollection {
    /// Create an empty collection schema
    pub fn new(database: impl Into<String>, name: impl Into<String>) -> Self {
        MetaCollection {
            database: database.into(),
            name: name.into(),
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Rebuild a schema from doc parts persisted elsewhere
    ///
    /// Doc parts are renumbered densely in the order given; field handles
    /// are renumbered too, keeping each doc part's declaration order.
    pub fn from_doc_parts(
        database: impl Into<String>,
        name: impl Into<String>,
        parts: impl IntoIterator<Item = MetaDocPart>,
    ) -> Result<Self> {
        let collection = MetaCollection::new(database, name);
        {
            let mut inner = collection.inner.write();
            for part in parts {
                if inner.by_path.contains_key(part.path()) {
                    return Err(Error::Resolver(format!(
                        "doc part '{}' declared twice",
                        part.path()
                    )));
                }
                let id = inner.next_doc_part_id()?;
                let mut rebuilt = MetaDocPart::new(id, part.path().clone());
                for field in part.fields() {
                    let field_id = inner.field_candidate()?;
                    inner.next_field += 1;
                    rebuilt.add_field(field_id, field.key.clone(), field.ty);
                }
                inner.by_path.insert(rebuilt.path().clone(), id);
                inner.doc_parts.push(rebuilt);
            }
        }
        Ok(collection)
    }

    /// Database name
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the doc part at `path`
    pub fn doc_part(&self, path: &NestingPath) -> Option<MetaDocPart> {
        let inner = self.inner.read();
        inner
            .by_path
            .get(path)
            .map(|id| inner.doc_parts[id.0 as usize].clone())
    }

    /// Snapshot of the doc part with handle `id`
    pub fn doc_part_by_id(&self, id: DocPartId) -> Option<MetaDocPart> {
        self.inner.read().doc_parts.get(id.0 as usize).cloned()
    }

    /// Snapshot of every doc part, in creation order
    ///
    /// Creation order is parent-first: a doc part is only ever created while
    /// walking below its parent.
    pub fn doc_parts(&self) -> Vec<MetaDocPart> {
        self.inner.read().doc_parts.clone()
    }

    /// Number of doc parts
    pub fn doc_part_count(&self) -> usize {
        self.inner.read().doc_parts.len()
    }
}

impl SchemaResolver for MetaCollection {
    fn resolve_or_create_doc_part(&self, path: &NestingPath) -> Result<DocPartId> {
        if let Some(id) = self.inner.read().by_path.get(path) {
            return Ok(*id);
        }

        let mut inner = self.inner.write();
        // Another writer may have created it between the two locks
        if let Some(id) = inner.by_path.get(path) {
            return Ok(*id);
        }
        let id = inner.next_doc_part_id()?;
        inner.doc_parts.push(MetaDocPart::new(id, path.clone()));
        inner.by_path.insert(path.clone(), id);
        debug!(
            target: "tessera::metainf",
            database = %self.database,
            collection = %self.name,
            doc_part = %path,
            id = id.0,
            "Created doc part"
        );
        Ok(id)
    }

    fn resolve_field(&self, doc_part: DocPartId, key: &FieldKey, ty: ScalarType) -> Result<FieldId> {
        {
            let inner = self.inner.read();
            let part = inner
                .doc_parts
                .get(doc_part.0 as usize)
                .ok_or_else(|| Error::Resolver(format!("unknown doc part {}", doc_part)))?;
            if let Some(field) = part.field(key, ty) {
                return Ok(field.id);
            }
        }

        let mut inner = self.inner.write();
        let candidate = inner.field_candidate()?;
        let part = inner.part_mut(doc_part)?;
        let field_id = part.add_field(candidate, key.clone(), ty).id;
        if field_id == candidate {
            debug!(
                target: "tessera::metainf",
                collection = %self.name,
                doc_part = %part.path(),
                field = %key,
                ty = %ty,
                "Created field"
            );
            inner.next_field += 1;
        }
        Ok(field_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_doc_part_is_created_once() {
        let coll = MetaCollection::new("db", "coll");
        let path = NestingPath::root().field("a");
        let first = coll.resolve_or_create_doc_part(&path).unwrap();
        let second = coll.resolve_or_create_doc_part(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(coll.doc_part_count(), 1);
        assert_eq!(coll.doc_part(&path).unwrap().path(), &path);
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        let coll = MetaCollection::new("db", "coll");
        let root = coll.resolve_or_create_doc_part(&NestingPath::root()).unwrap();
        let b = coll
            .resolve_field(root, &FieldKey::named("b"), ScalarType::Integer)
            .unwrap();
        let a = coll
            .resolve_field(root, &FieldKey::named("a"), ScalarType::String)
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(
            coll.resolve_field(root, &FieldKey::named("b"), ScalarType::Integer)
                .unwrap(),
            b
        );

        let part = coll.doc_part(&NestingPath::root()).unwrap();
        let keys: Vec<_> = part.fields().iter().map(|f| f.key.clone()).collect();
        assert_eq!(keys, vec![FieldKey::named("b"), FieldKey::named("a")]);
    }

    #[test]
    fn test_unknown_doc_part_is_a_resolver_error() {
        let coll = MetaCollection::new("db", "coll");
        let result = coll.resolve_field(DocPartId(7), &FieldKey::Scalar, ScalarType::Null);
        assert!(matches!(result, Err(Error::Resolver(_))));
    }

    #[test]
    fn test_exhausted_field_handles_are_a_resolver_error() {
        let coll = MetaCollection::new("db", "coll");
        let root = coll.resolve_or_create_doc_part(&NestingPath::root()).unwrap();
        coll.inner.write().next_field = u32::MAX - 1;

        let last = coll
            .resolve_field(root, &FieldKey::named("a"), ScalarType::Integer)
            .unwrap();
        assert_eq!(last, FieldId(u32::MAX - 1));
        let result = coll.resolve_field(root, &FieldKey::named("b"), ScalarType::Integer);
        assert!(matches!(result, Err(Error::Resolver(_))));
        assert_eq!(coll.doc_part(&NestingPath::root()).unwrap().field_count(), 1);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_doc_part_handle_out_of_range() {
        assert_eq!(doc_part_id(3).unwrap(), DocPartId(3));
        assert_eq!(doc_part_id(u32::MAX as usize).unwrap(), DocPartId(u32::MAX));
        assert!(matches!(
            doc_part_id(u32::MAX as usize + 1),
            Err(Error::Resolver(_))
        ));
    }

    #[test]
    fn test_from_doc_parts_renumbers() {
        let source = MetaCollection::new("db", "coll");
        let root = source
            .resolve_or_create_doc_part(&NestingPath::root())
            .unwrap();
        source
            .resolve_field(root, &FieldKey::named("x"), ScalarType::Child)
            .unwrap();
        let a = source
            .resolve_or_create_doc_part(&NestingPath::root().field("x"))
            .unwrap();
        source
            .resolve_field(a, &FieldKey::Scalar, ScalarType::Long)
            .unwrap();

        let rebuilt = MetaCollection::from_doc_parts("db", "coll", source.doc_parts()).unwrap();
        assert_eq!(rebuilt.doc_parts(), source.doc_parts());

        let dup = vec![
            MetaDocPart::new(DocPartId(0), NestingPath::root()),
            MetaDocPart::new(DocPartId(1), NestingPath::root()),
        ];
        assert!(MetaCollection::from_doc_parts("db", "coll", dup).is_err());
    }

    #[test]
    fn test_concurrent_resolution_agrees() {
        let coll = Arc::new(MetaCollection::new("db", "coll"));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let coll = Arc::clone(&coll);
                thread::spawn(move || {
                    let mut ids = Vec::new();
                    for name in ["a", "b", "c", "d"] {
                        let part = coll
                            .resolve_or_create_doc_part(&NestingPath::root().field(name))
                            .unwrap();
                        let field = coll
                            .resolve_field(part, &FieldKey::Scalar, ScalarType::Integer)
                            .unwrap();
                        ids.push((part, field));
                    }
                    ids
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for r in &results[1..] {
            assert_eq!(r, &results[0]);
        }
        assert_eq!(coll.doc_part_count(), 4);
    }
}
