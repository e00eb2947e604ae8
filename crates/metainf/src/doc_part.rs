//! Doc part metadata
//!
//! A [`MetaDocPart`] describes one logical table: its nesting path and its
//! declared fields in declaration order. Declaration order is the column
//! order rows are read back in.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tessera_core::{FieldKey, NestingPath, ScalarType};

use crate::resolver::{DocPartId, FieldId};

/// A typed field of a doc part
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetaField {
    /// Handle assigned by the resolver
    pub id: FieldId,
    /// Field key (user name or the scalar pseudo-field)
    pub key: FieldKey,
    /// Column type
    pub ty: ScalarType,
}

impl MetaField {
    /// Whether this column holds a child marker
    pub fn is_child_marker(&self) -> bool {
        self.ty.is_child()
    }
}

impl fmt::Display for MetaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.ty.tag())
    }
}

/// Metadata of one doc part
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaDocPart {
    id: DocPartId,
    path: NestingPath,
    fields: Vec<MetaField>,
    #[serde(skip)]
    index: FxHashMap<(FieldKey, ScalarType), usize>,
}

impl PartialEq for MetaDocPart {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.path == other.path && self.fields == other.fields
    }
}

impl MetaDocPart {
    /// Create a doc part with no fields
    pub fn new(id: DocPartId, path: NestingPath) -> Self {
        MetaDocPart {
            id,
            path,
            fields: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Create a doc part with the given fields, in declaration order
    ///
    /// Duplicate (key, type) pairs keep their first declaration.
    pub fn with_fields(id: DocPartId, path: NestingPath, fields: Vec<MetaField>) -> Self {
        let mut part = MetaDocPart::new(id, path);
        for field in fields {
            let slot = (field.key.clone(), field.ty);
            if !part.index.contains_key(&slot) {
                part.index.insert(slot, part.fields.len());
                part.fields.push(field);
            }
        }
        part
    }

    /// Handle of this doc part
    pub fn id(&self) -> DocPartId {
        self.id
    }

    /// Nesting path of this doc part
    pub fn path(&self) -> &NestingPath {
        &self.path
    }

    /// Whether this is the root doc part
    pub fn is_root(&self) -> bool {
        self.path.is_root()
    }

    /// Declared fields, in declaration order
    pub fn fields(&self) -> &[MetaField] {
        &self.fields
    }

    /// Number of declared fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Find a field by key and type
    pub fn field(&self, key: &FieldKey, ty: ScalarType) -> Option<&MetaField> {
        self.position(key, ty).map(|i| &self.fields[i])
    }

    /// Declaration position of a field
    pub fn position(&self, key: &FieldKey, ty: ScalarType) -> Option<usize> {
        if self.index.len() == self.fields.len() {
            return self.index.get(&(key.clone(), ty)).copied();
        }
        // Deserialized instances have no index
        self.fields
            .iter()
            .position(|f| f.key == *key && f.ty == ty)
    }

    /// Append a field; returns the existing one if already declared
    pub fn add_field(&mut self, id: FieldId, key: FieldKey, ty: ScalarType) -> &MetaField {
        let pos = match self.position(&key, ty) {
            Some(pos) => pos,
            None => {
                let pos = self.fields.len();
                self.index.insert((key.clone(), ty), pos);
                self.fields.push(MetaField { id, key, ty });
                pos
            }
        };
        &self.fields[pos]
    }

    /// All declared types of a user field name
    pub fn types_of(&self, name: &str) -> Vec<ScalarType> {
        self.fields
            .iter()
            .filter(|f| f.key.name() == Some(name))
            .map(|f| f.ty)
            .collect()
    }
}
