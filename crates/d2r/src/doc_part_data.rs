//! Per-doc-part table builder
//!
//! One [`DocPartData`] collects the rows a translation pass produces for one
//! nesting path. Columns are declared on first use, in encounter order, and
//! each is resolved against the schema exactly once per pass.

use rustc_hash::FxHashMap;
use tessera_core::{Error, FieldKey, NestingPath, Result, ScalarType, ScalarValue};
use tessera_metainf::{DocPartId, MetaDocPart, MetaField, SchemaResolver};

use crate::row::{DocPartRow, RowBuilder};

/// Rows and columns of one doc part
#[derive(Debug, Clone)]
pub struct DocPartData {
    id: DocPartId,
    path: NestingPath,
    columns: Vec<MetaField>,
    column_index: FxHashMap<(FieldKey, ScalarType), usize>,
    rows: Vec<DocPartRow>,
}

impl DocPartData {
    pub(crate) fn new(id: DocPartId, path: NestingPath) -> Self {
        DocPartData {
            id,
            path,
            columns: Vec::new(),
            column_index: FxHashMap::default(),
            rows: Vec::new(),
        }
    }

    /// Resolver handle of this doc part
    pub fn id(&self) -> DocPartId {
        self.id
    }

    /// Nesting path
    pub fn path(&self) -> &NestingPath {
        &self.path
    }

    /// Columns declared during this pass, in declaration order
    pub fn columns(&self) -> &[MetaField] {
        &self.columns
    }

    /// Number of declared columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column
    pub fn column_position(&self, key: &FieldKey, ty: ScalarType) -> Option<usize> {
        self.column_index.get(&(key.clone(), ty)).copied()
    }

    /// Rows in production order
    pub fn rows(&self) -> &[DocPartRow] {
        &self.rows
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows with values padded to the full column list
    pub fn padded_rows(&self) -> impl Iterator<Item = (&DocPartRow, Vec<Option<&ScalarValue>>)> {
        let width = self.columns.len();
        self.rows
            .iter()
            .map(move |row| (row, row.padded_values(width).collect()))
    }

    /// Schema view of this doc part, with the columns of this pass
    pub fn meta_doc_part(&self) -> MetaDocPart {
        MetaDocPart::with_fields(self.id, self.path.clone(), self.columns.clone())
    }

    /// Seal a row into this doc part
    pub(crate) fn append(&mut self, row: RowBuilder, resolver: &dyn SchemaResolver) -> Result<()> {
        let (ids, entries) = row.into_parts();
        let mut values: Vec<Option<ScalarValue>> = Vec::with_capacity(entries.len());
        let mut field_order = Vec::with_capacity(entries.len());
        for (key, ty, value) in entries {
            if key.is_scalar() && self.path.is_root() {
                return Err(Error::invariant("scalar row in the root doc part"));
            }
            let pos = self.column_for(key, ty, resolver)?;
            let position = u32::try_from(pos)
                .map_err(|_| Error::invariant(format!("column {} of doc part '{}' out of range", pos, self.path)))?;
            field_order.push(position);
            if values.len() <= pos {
                values.resize(pos + 1, None);
            }
            if values[pos].replace(value).is_some() {
                return Err(Error::invariant(format!(
                    "row {} of doc part '{}' sets column {} twice",
                    ids.rid, self.path, self.columns[pos]
                )));
            }
        }
        self.rows.push(DocPartRow::new(ids, values, field_order));
        Ok(())
    }

    fn column_for(&mut self, key: FieldKey, ty: ScalarType, resolver: &dyn SchemaResolver) -> Result<usize> {
        let slot = (key, ty);
        if let Some(&pos) = self.column_index.get(&slot) {
            return Ok(pos);
        }
        let id = resolver.resolve_field(self.id, &slot.0, ty)?;
        let pos = self.columns.len();
        self.columns.push(MetaField {
            id,
            key: slot.0.clone(),
            ty,
        });
        self.column_index.insert(slot, pos);
        Ok(pos)
    }

    pub(crate) fn truncate(&mut self, rows: usize, columns: usize) {
        self.rows.truncate(rows);
        for dropped in self.columns.drain(columns..) {
            self.column_index.remove(&(dropped.key, dropped.ty));
        }
    }

    pub(crate) fn into_parts(self) -> (MetaDocPart, Vec<DocPartRow>) {
        let meta = MetaDocPart::with_fields(self.id, self.path, self.columns);
        (meta, self.rows)
    }
}
