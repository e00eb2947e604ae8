//! Row source contract for the read path
//!
//! A storage layer answers a query with one [`DocPartResult`] per doc part.
//! Each yields rows carrying the four structural identifiers, the raw
//! column values in the doc part's declared field order, and the order the
//! row's fields were written in. Identifiers are
//! optional here because they come from storage: a missing one is reported
//! as corruption by the assembler, not assumed away.
//!
//! [`DocPartResultBatch`] is the in-memory implementation, also used to feed
//! write-path output straight back into the read path.

use tessera_core::{NestingPath, Result, RowId, ScalarValue};
use tessera_metainf::MetaDocPart;

use crate::doc_part_data::DocPartData;

/// One row as read back from storage
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// Owning document id
    pub did: Option<RowId>,
    /// Row id
    pub rid: Option<RowId>,
    /// Parent row id
    pub pid: Option<RowId>,
    /// Array position
    pub seq: Option<u32>,
    /// Column values in declared field order; `None` is an absent value
    pub values: Vec<Option<ScalarValue>>,
    /// Column positions in the order the row's fields were written
    ///
    /// Positions left out follow in declared order, so an empty list reads
    /// the row in declared order.
    pub field_order: Vec<u32>,
}

impl ResultRow {
    /// Row with every identifier present, read in declared field order
    pub fn new(did: RowId, rid: RowId, pid: RowId, seq: Option<u32>, values: Vec<Option<ScalarValue>>) -> Self {
        ResultRow {
            did: Some(did),
            rid: Some(rid),
            pid: Some(pid),
            seq,
            values,
            field_order: Vec::new(),
        }
    }

    /// Set the written field order
    pub fn with_field_order(mut self, field_order: Vec<u32>) -> Self {
        self.field_order = field_order;
        self
    }
}

/// Rows of one doc part
pub trait DocPartResult {
    /// Doc part the rows belong to, with its fields in column order
    fn meta_doc_part(&self) -> &MetaDocPart;

    /// Next row, or None at the end of the batch
    ///
    /// # Errors
    ///
    /// Cursor failures are reported as `Error::Cursor` and abort the read.
    fn next_row(&mut self) -> Result<Option<ResultRow>>;
}

impl<T: DocPartResult + ?Sized> DocPartResult for Box<T> {
    fn meta_doc_part(&self) -> &MetaDocPart {
        (**self).meta_doc_part()
    }

    fn next_row(&mut self) -> Result<Option<ResultRow>> {
        (**self).next_row()
    }
}

/// In-memory batch of rows for one doc part
#[derive(Debug, Clone)]
pub struct DocPartResultBatch {
    meta: MetaDocPart,
    rows: std::vec::IntoIter<ResultRow>,
}

impl DocPartResultBatch {
    /// Batch over the given rows
    pub fn new(meta: MetaDocPart, rows: Vec<ResultRow>) -> Self {
        DocPartResultBatch {
            meta,
            rows: rows.into_iter(),
        }
    }

    /// Batch over the rows a write pass produced, padded to full width
    pub fn from_doc_part(data: DocPartData) -> Self {
        let (meta, rows) = data.into_parts();
        let width = meta.field_count();
        let rows = rows
            .into_iter()
            .map(|row| {
                let values = row.padded_values(width).map(|v| v.cloned()).collect();
                ResultRow::new(row.ids.did, row.ids.rid, row.ids.pid, row.ids.seq, values)
                    .with_field_order(row.field_order().to_vec())
            })
            .collect();
        DocPartResultBatch::new(meta, rows)
    }

    /// Nesting path of the batch
    pub fn path(&self) -> &NestingPath {
        self.meta.path()
    }

    /// Rows not yet read
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl DocPartResult for DocPartResultBatch {
    fn meta_doc_part(&self) -> &MetaDocPart {
        &self.meta
    }

    fn next_row(&mut self) -> Result<Option<ResultRow>> {
        Ok(self.rows.next())
    }
}
