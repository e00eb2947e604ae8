//! Per-pass accumulator of doc parts
//!
//! [`CollectionData`] owns one [`DocPartData`] per nesting path met during a
//! translation pass, created lazily on first encounter. It is the hand-off
//! to persistence: [`CollectionData::doc_parts`] yields parents before their
//! children, so tables can be created and filled top-down.
//!
//! Documents are added atomically. The translator takes a [`Checkpoint`]
//! before each document and rolls back to it if the walk fails.

use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use tessera_core::{Error, NestingPath, Result};
use tessera_metainf::SchemaResolver;

use crate::doc_part_data::DocPartData;
use crate::result::DocPartResultBatch;
use crate::row::RowBuilder;

/// Size of the accumulator at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Checkpoint {
    doc_parts: usize,
    // (rows, columns) of each doc part that existed
    sizes: Vec<(usize, usize)>,
}

/// Doc parts produced by one translation pass
#[derive(Debug, Clone, Default)]
pub struct CollectionData {
    parts: Vec<DocPartData>,
    by_path: FxHashMap<NestingPath, usize>,
}

impl CollectionData {
    /// Empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Doc part at `path`, resolving and creating it on first encounter
    pub(crate) fn doc_part_or_create(
        &mut self,
        path: &NestingPath,
        resolver: &dyn SchemaResolver,
    ) -> Result<&mut DocPartData> {
        let index = match self.by_path.get(path) {
            Some(&index) => index,
            None => {
                let id = resolver.resolve_or_create_doc_part(path)?;
                let index = self.parts.len();
                self.parts.push(DocPartData::new(id, path.clone()));
                self.by_path.insert(path.clone(), index);
                index
            }
        };
        Ok(&mut self.parts[index])
    }

    /// Seal a row into the doc part at `path`
    ///
    /// The doc part must have been created for this pass already.
    pub(crate) fn push_row(
        &mut self,
        path: &NestingPath,
        row: RowBuilder,
        resolver: &dyn SchemaResolver,
    ) -> Result<()> {
        let index = *self.by_path.get(path).ok_or_else(|| {
            Error::invariant(format!("row {} for unknown doc part '{}'", row.ids().rid, path))
        })?;
        self.parts[index].append(row, resolver)
    }

    /// Doc part at `path`, if met during this pass
    pub fn doc_part(&self, path: &NestingPath) -> Option<&DocPartData> {
        self.by_path.get(path).map(|&i| &self.parts[i])
    }

    /// Doc parts ordered parent-first
    ///
    /// Ascending depth; doc parts at the same depth keep encounter order.
    pub fn doc_parts(&self) -> impl Iterator<Item = &DocPartData> {
        let mut ordered: Vec<&DocPartData> = self.parts.iter().collect();
        ordered.sort_by_key(|p| p.path().depth());
        ordered.into_iter()
    }

    /// Number of doc parts
    pub fn doc_part_count(&self) -> usize {
        self.parts.len()
    }

    /// Number of rows over all doc parts
    pub fn row_count(&self) -> usize {
        self.parts.iter().map(|p| p.row_count()).sum()
    }

    /// Whether no doc part was met
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Take the doc parts, parent-first
    pub fn into_doc_parts(self) -> Vec<DocPartData> {
        let mut parts = self.parts;
        parts.sort_by_key(|p| p.path().depth());
        parts
    }

    /// Turn the doc parts into read-path batches, deepest first
    ///
    /// This is the order the read path needs: children are buffered before
    /// the parents that claim them.
    pub fn into_result_batches(self) -> Vec<DocPartResultBatch> {
        let mut parts = self.parts;
        parts.sort_by_key(|p| Reverse(p.path().depth()));
        parts
            .into_iter()
            .map(DocPartResultBatch::from_doc_part)
            .collect()
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            doc_parts: self.parts.len(),
            sizes: self
                .parts
                .iter()
                .map(|p| (p.row_count(), p.column_count()))
                .collect(),
        }
    }

    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        for dropped in self.parts.drain(checkpoint.doc_parts..) {
            self.by_path.remove(dropped.path());
        }
        for (part, (rows, columns)) in self.parts.iter_mut().zip(checkpoint.sizes) {
            part.truncate(rows, columns);
        }
    }
}
