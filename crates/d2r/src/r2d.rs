//! Relational to document translation (read path)
//!
//! [`R2DTranslator`] rebuilds documents bottom-up from per-doc-part row
//! batches. Batches must arrive so that every doc part comes before its
//! parent doc part; doc parts of unrelated branches may come in any order.
//!
//! Each non-root row becomes a value buffered for its parent row: a
//! sub-document, or for scalar rows the element value. Buffers are kept per
//! depth, keyed by the row's doc part path and `pid`, and ordered by `seq`.
//! When the parent row is read, each of its child-marker columns claims the
//! buffered values of the child doc part:
//!
//! - `true`: all values, as an array (an empty array if nothing was buffered)
//! - `false`: exactly one value, used as-is
//!
//! A child marker in the scalar pseudo-field claims the array-level child
//! doc part, which is how arrays nested in arrays come back.
//!
//! Fields of a rebuilt sub-document follow the row's written field order,
//! not the doc part's column order. A `seq` at or past the configured
//! `max_array_len` is corruption.

use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use tessera_core::{DocValue, Document, Error, Limits, NestingPath, Result, RowId, ScalarValue};
use tracing::{debug, warn};

use crate::config::{OrphanPolicy, TranslatorConfig};
use crate::result::{DocPartResult, ResultRow};

/// A reconstructed root document
#[derive(Debug, Clone, PartialEq)]
pub struct ReadDocument {
    /// Document id
    pub did: RowId,
    /// The document
    pub document: Document,
}

/// Values buffered for one parent row, indexed by `seq`; gaps are `None`
type Elements = Vec<Option<DocValue>>;

/// Buffered values of one depth, by doc part path and parent row id
#[derive(Debug, Default)]
struct LevelBuffer {
    children: FxHashMap<NestingPath, FxHashMap<RowId, Elements>>,
}

impl LevelBuffer {
    fn orphan_count(&self) -> usize {
        self.children.values().map(|by_pid| by_pid.len()).sum()
    }
}

/// How the assembler reads one column
#[derive(Debug)]
struct Column {
    // None for the scalar pseudo-field
    name: Option<String>,
    // Doc part claimed by a child-marker column
    child_path: Option<NestingPath>,
}

/// Read-path translator
#[derive(Debug)]
pub struct R2DTranslator {
    orphan_policy: OrphanPolicy,
    // Rows with a seq at or past this are corrupt
    max_array_len: usize,
    levels: Vec<LevelBuffer>,
}

impl Default for R2DTranslator {
    fn default() -> Self {
        R2DTranslator::new(OrphanPolicy::default())
    }
}

impl R2DTranslator {
    /// Create a translator with the given orphan handling and default limits
    pub fn new(orphan_policy: OrphanPolicy) -> Self {
        R2DTranslator {
            orphan_policy,
            max_array_len: Limits::default().max_array_len,
            levels: Vec::new(),
        }
    }

    /// Create a translator from configuration
    ///
    /// Arrays read back are bounded by the same `max_array_len` the write
    /// path enforces.
    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self::new(config.r2d.orphan_policy).with_max_array_len(config.limits.max_array_len)
    }

    /// Set the largest array length rows may describe
    pub fn with_max_array_len(mut self, max_array_len: usize) -> Self {
        self.max_array_len = max_array_len;
        self
    }

    /// Rebuild the documents described by `batches`
    ///
    /// Documents come out in the order their root rows were read.
    ///
    /// # Errors
    ///
    /// - `Error::Corruption` if the rows do not describe a valid document tree
    /// - `Error::Cursor` (or any other error) raised by a batch
    pub fn translate<I>(&mut self, batches: I) -> Result<Vec<ReadDocument>>
    where
        I: IntoIterator,
        I::Item: DocPartResult,
    {
        self.reset();
        let result = self.assemble(batches);
        self.reset();
        result
    }

    fn reset(&mut self) {
        for level in &mut self.levels {
            level.children.clear();
        }
    }

    fn assemble<I>(&mut self, batches: I) -> Result<Vec<ReadDocument>>
    where
        I: IntoIterator,
        I::Item: DocPartResult,
    {
        let mut output = Vec::new();
        let mut batch_count = 0usize;
        let mut row_count = 0usize;

        for mut batch in batches {
            batch_count += 1;
            let path = batch.meta_doc_part().path().clone();
            let columns = columns_of(&batch);
            let mut produced: FxHashMap<RowId, Elements> = FxHashMap::default();

            while let Some(row) = batch.next_row()? {
                row_count += 1;
                self.read_row(&path, &columns, row, &mut produced, &mut output)?;
            }
            self.store(path, produced)?;
        }

        self.check_orphans()?;
        debug!(
            target: "tessera::r2d",
            batches = batch_count,
            rows = row_count,
            documents = output.len(),
            "Assembled documents"
        );
        Ok(output)
    }

    fn read_row(
        &mut self,
        path: &NestingPath,
        columns: &[Column],
        row: ResultRow,
        produced: &mut FxHashMap<RowId, Elements>,
        output: &mut Vec<ReadDocument>,
    ) -> Result<()> {
        let did = row
            .did
            .ok_or_else(|| Error::corruption(format!("row of doc part '{}' without did", path)))?;
        let rid = row.rid.ok_or_else(|| {
            Error::corruption(format!("row of doc part '{}' (did {}) without rid", path, did))
        })?;
        if row.values.len() > columns.len() {
            return Err(Error::corruption(format!(
                "row {} of doc part '{}' has {} values for {} columns",
                rid,
                path,
                row.values.len(),
                columns.len()
            )));
        }

        let order = read_order(&row.field_order, columns.len())
            .map_err(|msg| Error::corruption(format!("row {} of doc part '{}': {}", rid, path, msg)))?;
        let mut values = row.values;
        values.resize(columns.len(), None);

        let mut document = Document::with_capacity(order.len());
        let mut scalar: Option<DocValue> = None;
        for pos in order {
            let Some(value) = values[pos].take() else { continue };
            let column = &columns[pos];
            let value = match &column.child_path {
                None => DocValue::Scalar(value),
                Some(child_path) => {
                    let is_array = match value {
                        ScalarValue::Boolean(b) => b,
                        other => {
                            return Err(Error::corruption(format!(
                                "child marker of row {} in doc part '{}' holds {}",
                                rid,
                                path,
                                other.scalar_type()
                            )))
                        }
                    };
                    self.claim_children(child_path, rid, is_array)?
                }
            };
            match &column.name {
                Some(name) => {
                    document.insert(name.as_str(), value);
                }
                None => {
                    if scalar.replace(value).is_some() {
                        return Err(Error::corruption(format!(
                            "row {} of doc part '{}' has more than one scalar value",
                            rid, path
                        )));
                    }
                }
            }
        }

        if path.is_root() {
            if scalar.is_some() {
                return Err(Error::corruption(format!("scalar row {} in the root doc part", rid)));
            }
            if rid != did || row.pid.is_some_and(|pid| pid != did) || row.seq.is_some() {
                return Err(Error::corruption(format!(
                    "root row {} has ids (did {}, pid {:?}, seq {:?})",
                    rid, did, row.pid, row.seq
                )));
            }
            output.push(ReadDocument { did, document });
            return Ok(());
        }

        let pid = row.pid.ok_or_else(|| {
            Error::corruption(format!("row {} of doc part '{}' without pid", rid, path))
        })?;
        let value = match scalar {
            Some(value) => {
                if !document.is_empty() {
                    return Err(Error::corruption(format!(
                        "row {} of doc part '{}' mixes a scalar value with fields",
                        rid, path
                    )));
                }
                if row.seq.is_none() {
                    return Err(Error::corruption(format!(
                        "scalar row {} of doc part '{}' without seq",
                        rid, path
                    )));
                }
                value
            }
            None => DocValue::Document(document),
        };
        place(produced.entry(pid).or_default(), row.seq, value, self.max_array_len)
            .map_err(|msg| Error::corruption(format!("doc part '{}', pid {}: {}", path, pid, msg)))
    }

    /// Take the values buffered for `rid` in the doc part at `child_path`
    fn claim_children(&mut self, child_path: &NestingPath, rid: RowId, is_array: bool) -> Result<DocValue> {
        let elements = self
            .levels
            .get_mut(child_path.depth())
            .and_then(|level| level.children.get_mut(child_path))
            .and_then(|by_pid| by_pid.remove(&rid));

        if is_array {
            let elements = elements.unwrap_or_default();
            return Ok(DocValue::Array(
                elements
                    .into_iter()
                    .map(|e| e.unwrap_or_else(DocValue::null))
                    .collect(),
            ));
        }

        let mut elements = elements.ok_or_else(|| {
            Error::corruption(format!(
                "row {} has a sub-document at '{}' but no child row",
                rid, child_path
            ))
        })?;
        match (elements.pop(), elements.is_empty()) {
            (Some(Some(value)), true) => Ok(value),
            _ => Err(Error::corruption(format!(
                "row {} has a sub-document at '{}' but several child rows",
                rid, child_path
            ))),
        }
    }

    /// Move the values a batch produced into the buffer of its depth
    fn store(&mut self, path: NestingPath, produced: FxHashMap<RowId, Elements>) -> Result<()> {
        if produced.is_empty() {
            return Ok(());
        }
        let depth = path.depth();
        if self.levels.len() <= depth {
            self.levels.resize_with(depth + 1, LevelBuffer::default);
        }
        let max_array_len = self.max_array_len;
        let by_pid = self.levels[depth].children.entry(path.clone()).or_default();
        for (pid, elements) in produced {
            match by_pid.entry(pid) {
                Entry::Vacant(slot) => {
                    slot.insert(elements);
                }
                Entry::Occupied(mut slot) => {
                    // Same doc part split over several batches
                    for (index, value) in elements.into_iter().enumerate() {
                        let Some(value) = value else { continue };
                        u32::try_from(index)
                            .map_err(|_| format!("seq {} out of range", index))
                            .and_then(|seq| place(slot.get_mut(), Some(seq), value, max_array_len))
                            .map_err(|msg| {
                                Error::corruption(format!("doc part '{}', pid {}: {}", path, pid, msg))
                            })?;
                    }
                }
            }
        }
        Ok(())
    }

    fn check_orphans(&self) -> Result<()> {
        let orphans: usize = self.levels.iter().map(LevelBuffer::orphan_count).sum();
        if orphans == 0 {
            return Ok(());
        }
        match self.orphan_policy {
            OrphanPolicy::Ignore => Ok(()),
            OrphanPolicy::Warn => {
                for level in &self.levels {
                    for (path, by_pid) in &level.children {
                        if !by_pid.is_empty() {
                            warn!(
                                target: "tessera::r2d",
                                doc_part = %path,
                                parents = by_pid.len(),
                                "Dropping rows with no parent row"
                            );
                        }
                    }
                }
                Ok(())
            }
            OrphanPolicy::Error => Err(Error::corruption(format!(
                "{} parent rows referenced by child rows were never read",
                orphans
            ))),
        }
    }
}

fn columns_of(batch: &impl DocPartResult) -> Vec<Column> {
    let meta = batch.meta_doc_part();
    let path = meta.path();
    meta.fields()
        .iter()
        .map(|field| Column {
            name: field.key.name().map(str::to_owned),
            child_path: field.is_child_marker().then(|| match field.key.name() {
                Some(name) => path.child_field(name),
                None => path.child_array_level(),
            }),
        })
        .collect()
}

/// Column positions in reading order: the written order first, then every
/// position it leaves out in declared order
fn read_order(field_order: &[u32], width: usize) -> std::result::Result<Vec<usize>, String> {
    let mut seen = vec![false; width];
    let mut order = Vec::with_capacity(width);
    for &position in field_order {
        let pos = usize::try_from(position).map_err(|_| format!("field position {} out of range", position))?;
        match seen.get_mut(pos) {
            None => return Err(format!("field position {} past {} columns", position, width)),
            Some(true) => return Err(format!("field position {} listed twice", position)),
            Some(slot) => *slot = true,
        }
        order.push(pos);
    }
    order.extend((0..width).filter(|&pos| !seen[pos]));
    Ok(order)
}

/// Put `value` at `seq`, or append it for rows outside arrays
fn place(
    elements: &mut Elements,
    seq: Option<u32>,
    value: DocValue,
    max_array_len: usize,
) -> std::result::Result<(), String> {
    let Some(seq) = seq else {
        elements.push(Some(value));
        return Ok(());
    };
    let index = usize::try_from(seq).map_err(|_| format!("seq {} out of range", seq))?;
    if index >= max_array_len {
        return Err(format!(
            "seq {} exceeds the array length limit of {}",
            seq, max_array_len
        ));
    }
    if elements.len() <= index {
        elements.resize(index + 1, None);
    }
    if elements[index].replace(value).is_some() {
        return Err(format!("seq {} appears twice", seq));
    }
    Ok(())
}
