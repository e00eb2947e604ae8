//! Rows of a doc part
//!
//! A [`RowBuilder`] collects the values of one row while the walker is still
//! below it. Sealing it in the accumulator turns the (key, type) pairs into
//! column positions and yields a [`DocPartRow`].

use tessera_core::{FieldKey, RowId, ScalarType, ScalarValue};

/// Structural identifiers of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowIds {
    /// Owning root document id
    pub did: RowId,
    /// Row id, unique within the doc part
    pub rid: RowId,
    /// Parent row id (the document id for root rows)
    pub pid: RowId,
    /// Position in the enclosing array, None outside arrays
    pub seq: Option<u32>,
}

impl RowIds {
    /// Ids of a root row: rid and pid are the document id
    pub fn root(did: RowId) -> Self {
        RowIds {
            did,
            rid: did,
            pid: did,
            seq: None,
        }
    }

    /// Whether these ids describe a root row
    pub fn is_root(&self) -> bool {
        self.rid == self.did && self.pid == self.did && self.seq.is_none()
    }
}

/// Row under construction
#[derive(Debug, Clone)]
pub struct RowBuilder {
    ids: RowIds,
    values: Vec<(FieldKey, ScalarType, ScalarValue)>,
}

impl RowBuilder {
    /// Start a row
    pub fn new(ids: RowIds) -> Self {
        RowBuilder {
            ids,
            values: Vec::new(),
        }
    }

    /// Start a scalar row holding one array element
    pub fn scalar(ids: RowIds, value: ScalarValue) -> Self {
        let mut row = RowBuilder::new(ids);
        row.values.push((FieldKey::Scalar, value.scalar_type(), value));
        row
    }

    /// Start a scalar row for an array nested in an array element
    pub fn nested_array(ids: RowIds) -> Self {
        let mut row = RowBuilder::new(ids);
        row.add_child_marker(FieldKey::Scalar, true);
        row
    }

    /// Structural identifiers
    pub fn ids(&self) -> &RowIds {
        &self.ids
    }

    /// Set a scalar field
    pub fn add_scalar(&mut self, name: &str, value: ScalarValue) {
        self.values.push((FieldKey::named(name), value.scalar_type(), value));
    }

    /// Record whether a field holds an array (`true`) or one sub-document
    pub fn add_child_marker(&mut self, key: FieldKey, is_array: bool) {
        self.values.push((key, ScalarType::Child, ScalarValue::Boolean(is_array)));
    }

    /// Set values in insertion order, with their column type
    ///
    /// Child markers carry a boolean value in a `Child` column.
    pub fn entries(&self) -> impl Iterator<Item = (&FieldKey, ScalarType, &ScalarValue)> {
        self.values.iter().map(|(key, ty, value)| (key, *ty, value))
    }

    /// Number of set values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no value is set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn into_parts(self) -> (RowIds, Vec<(FieldKey, ScalarType, ScalarValue)>) {
        (self.ids, self.values)
    }
}

/// A sealed row
///
/// `values` is indexed by column position. It may be shorter than the doc
/// part's column list when later rows declared more columns; missing
/// positions read as `None`. `field_order` lists the set positions in the
/// order the fields appeared in the document, which can differ from column
/// order when rows of one doc part spell their fields differently.
#[derive(Debug, Clone, PartialEq)]
pub struct DocPartRow {
    /// Structural identifiers
    pub ids: RowIds,
    values: Vec<Option<ScalarValue>>,
    field_order: Vec<u32>,
}

impl DocPartRow {
    pub(crate) fn new(ids: RowIds, values: Vec<Option<ScalarValue>>, field_order: Vec<u32>) -> Self {
        DocPartRow {
            ids,
            values,
            field_order,
        }
    }

    /// Column positions of the set values, in document field order
    pub fn field_order(&self) -> &[u32] {
        &self.field_order
    }

    /// Value at column position `column`
    pub fn value(&self, column: usize) -> Option<&ScalarValue> {
        self.values.get(column).and_then(|v| v.as_ref())
    }

    /// Values padded to `width` columns
    pub fn padded_values(&self, width: usize) -> impl Iterator<Item = Option<&ScalarValue>> {
        (0..width).map(move |i| self.value(i))
    }

    /// Number of non-absent values
    pub fn value_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}
