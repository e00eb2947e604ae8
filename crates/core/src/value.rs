//! Value types for Tessera documents
//!
//! This module defines:
//! - [`ScalarValue`]: a typed leaf value (including an explicit null)
//! - [`ScalarType`]: the type tag of a scalar, plus the structural `Child` type
//! - [`DocValue`]: the document value model, one of scalar, array or sub-document
//!
//! ## Type Rules
//!
//! - Different scalar types are NEVER equal: `Integer(1) != Long(1)`
//! - `Binary` is not `String`
//! - `Double` uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`
//! - `Null` is a value, not the absence of one

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::Document;

/// Length of an object id in bytes
pub const OBJECT_ID_LEN: usize = 12;

/// Scalar type of a stored column
///
/// Every column of a doc part is typed. A field name may appear with several
/// types across documents; each type gets its own column.
///
/// `Child` is not a user-visible type. Columns of that type hold the child
/// marker of a field: `true` when the field reconstructs as an array of child
/// rows, `false` when it reconstructs as a single sub-document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScalarType {
    /// Explicit null
    Null,
    /// Boolean
    Boolean,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Long,
    /// 64-bit floating point
    Double,
    /// UTF-8 string
    String,
    /// Raw bytes
    Binary,
    /// UTC instant, millisecond precision
    Instant,
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// 12-byte object id
    ObjectId,
    /// Replication timestamp (seconds + ordinal)
    Timestamp,
    /// Child marker
    Child,
}

impl ScalarType {
    /// All scalar types, in tag order
    pub const ALL: [ScalarType; 13] = [
        ScalarType::Null,
        ScalarType::Boolean,
        ScalarType::Integer,
        ScalarType::Long,
        ScalarType::Double,
        ScalarType::String,
        ScalarType::Binary,
        ScalarType::Instant,
        ScalarType::Date,
        ScalarType::Time,
        ScalarType::ObjectId,
        ScalarType::Timestamp,
        ScalarType::Child,
    ];

    /// One-character tag used in display forms of columns
    pub fn tag(&self) -> char {
        match self {
            ScalarType::Null => 'n',
            ScalarType::Boolean => 'b',
            ScalarType::Integer => 'i',
            ScalarType::Long => 'l',
            ScalarType::Double => 'd',
            ScalarType::String => 's',
            ScalarType::Binary => 'r',
            ScalarType::Instant => 't',
            ScalarType::Date => 'c',
            ScalarType::Time => 'm',
            ScalarType::ObjectId => 'x',
            ScalarType::Timestamp => 'y',
            ScalarType::Child => 'e',
        }
    }

    /// Look up a type by its tag
    pub fn from_tag(tag: char) -> Option<ScalarType> {
        Self::ALL.iter().copied().find(|t| t.tag() == tag)
    }

    /// Whether this is the structural child-marker type
    pub fn is_child(&self) -> bool {
        matches!(self, ScalarType::Child)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Null => "null",
            ScalarType::Boolean => "boolean",
            ScalarType::Integer => "integer",
            ScalarType::Long => "long",
            ScalarType::Double => "double",
            ScalarType::String => "string",
            ScalarType::Binary => "binary",
            ScalarType::Instant => "instant",
            ScalarType::Date => "date",
            ScalarType::Time => "time",
            ScalarType::ObjectId => "object_id",
            ScalarType::Timestamp => "timestamp",
            ScalarType::Child => "child",
        };
        f.write_str(name)
    }
}

/// A typed leaf value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScalarValue {
    /// Explicit null
    Null,
    /// Boolean value
    Boolean(bool),
    /// 32-bit signed integer
    Integer(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 64-bit floating point (IEEE-754)
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Raw bytes
    Binary(Vec<u8>),
    /// UTC instant
    Instant(DateTime<Utc>),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// 12-byte object id
    ObjectId([u8; OBJECT_ID_LEN]),
    /// Replication timestamp
    Timestamp {
        /// Seconds since the epoch
        seconds: u32,
        /// Ordinal within the second
        ordinal: u32,
    },
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScalarValue::Null, ScalarValue::Null) => true,
            (ScalarValue::Boolean(a), ScalarValue::Boolean(b)) => a == b,
            (ScalarValue::Integer(a), ScalarValue::Integer(b)) => a == b,
            (ScalarValue::Long(a), ScalarValue::Long(b)) => a == b,
            // IEEE-754: NaN != NaN, -0.0 == 0.0
            (ScalarValue::Double(a), ScalarValue::Double(b)) => a == b,
            (ScalarValue::String(a), ScalarValue::String(b)) => a == b,
            (ScalarValue::Binary(a), ScalarValue::Binary(b)) => a == b,
            (ScalarValue::Instant(a), ScalarValue::Instant(b)) => a == b,
            (ScalarValue::Date(a), ScalarValue::Date(b)) => a == b,
            (ScalarValue::Time(a), ScalarValue::Time(b)) => a == b,
            (ScalarValue::ObjectId(a), ScalarValue::ObjectId(b)) => a == b,
            (
                ScalarValue::Timestamp {
                    seconds: s1,
                    ordinal: o1,
                },
                ScalarValue::Timestamp {
                    seconds: s2,
                    ordinal: o2,
                },
            ) => s1 == s2 && o1 == o2,
            // Different types are never equal
            _ => false,
        }
    }
}

impl ScalarValue {
    /// Scalar type of this value
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            ScalarValue::Null => ScalarType::Null,
            ScalarValue::Boolean(_) => ScalarType::Boolean,
            ScalarValue::Integer(_) => ScalarType::Integer,
            ScalarValue::Long(_) => ScalarType::Long,
            ScalarValue::Double(_) => ScalarType::Double,
            ScalarValue::String(_) => ScalarType::String,
            ScalarValue::Binary(_) => ScalarType::Binary,
            ScalarValue::Instant(_) => ScalarType::Instant,
            ScalarValue::Date(_) => ScalarType::Date,
            ScalarValue::Time(_) => ScalarType::Time,
            ScalarValue::ObjectId(_) => ScalarType::ObjectId,
            ScalarValue::Timestamp { .. } => ScalarType::Timestamp,
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Get as bool if this is a Boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Integer or Long value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Integer(i) => Some(*i as i64),
            ScalarValue::Long(l) => Some(*l),
            _ => None,
        }
    }

    /// Get as f64 if this is a Double value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as &[u8] if this is a Binary value
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ScalarValue::Binary(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => f.write_str("null"),
            ScalarValue::Boolean(b) => write!(f, "{}", b),
            ScalarValue::Integer(i) => write!(f, "{}", i),
            ScalarValue::Long(l) => write!(f, "{}L", l),
            ScalarValue::Double(d) => write!(f, "{:?}", d),
            ScalarValue::String(s) => write!(f, "{:?}", s),
            ScalarValue::Binary(b) => write!(f, "<{} bytes>", b.len()),
            ScalarValue::Instant(t) => write!(f, "{}", t.to_rfc3339()),
            ScalarValue::Date(d) => write!(f, "{}", d),
            ScalarValue::Time(t) => write!(f, "{}", t),
            ScalarValue::ObjectId(id) => {
                for byte in id {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            ScalarValue::Timestamp { seconds, ordinal } => {
                write!(f, "Timestamp({}, {})", seconds, ordinal)
            }
        }
    }
}

/// Document value model
///
/// A value is a typed scalar, an ordered array of values, or an ordered
/// sub-document. Nested arrays are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DocValue {
    /// Leaf value
    Scalar(ScalarValue),
    /// Ordered sequence of values
    Array(Vec<DocValue>),
    /// Ordered name to value mapping
    Document(Document),
}

impl DocValue {
    /// Explicit null
    pub fn null() -> Self {
        DocValue::Scalar(ScalarValue::Null)
    }

    /// Get the kind name as a string
    pub fn kind_name(&self) -> &'static str {
        match self {
            DocValue::Scalar(_) => "scalar",
            DocValue::Array(_) => "array",
            DocValue::Document(_) => "document",
        }
    }

    /// Check if this is a scalar value
    pub fn is_scalar(&self) -> bool {
        matches!(self, DocValue::Scalar(_))
    }

    /// Check if this is an array value
    pub fn is_array(&self) -> bool {
        matches!(self, DocValue::Array(_))
    }

    /// Check if this is a sub-document value
    pub fn is_document(&self) -> bool {
        matches!(self, DocValue::Document(_))
    }

    /// Check if this is an explicit null
    pub fn is_null(&self) -> bool {
        matches!(self, DocValue::Scalar(ScalarValue::Null))
    }

    /// Get as scalar if this is a Scalar value
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            DocValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Get as slice if this is an Array value
    pub fn as_array(&self) -> Option<&[DocValue]> {
        match self {
            DocValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get as document if this is a Document value
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            DocValue::Document(d) => Some(d),
            _ => None,
        }
    }

    /// Maximum nesting depth of this value
    ///
    /// Returns 0 for scalars and counts nested arrays and sub-documents.
    pub fn nesting_depth(&self) -> usize {
        match self {
            DocValue::Scalar(_) => 0,
            DocValue::Array(a) => 1 + a.iter().map(DocValue::nesting_depth).max().unwrap_or(0),
            DocValue::Document(d) => d.nesting_depth(),
        }
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<ScalarValue> for DocValue {
    fn from(s: ScalarValue) -> Self {
        DocValue::Scalar(s)
    }
}

impl From<Document> for DocValue {
    fn from(d: Document) -> Self {
        DocValue::Document(d)
    }
}

impl From<Vec<DocValue>> for DocValue {
    fn from(a: Vec<DocValue>) -> Self {
        DocValue::Array(a)
    }
}

impl From<&str> for DocValue {
    fn from(s: &str) -> Self {
        DocValue::Scalar(ScalarValue::String(s.to_string()))
    }
}

impl From<String> for DocValue {
    fn from(s: String) -> Self {
        DocValue::Scalar(ScalarValue::String(s))
    }
}

impl From<bool> for DocValue {
    fn from(b: bool) -> Self {
        DocValue::Scalar(ScalarValue::Boolean(b))
    }
}

impl From<i32> for DocValue {
    fn from(i: i32) -> Self {
        DocValue::Scalar(ScalarValue::Integer(i))
    }
}

impl From<i64> for DocValue {
    fn from(l: i64) -> Self {
        DocValue::Scalar(ScalarValue::Long(l))
    }
}

impl From<f64> for DocValue {
    fn from(d: f64) -> Self {
        DocValue::Scalar(ScalarValue::Double(d))
    }
}

impl From<()> for DocValue {
    fn from(_: ()) -> Self {
        DocValue::null()
    }
}
