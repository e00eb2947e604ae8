//! Canonical JSON conversion for documents
//!
//! Plain JSON covers null, booleans, numbers, strings, arrays and objects.
//! The remaining scalar types are wrapped in single-key objects so that a
//! document survives a trip through JSON with its types intact:
//!
//! | Type | JSON Representation |
//! |------|---------------------|
//! | Integer | number (fits in i32) |
//! | Long | number, or `{"$long": "<n>"}` when it fits in i32 |
//! | Double | number, or `{"$f64": "NaN" / "+Inf" / "-Inf" / "-0.0"}` |
//! | Binary | `{"$bytes": "<base64>"}` |
//! | Instant | `{"$date": "<rfc3339>"}` |
//! | Date | `{"$localDate": "YYYY-MM-DD"}` |
//! | Time | `{"$time": "HH:MM:SS.fff"}` |
//! | ObjectId | `{"$oid": "<24 hex digits>"}` |
//! | Timestamp | `{"$timestamp": {"t": <seconds>, "i": <ordinal>}}` |
//!
//! Integral numbers that fit in i32 read back as `Integer`, larger ones as
//! `Long`, everything else as `Double`.
//!
//! A sub-document whose only key is one of the tags above (or `$doc`) would
//! read back as a scalar, so it is written escaped as `{"$doc": {...}}`.
//! `$doc` content is always read as a plain document.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value as JsonValue};
use std::str::FromStr;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::value::{DocValue, ScalarValue, OBJECT_ID_LEN};

/// Tag of an escaped sub-document
const DOCUMENT_TAG: &str = "$doc";

/// Single keys that do not read back as a plain sub-document
const RESERVED_TAGS: &[&str] = &[
    "$long",
    "$f64",
    "$bytes",
    "$date",
    "$localDate",
    "$time",
    "$oid",
    "$timestamp",
    DOCUMENT_TAG,
];

/// Convert a document to a JSON object
pub fn document_to_json(doc: &Document) -> JsonValue {
    let obj: Map<String, JsonValue> = doc
        .iter()
        .map(|(k, v)| (k.to_string(), value_to_json(v)))
        .collect();
    match doc.keys().next() {
        Some(key) if doc.len() == 1 && RESERVED_TAGS.contains(&key) => {
            let mut escaped = Map::with_capacity(1);
            escaped.insert(DOCUMENT_TAG.to_string(), JsonValue::Object(obj));
            JsonValue::Object(escaped)
        }
        _ => JsonValue::Object(obj),
    }
}

/// Convert a document value to JSON
pub fn value_to_json(value: &DocValue) -> JsonValue {
    match value {
        DocValue::Scalar(s) => scalar_to_json(s),
        DocValue::Array(arr) => JsonValue::Array(arr.iter().map(value_to_json).collect()),
        DocValue::Document(doc) => document_to_json(doc),
    }
}

/// Convert a scalar to JSON
pub fn scalar_to_json(value: &ScalarValue) -> JsonValue {
    match value {
        ScalarValue::Null => JsonValue::Null,
        ScalarValue::Boolean(b) => JsonValue::Bool(*b),
        ScalarValue::Integer(i) => JsonValue::Number((*i).into()),
        ScalarValue::Long(l) => {
            if i32::try_from(*l).is_ok() {
                json!({"$long": l.to_string()})
            } else {
                JsonValue::Number((*l).into())
            }
        }
        ScalarValue::Double(d) => double_to_json(*d),
        ScalarValue::String(s) => JsonValue::String(s.clone()),
        ScalarValue::Binary(b) => json!({"$bytes": BASE64.encode(b)}),
        ScalarValue::Instant(t) => {
            json!({"$date": t.to_rfc3339_opts(SecondsFormat::Millis, true)})
        }
        ScalarValue::Date(d) => json!({"$localDate": d.format("%Y-%m-%d").to_string()}),
        ScalarValue::Time(t) => json!({"$time": t.format("%H:%M:%S%.3f").to_string()}),
        ScalarValue::ObjectId(id) => json!({"$oid": hex_encode(id)}),
        ScalarValue::Timestamp { seconds, ordinal } => {
            json!({"$timestamp": {"t": seconds, "i": ordinal}})
        }
    }
}

/// Convert a JSON object to a document
///
/// # Errors
///
/// Returns `InvariantViolation` if the value is not an object, and
/// `SerializationError` for malformed special encodings.
pub fn json_to_document(json: &JsonValue) -> Result<Document> {
    match json_to_value(json)? {
        DocValue::Document(doc) => Ok(doc),
        other => Err(Error::invariant(format!(
            "root value must be a JSON object, got {}",
            other.kind_name()
        ))),
    }
}

/// Parse a document from a JSON string
pub fn document_from_json_str(s: &str) -> Result<Document> {
    let json = JsonValue::from_str(s)?;
    json_to_document(&json)
}

/// Convert a JSON value to a document value, recognizing special encodings
pub fn json_to_value(json: &JsonValue) -> Result<DocValue> {
    match json {
        JsonValue::Null => Ok(DocValue::null()),
        JsonValue::Bool(b) => Ok(DocValue::from(*b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                match i32::try_from(i) {
                    Ok(small) => Ok(DocValue::from(small)),
                    Err(_) => Ok(DocValue::from(i)),
                }
            } else if let Some(f) = n.as_f64() {
                Ok(DocValue::from(f))
            } else {
                Err(Error::SerializationError(format!("Invalid number: {}", n)))
            }
        }
        JsonValue::String(s) => Ok(DocValue::from(s.as_str())),
        JsonValue::Array(arr) => {
            let items: Result<Vec<DocValue>> = arr.iter().map(json_to_value).collect();
            Ok(DocValue::Array(items?))
        }
        JsonValue::Object(obj) => {
            if let Some(escaped) = escaped_document(obj) {
                return Ok(DocValue::Document(object_to_document(escaped)?));
            }
            if let Some(special) = special_scalar(obj)? {
                return Ok(DocValue::Scalar(special));
            }
            Ok(DocValue::Document(object_to_document(obj)?))
        }
    }
}

fn object_to_document(obj: &Map<String, JsonValue>) -> Result<Document> {
    let mut doc = Document::with_capacity(obj.len());
    for (k, v) in obj {
        doc.insert(k.clone(), json_to_value(v)?);
    }
    Ok(doc)
}

fn escaped_document(obj: &Map<String, JsonValue>) -> Option<&Map<String, JsonValue>> {
    if obj.len() != 1 {
        return None;
    }
    obj.get(DOCUMENT_TAG).and_then(JsonValue::as_object)
}

fn special_scalar(obj: &Map<String, JsonValue>) -> Result<Option<ScalarValue>> {
    if obj.len() != 1 {
        return Ok(None);
    }
    let Some((key, value)) = obj.iter().next() else {
        return Ok(None);
    };
    let scalar = match (key.as_str(), value) {
        ("$long", JsonValue::String(s)) => ScalarValue::Long(
            s.parse::<i64>()
                .map_err(|e| malformed("$long", e.to_string()))?,
        ),
        ("$f64", JsonValue::String(s)) => ScalarValue::Double(special_float_from_str(s)?),
        ("$bytes", JsonValue::String(s)) => ScalarValue::Binary(
            BASE64
                .decode(s)
                .map_err(|e| malformed("$bytes", e.to_string()))?,
        ),
        ("$date", JsonValue::String(s)) => ScalarValue::Instant(
            DateTime::parse_from_rfc3339(s)
                .map_err(|e| malformed("$date", e.to_string()))?
                .with_timezone(&Utc),
        ),
        ("$localDate", JsonValue::String(s)) => ScalarValue::Date(
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| malformed("$localDate", e.to_string()))?,
        ),
        ("$time", JsonValue::String(s)) => ScalarValue::Time(
            NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
                .map_err(|e| malformed("$time", e.to_string()))?,
        ),
        ("$oid", JsonValue::String(s)) => ScalarValue::ObjectId(hex_decode_object_id(s)?),
        ("$timestamp", JsonValue::Object(ts)) => {
            let field = |name: &str| -> Result<u32> {
                ts.get(name)
                    .and_then(JsonValue::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| malformed("$timestamp", format!("missing or invalid '{}'", name)))
            };
            ScalarValue::Timestamp {
                seconds: field("t")?,
                ordinal: field("i")?,
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(scalar))
}

fn malformed(tag: &str, detail: String) -> Error {
    Error::SerializationError(format!("Invalid {} value: {}", tag, detail))
}

/// Convert a float to JSON, handling special values.
fn double_to_json(f: f64) -> JsonValue {
    if f.is_nan() {
        json!({"$f64": "NaN"})
    } else if f.is_infinite() {
        if f.is_sign_positive() {
            json!({"$f64": "+Inf"})
        } else {
            json!({"$f64": "-Inf"})
        }
    } else if f == 0.0 && f.is_sign_negative() {
        json!({"$f64": "-0.0"})
    } else {
        serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or_else(|| json!({"$f64": f.to_string()}))
    }
}

fn special_float_from_str(s: &str) -> Result<f64> {
    match s {
        "NaN" => Ok(f64::NAN),
        "+Inf" => Ok(f64::INFINITY),
        "-Inf" => Ok(f64::NEG_INFINITY),
        "-0.0" => Ok(-0.0_f64),
        other => other
            .parse::<f64>()
            .map_err(|e| malformed("$f64", e.to_string())),
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn hex_decode_object_id(s: &str) -> Result<[u8; OBJECT_ID_LEN]> {
    if s.len() != OBJECT_ID_LEN * 2 || !s.is_ascii() {
        return Err(malformed("$oid", format!("expected {} hex digits", OBJECT_ID_LEN * 2)));
    }
    let mut id = [0u8; OBJECT_ID_LEN];
    for (i, slot) in id.iter_mut().enumerate() {
        *slot = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
            .map_err(|e| malformed("$oid", e.to_string()))?;
    }
    Ok(id)
}
