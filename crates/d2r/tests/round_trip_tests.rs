//! Write documents as rows and read them back.

mod common;

use common::*;
use std::collections::HashMap;
use tessera_core::{DocValue, Document, FieldKey, NestingPath, ScalarType, ScalarValue};

// ============================================================================
// Row layout
// ============================================================================

#[test]
fn test_concrete_document_row_layout() {
    let mut d2r = translator();
    let did = d2r
        .translate(&doc(r#"{"_id": 1, "tags": ["a", "b"], "addr": {"city": "X"}}"#))
        .unwrap();
    assert_eq!(did, 1);
    let data = d2r.finish();
    assert_eq!(data.doc_part_count(), 3);

    let root = data.doc_part(&NestingPath::root()).unwrap();
    assert_eq!(root.row_count(), 1);
    let row = &root.rows()[0];
    assert_eq!((row.ids.did, row.ids.rid, row.ids.pid, row.ids.seq), (1, 1, 1, None));
    let col = |key: FieldKey, ty| root.column_position(&key, ty).unwrap();
    assert_eq!(
        row.value(col(FieldKey::named("_id"), ScalarType::Integer)),
        Some(&ScalarValue::Integer(1))
    );
    assert_eq!(
        row.value(col(FieldKey::named("tags"), ScalarType::Child)),
        Some(&ScalarValue::Boolean(true))
    );
    assert_eq!(
        row.value(col(FieldKey::named("addr"), ScalarType::Child)),
        Some(&ScalarValue::Boolean(false))
    );

    let tags = data.doc_part(&NestingPath::root().field("tags")).unwrap();
    let scalar = tags
        .column_position(&FieldKey::Scalar, ScalarType::String)
        .unwrap();
    let tag_rows: Vec<_> = tags
        .rows()
        .iter()
        .map(|r| (r.ids.pid, r.ids.seq, r.value(scalar).cloned()))
        .collect();
    assert_eq!(
        tag_rows,
        vec![
            (1, Some(0), Some(ScalarValue::String("a".into()))),
            (1, Some(1), Some(ScalarValue::String("b".into()))),
        ]
    );

    let addr = data.doc_part(&NestingPath::root().field("addr")).unwrap();
    assert_eq!(addr.row_count(), 1);
    let addr_row = &addr.rows()[0];
    assert_eq!((addr_row.ids.pid, addr_row.ids.seq), (1, None));
    let city = addr
        .column_position(&FieldKey::named("city"), ScalarType::String)
        .unwrap();
    assert_eq!(addr_row.value(city), Some(&ScalarValue::String("X".into())));

    let read = R2DTranslator::default()
        .translate(data.into_result_batches())
        .unwrap();
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].did, 1);
    assert_eq!(
        read[0].document,
        doc(r#"{"_id": 1, "tags": ["a", "b"], "addr": {"city": "X"}}"#)
    );
}

#[test]
fn test_row_ids_link_to_parent_rows() {
    let mut d2r = translator();
    d2r.translate_all(&[
        doc(r#"{"a": [{"b": [1, [2, {"c": 3}]]}, {"b": {"d": 4}}], "e": {"f": {"g": [5]}}}"#),
        doc(r#"{"a": [{"b": []}], "e": {"f": {"g": [6, 7]}}}"#),
    ])
    .unwrap();
    let data = d2r.finish();

    let mut rids: HashMap<NestingPath, Vec<u64>> = HashMap::new();
    for part in data.doc_parts() {
        for row in part.rows() {
            if part.path().is_root() {
                assert_eq!(row.ids.rid, row.ids.did);
                assert_eq!(row.ids.pid, row.ids.did);
                assert_eq!(row.ids.seq, None);
            } else {
                let parent = part.path().parent().unwrap();
                let parents = &rids[&parent];
                assert_eq!(
                    parents.iter().filter(|rid| **rid == row.ids.pid).count(),
                    1,
                    "row {:?} of '{}' has no single parent",
                    row.ids,
                    part.path()
                );
            }
            rids.entry(part.path().clone()).or_default().push(row.ids.rid);
        }
    }
}

#[test]
fn test_doc_parts_are_handed_over_parent_first() {
    let mut d2r = translator();
    d2r.translate(&doc(r#"{"a": {"b": {"c": 1}}, "d": [[1]]}"#))
        .unwrap();
    let data = d2r.finish();
    let depths: Vec<usize> = data.doc_parts().map(|p| p.path().depth()).collect();
    let mut sorted = depths.clone();
    sorted.sort();
    assert_eq!(depths, sorted);
    assert_eq!(
        data.doc_parts().map(|p| p.path().to_string()).collect::<Vec<_>>(),
        vec!["", "a", "d", "a.b", "d.$2"]
    );
}

#[test]
fn test_padded_rows_cover_every_column() {
    let mut d2r = translator();
    d2r.translate_all(&[doc(r#"{"a": 1}"#), doc(r#"{"b": "x", "c": null}"#)])
        .unwrap();
    let data = d2r.finish();
    let root = data.doc_part(&NestingPath::root()).unwrap();
    assert_eq!(root.column_count(), 3);
    for (_, values) in root.padded_rows() {
        assert_eq!(values.len(), 3);
    }
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_round_trip_flat_and_nested() {
    assert_round_trip(r#"{}"#);
    assert_round_trip(r#"{"_id": 1, "name": "x", "ok": true, "pi": 3.25}"#);
    assert_round_trip(r#"{"a": {"b": {"c": {"d": "deep"}}}, "z": 1}"#);
    assert_round_trip(r#"{"a": {}, "b": [{}], "c": [[]]}"#);
}

#[test]
fn test_round_trip_preserves_field_order() {
    assert_round_trip(r#"{"z": 1, "a": {"y": 2, "b": 3}, "m": null}"#);
}

#[test]
fn test_round_trip_arrays_with_nulls_and_mixed_types() {
    assert_round_trip(r#"{"a": [null, 1, "two", 3.5, true, null, {"x": 1}, null]}"#);
    assert_round_trip(r#"{"a": [null]}"#);
    assert_round_trip(r#"{"a": [1, {"$long": "1"}, 4294967296]}"#);
}

#[test]
fn test_round_trip_nested_arrays() {
    assert_round_trip(r#"{"m": [1, [2, [3]], []]}"#);
    assert_round_trip(r#"{"m": [[[[]]]]}"#);
    assert_round_trip(r#"{"m": [[{"a": [[1, 2], {"b": [[]]}]}], [null, [null]]]}"#);
}

#[test]
fn test_round_trip_special_scalars() {
    assert_round_trip(
        r#"{
            "bin": {"$bytes": "AAEC"},
            "at": {"$date": "2024-01-02T03:04:05.678Z"},
            "day": {"$localDate": "2024-02-29"},
            "time": {"$time": "12:34:56.789"},
            "oid": {"$oid": "0123456789abcdef01234567"},
            "ts": {"$timestamp": {"t": 7, "i": 2}},
            "list": [{"$bytes": ""}, {"$f64": "+Inf"}, {"$long": "5"}]
        }"#,
    );
}

#[test]
fn test_empty_array_is_not_null_or_missing() {
    let read = round_trip(&[doc(r#"{"x": []}"#)]);
    assert_eq!(
        read[0].document.get("x"),
        Some(&DocValue::Array(Vec::new()))
    );
}

#[test]
fn test_child_marker_disambiguates_document_from_array() {
    let read = round_trip(&[
        doc(r#"{"x": {"a": 1}}"#),
        doc(r#"{"x": [{"a": 1}, {"a": 2}]}"#),
        doc(r#"{"x": [{"a": 3}]}"#),
    ]);
    assert_eq!(read.len(), 3);
    assert_eq!(read[0].document, doc(r#"{"x": {"a": 1}}"#));
    assert!(read[0].document.get("x").unwrap().is_document());
    assert_eq!(read[1].document, doc(r#"{"x": [{"a": 1}, {"a": 2}]}"#));
    assert_eq!(read[2].document, doc(r#"{"x": [{"a": 3}]}"#));
}

#[test]
fn test_same_field_with_different_types_across_documents() {
    let docs = [
        doc(r#"{"v": 1}"#),
        doc(r#"{"v": "one"}"#),
        doc(r#"{"v": [1]}"#),
        doc(r#"{"v": {"w": 1}}"#),
        doc(r#"{"v": null}"#),
    ];
    let read = round_trip(&docs);
    let documents: Vec<Document> = read.into_iter().map(|r| r.document).collect();
    assert_eq!(documents, docs.to_vec());
}

#[test]
fn test_field_named_like_the_scalar_column_is_a_plain_field() {
    assert_round_trip(r#"{"a": [{"v": 1}, 2, {"<scalar>": 3, "scalar": 4}]}"#);
}

#[test]
fn test_nested_field_and_array_level_do_not_collide() {
    // x.x (field inside array element) and x.$2 (array inside array element)
    assert_round_trip(r#"{"x": [{"x": [1]}, [2]]}"#);
    assert_round_trip(r#"{"x": [{"x": {"x": 1}}, [[3]]]}"#);
}

#[test]
fn test_documents_come_back_in_write_order() {
    let docs: Vec<Document> = (0..20)
        .map(|i| doc(&format!(r#"{{"n": {}, "l": [{}, {{"k": {}}}]}}"#, i, i, i)))
        .collect();
    let read = round_trip(&docs);
    let dids: Vec<u64> = read.iter().map(|r| r.did).collect();
    assert_eq!(dids, (1..=20).collect::<Vec<u64>>());
    for (r, d) in read.iter().zip(&docs) {
        assert_eq!(&r.document, d);
    }
}

#[test]
fn test_field_order_kept_per_row_within_a_doc_part() {
    let original = doc(r#"{"a": [{"x": 1, "y": 2}, {"y": 3, "x": 4}]}"#);
    let read = round_trip(std::slice::from_ref(&original));
    let elements = read[0].document.get("a").unwrap().as_array().unwrap();
    let second = elements[1].as_document().unwrap();
    assert_eq!(second.keys().collect::<Vec<_>>(), vec!["y", "x"]);
    assert_eq!(read[0].document, original);
}

#[test]
fn test_field_order_kept_across_documents() {
    let docs = [
        doc(r#"{"p": 1, "q": 2, "s": {"m": 1, "n": 2}}"#),
        doc(r#"{"q": 3, "p": 4, "s": {"n": 3, "m": 4}}"#),
        doc(r#"{"s": {"n": "str", "m": null}, "p": 5}"#),
    ];
    let read = round_trip(&docs);
    assert_eq!(read[1].document.keys().collect::<Vec<_>>(), vec!["q", "p", "s"]);
    assert_eq!(read[2].document.keys().collect::<Vec<_>>(), vec!["s", "p"]);
    let documents: Vec<Document> = read.into_iter().map(|r| r.document).collect();
    assert_eq!(documents, docs);
}
