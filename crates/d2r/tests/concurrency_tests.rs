//! Translators on separate threads sharing one allocator and one schema.

mod common;

use common::*;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use tessera_core::{Document, NestingPath};

const THREADS: usize = 8;
const DOCS_PER_THREAD: usize = 50;

fn document(thread: usize, i: usize) -> Document {
    doc(&format!(
        r#"{{"t": {}, "i": {}, "l": [1, [2, 3], {{"k": "{}"}}], "s": {{"x": [{}]}}}}"#,
        thread, i, i, i
    ))
}

#[test]
fn test_concurrent_translators_never_share_row_ids() {
    let allocator = Arc::new(SequenceAllocator::new());
    let schema = Arc::new(MetaCollection::new("db", "coll"));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let allocator = Arc::clone(&allocator);
            let schema = Arc::clone(&schema);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut d2r =
                    D2RTranslator::new("db", "coll", allocator, schema, TranslatorConfig::default());
                barrier.wait();
                for i in 0..DOCS_PER_THREAD {
                    d2r.translate(&document(t, i)).unwrap();
                }
                d2r.finish()
            })
        })
        .collect();
    let results: Vec<CollectionData> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let paths = [
        NestingPath::root(),
        NestingPath::root().field("l"),
        NestingPath::root().field("l").array_level(),
        NestingPath::root().field("s"),
        NestingPath::root().field("s").field("x"),
    ];
    for path in &paths {
        let mut seen = HashSet::new();
        let mut total = 0;
        for data in &results {
            for row in data.doc_part(path).unwrap().rows() {
                assert!(seen.insert(row.ids.rid), "rid {} reused in '{}'", row.ids.rid, path);
                total += 1;
            }
        }
        assert_eq!(
            allocator.last_used("db", "coll", path),
            total as u64,
            "ids of '{}' are not dense",
            path
        );
    }

    // Every translator resolved the same handles
    for path in &paths {
        let ids: HashSet<_> = results
            .iter()
            .map(|d| d.doc_part(path).unwrap().id())
            .collect();
        assert_eq!(ids.len(), 1);
    }
    assert_eq!(schema.doc_part_count(), paths.len());
}

#[test]
fn test_each_thread_reads_back_its_own_documents() {
    let allocator = Arc::new(SequenceAllocator::new());
    let schema = Arc::new(MetaCollection::new("db", "coll"));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let allocator = Arc::clone(&allocator);
            let schema = Arc::clone(&schema);
            thread::spawn(move || {
                let mut d2r =
                    D2RTranslator::new("db", "coll", allocator, schema, TranslatorConfig::default());
                let docs: Vec<Document> = (0..10).map(|i| document(t, i)).collect();
                d2r.translate_all(&docs).unwrap();
                let read = R2DTranslator::new(OrphanPolicy::Error)
                    .translate(d2r.finish().into_result_batches())
                    .unwrap();
                let read: Vec<Document> = read.into_iter().map(|r| r.document).collect();
                read == docs
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
