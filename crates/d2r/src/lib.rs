//! Document/relational translation for Tessera
//!
//! The write path ([`D2RTranslator`]) splits nested documents into rows, one
//! logical table (doc part) per nesting path. The read path
//! ([`R2DTranslator`]) rebuilds the documents from per-doc-part row batches.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tessera_core::{DocValue, Document};
//! use tessera_d2r::{D2RTranslator, R2DTranslator, TranslatorConfig};
//! use tessera_metainf::{MetaCollection, SequenceAllocator};
//!
//! let mut d2r = D2RTranslator::new(
//!     "db",
//!     "people",
//!     Arc::new(SequenceAllocator::new()),
//!     Arc::new(MetaCollection::new("db", "people")),
//!     TranslatorConfig::default(),
//! );
//! let doc = Document::new()
//!     .with("name", "Ada")
//!     .with("langs", vec![DocValue::from("en"), DocValue::from("fr")]);
//! d2r.translate(&doc).unwrap();
//!
//! let batches = d2r.finish().into_result_batches();
//! let docs = R2DTranslator::default().translate(batches).unwrap();
//! assert_eq!(docs[0].document, doc);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection_data;
pub mod config;
pub mod d2r;
pub mod doc_part_data;
pub mod path_stack;
pub mod r2d;
pub mod result;
pub mod row;

pub use collection_data::CollectionData;
pub use config::{OrphanPolicy, R2DConfig, TranslatorConfig, CONFIG_FILE_NAME};
pub use d2r::{D2RTranslator, TranslationStats};
pub use doc_part_data::DocPartData;
pub use path_stack::PathStack;
pub use r2d::{R2DTranslator, ReadDocument};
pub use result::{DocPartResult, DocPartResultBatch, ResultRow};
pub use row::{DocPartRow, RowBuilder, RowIds};
