//! Tessera - document/relational mapping core
//!
//! Tessera stores schemaless, nested documents in relational tables, one
//! table (doc part) per nesting shape, and rebuilds them from the rows.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use tessera::{document_from_json_str, D2RTranslator, MetaCollection, R2DTranslator,
//!     SequenceAllocator, TranslatorConfig};
//!
//! let schema = Arc::new(MetaCollection::new("shop", "orders"));
//! let mut d2r = D2RTranslator::new(
//!     "shop",
//!     "orders",
//!     Arc::new(SequenceAllocator::new()),
//!     schema.clone(),
//!     TranslatorConfig::default(),
//! );
//!
//! let order = document_from_json_str(r#"{"_id": 1, "items": [{"sku": "a"}, {"sku": "b"}]}"#)?;
//! d2r.translate(&order)?;
//! let data = d2r.finish();
//! assert_eq!(schema.doc_part_count(), 2);
//!
//! let docs = R2DTranslator::default().translate(data.into_result_batches())?;
//! assert_eq!(docs[0].document, order);
//! # Ok::<(), tessera::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `tessera-core`: document value model, nesting paths, limits, errors
//! - `tessera-metainf`: doc part schema and row id allocation
//! - `tessera-d2r`: the write path (documents to rows) and read path (rows
//!   to documents)

pub use tessera_core::*;
pub use tessera_d2r::*;
pub use tessera_metainf::*;
