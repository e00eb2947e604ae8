//! Doc part schema and structural identifiers
//!
//! The mapping core consumes two collaborators from this crate:
//! - [`SchemaResolver`]: resolves (or creates) doc parts and their typed
//!   fields on first encounter, returning opaque handles
//! - [`RowIdAllocator`]: hands out row ids, monotonic per
//!   (database, collection, doc part) and safe across threads
//!
//! Both come with in-memory implementations ([`MetaCollection`] and
//! [`SequenceAllocator`]) used when embedding the core and in tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod allocator;
pub mod collection;
pub mod doc_part;
pub mod resolver;

pub use allocator::{AllocatorKey, RowIdAllocator, SequenceAllocator};
pub use collection::MetaCollection;
pub use doc_part::{MetaDocPart, MetaField};
pub use resolver::{DocPartId, FieldId, SchemaResolver};
