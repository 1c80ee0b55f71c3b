//! Storage abstraction: the minimal document-collection surface the catalog
//! needs, plus an in-memory implementation and a resolver that maps
//! data-store references to live collections.

pub mod memory;
pub mod resolver;

use crate::common::{Document, Value};
use crate::errors::CatalogResult;
use crate::model::IndexSortKey;

pub use memory::MemoryCollection;
pub use resolver::{CollectionResolver, MemoryResolver};

/// Options for [DocumentCollection::create_index].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexOptions {
    pub unique: bool,
    /// Explicit index name; when `None` the collection assigns one.
    pub name: Option<String>,
}

/// A named collection of documents keyed by their `_id` field.
///
/// This is the seam between the catalog and whatever driver actually talks
/// to the backing store. Implementations must surface duplicate-identity
/// insert failures with [crate::errors::ErrorKind::DuplicateKey] so callers
/// can distinguish them from transport faults.
pub trait DocumentCollection: Send + Sync {
    fn name(&self) -> &str;

    /// Looks up a single document by its `_id`.
    fn find_by_id(&self, id: &str) -> CatalogResult<Option<Document>>;

    /// Finds documents where `eq_field` equals `eq_value` and the field named
    /// by `present` exists, in insertion order.
    fn find_with_field(
        &self,
        eq_field: &str,
        eq_value: &Value,
        present: &str,
    ) -> CatalogResult<Vec<Document>>;

    /// Distinct string values of `field` across the collection, in first-seen
    /// order.
    fn distinct_strings(&self, field: &str) -> CatalogResult<Vec<String>>;

    /// Inserts a document. Fails with [crate::errors::ErrorKind::DuplicateKey]
    /// if a document with the same `_id` already exists.
    fn insert(&self, document: Document) -> CatalogResult<()>;

    /// Replaces the document with the given `_id`. Returns `false` when no
    /// such document exists.
    fn replace_by_id(&self, id: &str, document: Document) -> CatalogResult<bool>;

    /// Removes the document with the given `_id`. Returns `false` when no
    /// such document exists.
    fn remove_by_id(&self, id: &str) -> CatalogResult<bool>;

    /// Describes the live indexes of this collection. Each descriptor carries
    /// a `key` sub-document of field-to-direction pairs, a `name`, and a
    /// `unique` flag.
    fn list_indexes(&self) -> CatalogResult<Vec<Document>>;

    fn create_index(&self, fields: &[IndexSortKey], options: &IndexOptions) -> CatalogResult<()>;

    fn drop_index(&self, name: &str) -> CatalogResult<()>;
}
