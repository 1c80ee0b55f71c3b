//! # Metacat
//!
//! Metacat is an embeddable catalog engine for versioned entity metadata,
//! persisted in a document-oriented data store.
//!
//! An *entity* is described by two kinds of documents living in one metadata
//! collection: a single info document carrying the version-independent parts
//! (name, default version, data-store reference, declared indexes) and one
//! schema document per version carrying the field tree, access rules, and
//! lifecycle status. Identity keys encode the pairing: `"<name>|"` for the
//! info document and `"<name>|<version>"` for each schema document.
//!
//! The catalog keeps the declared indexes of each entity converged onto its
//! data collection, guards the entity lifecycle (a default version can never
//! be disabled), and can invert the access rules of every entity into a
//! role-centric map.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use metacat::catalog::MetadataCatalog;
//! use metacat::model::{
//!     DataStore, EntityInfo, EntityMetadata, EntitySchema, Field, Index, IndexSortKey, Version,
//! };
//! use metacat::store::{MemoryCollection, MemoryResolver};
//!
//! # fn main() -> metacat::errors::CatalogResult<()> {
//! let catalog = MetadataCatalog::new(
//!     Arc::new(MemoryCollection::new("metadata")),
//!     Arc::new(MemoryResolver::new()),
//! );
//!
//! let info = EntityInfo::new("user", DataStore::document_store("users"))
//!     .with_indexes(vec![Index::new(vec![IndexSortKey::asc("email")]).unique(true)]);
//! let schema = EntitySchema::new("user", Version::new("1.0")?)
//!     .with_fields(vec![Field::simple("email", "string")]);
//!
//! let mut metadata = EntityMetadata::new(info, schema)?;
//! catalog.create_new_metadata(&mut metadata)?;
//!
//! let loaded = catalog.get_entity_metadata("user", Some("1.0"))?;
//! assert_eq!(loaded.version().value(), "1.0");
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod catalog;
pub mod codec;
pub mod common;
pub mod dsl;
pub mod errors;
pub mod model;
pub mod store;

pub use catalog::MetadataCatalog;
pub use common::{Document, Value};
pub use errors::{CatalogError, CatalogResult, ErrorKind};
pub use model::{EntityInfo, EntityMetadata, EntitySchema};
