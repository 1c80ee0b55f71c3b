//! The metadata object model: entities, versions, fields, indexes, access
//! rules, and data-store references.

pub mod access;
pub mod datastore;
pub mod entity_info;
pub mod entity_metadata;
pub mod entity_schema;
pub mod field;
pub mod index;
pub mod predefined;
pub mod status;
pub mod version;

pub use access::{EntityAccess, FieldAccess};
pub use datastore::{DataStore, DocumentStoreRef};
pub use entity_info::EntityInfo;
pub use entity_metadata::EntityMetadata;
pub use entity_schema::EntitySchema;
pub use field::{walk_fields, ArrayElement, Field, FieldKind};
pub use index::{Index, IndexSortKey};
pub use predefined::{PredefinedFields, StandardPredefinedFields};
pub use status::{MetadataStatus, StatusChange};
pub use version::Version;
