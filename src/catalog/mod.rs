//! Catalog operations over the metadata collection: lookups, versioned
//! writes, lifecycle transitions, index reconciliation, and the role-centric
//! access map.

pub mod access;
#[allow(clippy::module_inception)]
pub mod catalog;
pub mod reconcile;

pub use access::{AccessReport, DataError, ReportStatus, RoleAccess};
pub use catalog::MetadataCatalog;
pub use reconcile::create_update_entity_indexes;
