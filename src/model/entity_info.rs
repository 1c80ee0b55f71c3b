use crate::common::Document;
use crate::model::{DataStore, Index};

/// The version-independent part of an entity's metadata: its name, optional
/// default version, data-store reference, and declared index set.
///
/// Identity is the `name`, which is immutable once created. The entity info
/// document is mutated only through explicit catalog updates and is never
/// implicitly deleted.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityInfo {
    name: String,
    default_version: Option<String>,
    data_store: DataStore,
    indexes: Vec<Index>,
    properties: Document,
}

impl EntityInfo {
    pub fn new(name: &str, data_store: DataStore) -> EntityInfo {
        EntityInfo {
            name: name.to_string(),
            default_version: None,
            data_store,
            indexes: Vec::new(),
            properties: Document::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_version(&self) -> Option<&str> {
        self.default_version.as_deref()
    }

    pub fn set_default_version(&mut self, version: Option<String>) {
        self.default_version = version;
    }

    pub fn with_default_version(mut self, version: &str) -> EntityInfo {
        self.default_version = Some(version.to_string());
        self
    }

    pub fn data_store(&self) -> &DataStore {
        &self.data_store
    }

    pub fn set_data_store(&mut self, data_store: DataStore) {
        self.data_store = data_store;
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn set_indexes(&mut self, indexes: Vec<Index>) {
        self.indexes = indexes;
    }

    pub fn with_indexes(mut self, indexes: Vec<Index>) -> EntityInfo {
        self.indexes = indexes;
        self
    }

    /// Unknown/custom fields preserved from the persisted document.
    pub fn properties(&self) -> &Document {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Document {
        &mut self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IndexSortKey;

    #[test]
    fn test_new_entity_info() {
        let info = EntityInfo::new("user", DataStore::document_store("users"));
        assert_eq!(info.name(), "user");
        assert!(info.default_version().is_none());
        assert!(info.indexes().is_empty());
    }

    #[test]
    fn test_builders() {
        let info = EntityInfo::new("user", DataStore::document_store("users"))
            .with_default_version("1.0")
            .with_indexes(vec![Index::new(vec![IndexSortKey::asc("email")]).unique(true)]);
        assert_eq!(info.default_version(), Some("1.0"));
        assert_eq!(info.indexes().len(), 1);
    }
}
