use crate::errors::{CatalogError, CatalogResult, ErrorKind};
use crate::model::{walk_fields, EntityInfo, EntitySchema, Field, MetadataStatus, Version};

/// The pairing of one [EntityInfo] with one [EntitySchema].
///
/// This is a read-time composition: the two halves are persisted as separate
/// documents and joined when a caller asks for a specific version.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityMetadata {
    info: EntityInfo,
    schema: EntitySchema,
}

impl EntityMetadata {
    /// Pairs an info with a schema.
    ///
    /// # Errors
    ///
    /// Fails with [ErrorKind::InvalidArgument] if the two halves name
    /// different entities.
    pub fn new(info: EntityInfo, schema: EntitySchema) -> CatalogResult<EntityMetadata> {
        if info.name() != schema.name() {
            log::error!(
                "Entity info '{}' does not match schema '{}'",
                info.name(),
                schema.name()
            );
            return Err(CatalogError::new(
                &format!(
                    "Entity info '{}' does not match schema '{}'",
                    info.name(),
                    schema.name()
                ),
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(EntityMetadata { info, schema })
    }

    pub fn name(&self) -> &str {
        self.info.name()
    }

    pub fn version(&self) -> &Version {
        self.schema.version()
    }

    pub fn status(&self) -> MetadataStatus {
        self.schema.status()
    }

    pub fn info(&self) -> &EntityInfo {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut EntityInfo {
        &mut self.info
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub fn schema_mut(&mut self) -> &mut EntitySchema {
        &mut self.schema
    }

    /// All fields of the schema with their full dotted paths, depth-first.
    pub fn field_paths(&self) -> Vec<(String, &Field)> {
        walk_fields(self.schema.fields())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataStore;

    #[test]
    fn test_matching_names_compose() {
        let info = EntityInfo::new("user", DataStore::document_store("users"));
        let schema = EntitySchema::new("user", Version::new("1.0").unwrap());
        let md = EntityMetadata::new(info, schema).unwrap();
        assert_eq!(md.name(), "user");
        assert_eq!(md.version().value(), "1.0");
    }

    #[test]
    fn test_mismatched_names_rejected() {
        let info = EntityInfo::new("user", DataStore::document_store("users"));
        let schema = EntitySchema::new("order", Version::new("1.0").unwrap());
        let result = EntityMetadata::new(info, schema);
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidArgument);
    }
}
