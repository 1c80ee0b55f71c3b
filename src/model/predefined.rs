use crate::common::{DOC_ID, FIELD_OBJECT_TYPE, TYPE_STRING, TYPE_UID};
use crate::errors::CatalogResult;
use crate::model::{EntityMetadata, Field};

/// Field-normalization collaborator: guarantees system-required fields exist
/// on the metadata object graph before serialization.
pub trait PredefinedFields: Send + Sync {
    /// Mutates the metadata in place, injecting any missing predefined
    /// fields.
    fn ensure_predefined_fields(&self, metadata: &mut EntityMetadata) -> CatalogResult<()>;
}

/// Default implementation: injects the `_id` identity field and the
/// `objectType` marker field when absent.
#[derive(Clone, Debug, Default)]
pub struct StandardPredefinedFields;

impl StandardPredefinedFields {
    pub fn new() -> Self {
        StandardPredefinedFields
    }
}

impl PredefinedFields for StandardPredefinedFields {
    fn ensure_predefined_fields(&self, metadata: &mut EntityMetadata) -> CatalogResult<()> {
        let fields = metadata.schema_mut().fields_mut();
        if !fields.iter().any(|f| f.name == DOC_ID) {
            log::debug!("Injecting predefined field {}", DOC_ID);
            fields.push(Field::simple(DOC_ID, TYPE_UID));
        }
        if !fields.iter().any(|f| f.name == FIELD_OBJECT_TYPE) {
            log::debug!("Injecting predefined field {}", FIELD_OBJECT_TYPE);
            fields.push(Field::simple(FIELD_OBJECT_TYPE, TYPE_STRING));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataStore, EntityInfo, EntitySchema, Version};

    fn metadata_with_fields(fields: Vec<Field>) -> EntityMetadata {
        let info = EntityInfo::new("user", DataStore::document_store("users"));
        let schema =
            EntitySchema::new("user", Version::new("1.0").unwrap()).with_fields(fields);
        EntityMetadata::new(info, schema).unwrap()
    }

    #[test]
    fn test_injects_missing_predefined_fields() {
        let mut md = metadata_with_fields(vec![Field::simple("email", "string")]);
        StandardPredefinedFields::new()
            .ensure_predefined_fields(&mut md)
            .unwrap();
        let names: Vec<&str> = md.schema().fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["email", DOC_ID, FIELD_OBJECT_TYPE]);
    }

    #[test]
    fn test_idempotent_when_fields_present() {
        let mut md = metadata_with_fields(vec![
            Field::simple(DOC_ID, TYPE_UID),
            Field::simple(FIELD_OBJECT_TYPE, TYPE_STRING),
        ]);
        StandardPredefinedFields::new()
            .ensure_predefined_fields(&mut md)
            .unwrap();
        assert_eq!(md.schema().fields().len(), 2);
    }
}
