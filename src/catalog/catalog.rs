use std::ops::Deref;
use std::sync::Arc;

use chrono::Utc;

use crate::adapter::TreeAdapter;
use crate::catalog::access::{AccessAggregator, AccessReport, DataError, ReportStatus};
use crate::catalog::reconcile;
use crate::codec::{info_id, schema_id, MetadataCodec};
use crate::common::{Value, DELIMITER_ID, PROP_NAME, PROP_VERSION};
use crate::errors::{CatalogError, CatalogResult, ErrorKind};
use crate::model::{
    DocumentStoreRef, EntityInfo, EntityMetadata, EntitySchema, MetadataStatus, PredefinedFields,
    StandardPredefinedFields, StatusChange, Version,
};
use crate::store::{CollectionResolver, DocumentCollection};

const OP_FIND: &str = "find";
const OP_INSERT: &str = "insert";
const OP_UPDATE: &str = "update";
const OP_DELETE: &str = "delete";

/// The entity metadata catalog.
///
/// Persists entity metadata as paired documents in a single metadata
/// collection: one info document per entity (keyed `"<name>|"`) and one
/// schema document per version (keyed `"<name>|<version>"`). Cloning is
/// cheap; all clones share the same backing collection.
///
/// # Write protocol
///
/// Creating an entity writes two documents without a transaction. The info
/// document goes first; if the schema write then fails for any reason the
/// info document is removed again, so a half-created entity is never left
/// behind. Index reconciliation runs last and is not rolled back on failure,
/// because the metadata documents are already consistent at that point.
pub struct MetadataCatalog {
    inner: Arc<CatalogInner>,
}

impl Clone for MetadataCatalog {
    fn clone(&self) -> Self {
        MetadataCatalog {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Deref for MetadataCatalog {
    type Target = CatalogInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct CatalogInner {
    collection: Arc<dyn DocumentCollection>,
    resolver: Arc<dyn CollectionResolver>,
    predefined: Arc<dyn PredefinedFields>,
    codec: MetadataCodec<TreeAdapter>,
}

impl MetadataCatalog {
    /// Creates a catalog over the given metadata collection, resolving entity
    /// data collections through `resolver`.
    pub fn new(
        collection: Arc<dyn DocumentCollection>,
        resolver: Arc<dyn CollectionResolver>,
    ) -> MetadataCatalog {
        Self::with_predefined_fields(collection, resolver, Arc::new(StandardPredefinedFields::new()))
    }

    /// Creates a catalog with a custom predefined-fields policy.
    pub fn with_predefined_fields(
        collection: Arc<dyn DocumentCollection>,
        resolver: Arc<dyn CollectionResolver>,
        predefined: Arc<dyn PredefinedFields>,
    ) -> MetadataCatalog {
        MetadataCatalog {
            inner: Arc::new(CatalogInner {
                collection,
                resolver,
                predefined,
                codec: MetadataCodec::new(TreeAdapter::new()),
            }),
        }
    }
}

impl CatalogInner {
    /// Looks up the version-independent metadata of an entity.
    ///
    /// Returns `Ok(None)` when the entity does not exist.
    pub fn get_entity_info(&self, name: &str) -> CatalogResult<Option<EntityInfo>> {
        self.do_get_entity_info(name)
            .map_err(|e| e.push_context(format!("getEntityInfo({})", name)))
    }

    fn do_get_entity_info(&self, name: &str) -> CatalogResult<Option<EntityInfo>> {
        check_entity_name(name)?;
        match self.collection.find_by_id(&info_id(name))? {
            None => Ok(None),
            Some(doc) => Ok(Some(self.codec.parse_entity_info(&doc)?)),
        }
    }

    /// Looks up the full metadata of one entity version.
    ///
    /// With `version` absent or empty the entity's default version is used.
    pub fn get_entity_metadata(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> CatalogResult<EntityMetadata> {
        self.do_get_entity_metadata(name, version).map_err(|e| {
            e.push_context(format!(
                "getEntityMetadata({}:{})",
                name,
                version.unwrap_or("")
            ))
        })
    }

    fn do_get_entity_metadata(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> CatalogResult<EntityMetadata> {
        check_entity_name(name)?;
        let info = self
            .do_get_entity_info(name)?
            .ok_or_else(|| CatalogError::new(name, ErrorKind::MissingEntityInfo))?;

        let version_value = match version {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => info
                .default_version()
                .map(str::to_string)
                .ok_or_else(|| CatalogError::new("version", ErrorKind::InvalidArgument))?,
        };
        check_version_value(&version_value)?;

        let doc = self
            .collection
            .find_by_id(&schema_id(name, &version_value))?
            .ok_or_else(|| {
                CatalogError::new(
                    &format!("{}:{}", name, version_value),
                    ErrorKind::UnknownVersion,
                )
            })?;
        let schema = self.codec.parse_entity_schema(&doc)?;
        EntityMetadata::new(info, schema)
    }

    /// Names of all entities in the catalog, in first-created order.
    pub fn get_entity_names(&self) -> CatalogResult<Vec<String>> {
        self.collection
            .distinct_strings(PROP_NAME)
            .map_err(|e| e.push_context("getEntityNames"))
    }

    /// All versions of one entity, without parsing whole schemas.
    pub fn get_entity_versions(&self, name: &str) -> CatalogResult<Vec<Version>> {
        self.do_get_entity_versions(name)
            .map_err(|e| e.push_context(format!("getEntityVersions({})", name)))
    }

    fn do_get_entity_versions(&self, name: &str) -> CatalogResult<Vec<Version>> {
        check_entity_name(name)?;
        let docs = self.collection.find_with_field(
            PROP_NAME,
            &Value::String(name.to_string()),
            PROP_VERSION,
        )?;
        let mut versions = Vec::with_capacity(docs.len());
        for doc in &docs {
            versions.push(self.codec.parse_version(doc)?);
        }
        Ok(versions)
    }

    /// Creates a new entity: its info document, its first schema document,
    /// and the declared indexes on its data collection.
    ///
    /// The metadata is mutated in place: missing predefined fields are
    /// injected before serialization.
    pub fn create_new_metadata(&self, metadata: &mut EntityMetadata) -> CatalogResult<()> {
        let label = format!("createNewMetadata({})", metadata.name());
        self.do_create_new_metadata(metadata)
            .map_err(|e| e.push_context(label))
    }

    fn do_create_new_metadata(&self, metadata: &mut EntityMetadata) -> CatalogResult<()> {
        check_entity_name(metadata.name())?;
        check_metadata_has_fields(metadata.schema())?;
        check_data_store_is_valid(metadata.info())?;

        let version = metadata.version().value().to_string();
        if let Some(default_version) = metadata.info().default_version().map(str::to_string) {
            if default_version != version {
                self.validate_default_version(metadata.name(), &default_version)?;
            } else if metadata.status() == MetadataStatus::Disabled {
                return Err(CatalogError::new(
                    &default_version,
                    ErrorKind::DisabledDefaultVersion,
                ));
            }
        }

        self.predefined.ensure_predefined_fields(metadata)?;
        self.write_new_entity(metadata)?;
        reconcile::create_update_entity_indexes(self.resolver.as_ref(), metadata.info())
    }

    /// Both inserts of the two-document write, with the compensating delete.
    fn write_new_entity(&self, metadata: &EntityMetadata) -> CatalogResult<()> {
        self.do_write_new_entity(metadata)
            .map_err(|e| e.push_context("writeEntity"))
    }

    fn do_write_new_entity(&self, metadata: &EntityMetadata) -> CatalogResult<()> {
        let info_doc = self.codec.to_info_document(metadata.info())?;
        let schema_doc = self.codec.to_schema_document(metadata.schema())?;
        let info_key = info_id(metadata.name());
        let schema_key = schema_id(metadata.name(), metadata.version().value());

        self.collection
            .insert(info_doc)
            .map_err(|e| wrap_write_error(&info_key, e))?;

        if let Err(e) = self.collection.insert(schema_doc) {
            log::error!(
                "Schema write for {} failed, removing entity info {}: {}",
                schema_key,
                info_key,
                e
            );
            if let Err(cleanup) = self.collection.remove_by_id(&info_key) {
                log::error!(
                    "Failed to remove entity info {} after schema write failure: {}",
                    info_key,
                    cleanup
                );
            }
            return Err(wrap_write_error(&schema_key, e));
        }
        Ok(())
    }

    /// Adds a new schema version to an existing entity. The info document is
    /// untouched and no index reconciliation runs. Missing predefined fields
    /// are injected before serialization, same as on the initial create.
    pub fn create_new_schema(&self, schema: &EntitySchema) -> CatalogResult<()> {
        let label = format!(
            "createNewSchema({}{}{})",
            schema.name(),
            DELIMITER_ID,
            schema.version().value()
        );
        self.do_create_new_schema(schema)
            .map_err(|e| e.push_context(label))
    }

    fn do_create_new_schema(&self, schema: &EntitySchema) -> CatalogResult<()> {
        check_entity_name(schema.name())?;
        check_metadata_has_fields(schema)?;
        let info = self
            .do_get_entity_info(schema.name())?
            .ok_or_else(|| CatalogError::new(schema.name(), ErrorKind::MissingEntityInfo))?;

        if info.default_version() == Some(schema.version().value())
            && schema.status() == MetadataStatus::Disabled
        {
            return Err(CatalogError::new(
                schema.version().value(),
                ErrorKind::DisabledDefaultVersion,
            ));
        }

        let mut metadata = EntityMetadata::new(info, schema.clone())?;
        self.predefined.ensure_predefined_fields(&mut metadata)?;

        let schema_key = schema_id(schema.name(), schema.version().value());
        let schema_doc = self.codec.to_schema_document(metadata.schema())?;
        self.collection
            .insert(schema_doc)
            .map_err(|e| wrap_write_error(&schema_key, e))
    }

    /// Replaces an entity's info document and re-reconciles its indexes.
    pub fn update_entity_info(&self, info: &EntityInfo) -> CatalogResult<()> {
        let label = format!("updateEntityInfo({})", info.name());
        self.do_update_entity_info(info)
            .map_err(|e| e.push_context(label))
    }

    fn do_update_entity_info(&self, info: &EntityInfo) -> CatalogResult<()> {
        check_entity_name(info.name())?;
        check_data_store_is_valid(info)?;
        let existing = self
            .do_get_entity_info(info.name())?
            .ok_or_else(|| CatalogError::new(info.name(), ErrorKind::MissingEntityInfo))?;

        if let Some(default_version) = info.default_version() {
            if existing.default_version() != Some(default_version) {
                self.validate_default_version(info.name(), default_version)?;
            }
        }

        let info_key = info_id(info.name());
        let info_doc = self.codec.to_info_document(info)?;
        let replaced = self
            .collection
            .replace_by_id(&info_key, info_doc)
            .map_err(|e| {
                let message = e.message().to_string();
                CatalogError::new_with_cause(&message, ErrorKind::DatabaseError, e)
            })?;
        if !replaced {
            return Err(CatalogError::new(info.name(), ErrorKind::MissingEntityInfo));
        }

        reconcile::create_update_entity_indexes(self.resolver.as_ref(), info).map_err(|e| {
            let message = e.message().to_string();
            CatalogError::new_with_cause(&message, ErrorKind::DatabaseError, e)
        })
    }

    /// Transitions one schema version to a new lifecycle status, recording
    /// the previous status in the append-only change log.
    pub fn set_metadata_status(
        &self,
        name: &str,
        version: &str,
        new_status: MetadataStatus,
        comment: &str,
    ) -> CatalogResult<()> {
        self.do_set_metadata_status(name, version, new_status, comment)
            .map_err(|e| {
                e.push_context(format!(
                    "setMetadataStatus({}{}{})",
                    name, DELIMITER_ID, version
                ))
            })
    }

    fn do_set_metadata_status(
        &self,
        name: &str,
        version: &str,
        new_status: MetadataStatus,
        comment: &str,
    ) -> CatalogResult<()> {
        check_entity_name(name)?;
        check_version_value(version)?;
        if comment.is_empty() {
            return Err(CatalogError::new("comment", ErrorKind::InvalidArgument));
        }

        let schema_key = schema_id(name, version);
        let doc = self
            .collection
            .find_by_id(&schema_key)?
            .ok_or_else(|| {
                CatalogError::new(&format!("{}:{}", name, version), ErrorKind::UnknownVersion)
            })?;
        let mut schema = self.codec.parse_entity_schema(&doc)?;

        if new_status == MetadataStatus::Disabled {
            if let Some(info) = self.do_get_entity_info(name)? {
                if info.default_version() == Some(version) {
                    return Err(CatalogError::new(version, ErrorKind::DisabledDefaultVersion));
                }
            }
        }

        schema.push_status_change(StatusChange {
            date: Utc::now(),
            status: schema.status(),
            comment: Some(comment.to_string()),
        });
        schema.set_status(new_status);

        let new_doc = self.codec.to_schema_document(&schema)?;
        let replaced = self.collection.replace_by_id(&schema_key, new_doc)?;
        if !replaced {
            return Err(CatalogError::new(
                &format!("{}:{}", name, version),
                ErrorKind::UnknownVersion,
            ));
        }
        Ok(())
    }

    /// Builds the role-centric access map for one entity or, with `entity`
    /// absent, for every entity in the catalog.
    ///
    /// Per-entity failures never abort the whole query: the failing entity is
    /// reported in `errors` and the status degrades to `Partial`, or `Error`
    /// when nothing contributed at all.
    pub fn get_access(
        &self,
        entity: Option<&str>,
        version: Option<&str>,
    ) -> CatalogResult<AccessReport> {
        self.do_get_access(entity, version)
            .map_err(|e| e.push_context("getAccess"))
    }

    fn do_get_access(
        &self,
        entity: Option<&str>,
        version: Option<&str>,
    ) -> CatalogResult<AccessReport> {
        // an explicit version only makes sense for a single named entity
        let (names, forced_version) = match entity {
            Some(name) => (vec![name.to_string()], version.map(str::to_string)),
            None => (self.get_entity_names()?, None),
        };

        let mut aggregator = AccessAggregator::new();
        let mut errors = Vec::new();
        for name in &names {
            match self.do_get_entity_metadata(name, forced_version.as_deref()) {
                Ok(metadata) => collect_access(&mut aggregator, &metadata),
                Err(e) => {
                    log::warn!("Skipping entity {} in access map: {}", name, e);
                    errors.push(DataError {
                        name: name.clone(),
                        version: forced_version.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let status = if aggregator.is_empty() {
            ReportStatus::Error
        } else if errors.is_empty() {
            ReportStatus::Complete
        } else {
            ReportStatus::Partial
        };
        Ok(aggregator.into_report(status, errors))
    }

    /// Verifies that a prospective default version exists and is not
    /// disabled.
    fn validate_default_version(&self, name: &str, version: &str) -> CatalogResult<()> {
        let doc = self
            .collection
            .find_by_id(&schema_id(name, version))?
            .ok_or_else(|| {
                CatalogError::new(&format!("{}:{}", name, version), ErrorKind::UnknownVersion)
            })?;
        let schema = self.codec.parse_entity_schema(&doc)?;
        if schema.status() == MetadataStatus::Disabled {
            return Err(CatalogError::new(version, ErrorKind::DisabledDefaultVersion));
        }
        Ok(())
    }
}

fn collect_access(aggregator: &mut AccessAggregator, metadata: &EntityMetadata) {
    let name = metadata.name();
    let access = metadata.schema().access();
    aggregator.add_all(&access.find, OP_FIND, name);
    aggregator.add_all(&access.insert, OP_INSERT, name);
    aggregator.add_all(&access.update, OP_UPDATE, name);
    aggregator.add_all(&access.delete, OP_DELETE, name);

    for (path, field) in metadata.field_paths() {
        if field.access.is_empty() {
            continue;
        }
        let full_path = format!("{}.{}", name, path);
        aggregator.add_all(&field.access.find, OP_FIND, &full_path);
        aggregator.add_all(&field.access.insert, OP_INSERT, &full_path);
        aggregator.add_all(&field.access.update, OP_UPDATE, &full_path);
    }
}

fn check_entity_name(name: &str) -> CatalogResult<()> {
    if name.is_empty() {
        log::error!("Entity name cannot be empty");
        return Err(CatalogError::new("entityName", ErrorKind::InvalidArgument));
    }
    if name.contains(DELIMITER_ID) {
        log::error!("Entity name cannot contain '{}': {}", DELIMITER_ID, name);
        return Err(CatalogError::new("entityName", ErrorKind::InvalidArgument));
    }
    Ok(())
}

fn check_version_value(version: &str) -> CatalogResult<()> {
    if version.is_empty() || version.contains(DELIMITER_ID) {
        log::error!("Invalid version value: '{}'", version);
        return Err(CatalogError::new("version", ErrorKind::InvalidArgument));
    }
    Ok(())
}

fn check_metadata_has_fields(schema: &EntitySchema) -> CatalogResult<()> {
    if schema.fields().is_empty() {
        log::error!("Entity {} has no fields", schema.name());
        return Err(CatalogError::new("fields", ErrorKind::InvalidArgument));
    }
    Ok(())
}

fn check_data_store_is_valid(info: &EntityInfo) -> CatalogResult<&DocumentStoreRef> {
    info.data_store().as_document_store().ok_or_else(|| {
        log::error!(
            "Entity {} has unsupported data store backend '{}'",
            info.name(),
            info.data_store().kind()
        );
        CatalogError::new(info.data_store().kind(), ErrorKind::InvalidDataStore)
    })
}

/// Maps a driver write failure: duplicate keys mean the metadata already
/// exists; everything else is a transport fault carrying the driver message.
fn wrap_write_error(key: &str, cause: CatalogError) -> CatalogError {
    match cause.kind() {
        ErrorKind::DuplicateKey => {
            CatalogError::new_with_cause(key, ErrorKind::DuplicateMetadata, cause)
        }
        _ => {
            let message = cause.message().to_string();
            CatalogError::new_with_cause(&message, ErrorKind::DatabaseError, cause)
        }
    }
}
