//! Serialization of the metadata object model to and from persisted
//! documents, generic over the backing format through
//! [crate::adapter::DocumentAdapter].
//!
//! The codec owns the durable document layout: identity keys, field names,
//! the split of an entity into an info document and per-version schema
//! documents, and the preservation of unknown fields across a round trip.

use crate::adapter::DocumentAdapter;
use crate::common::{
    Document, SortOrder, Value, DELIMITER_ID, DIR_ASC, DIR_DESC, DOC_ID, INDEX_NAME, INDEX_UNIQUE,
    PROP_ACCESS, PROP_BACKEND, PROP_CHANGELOG, PROP_COLLECTION, PROP_COMMENT, PROP_DATABASE,
    PROP_DATASOURCE, PROP_DATA_STORE, PROP_DATE, PROP_DEFAULT_VERSION, PROP_DELETE, PROP_DIR,
    PROP_ENTITY, PROP_EXTEND_VERSIONS, PROP_FIELD, PROP_FIELDS, PROP_FIND, PROP_INDEXES,
    PROP_INSERT, PROP_ITEMS, PROP_LOG, PROP_NAME, PROP_PROJECTION, PROP_QUERY, PROP_SORT,
    PROP_STATUS, PROP_TYPE, PROP_UPDATE, PROP_VALUE, PROP_VERSION, PROP_VERSION_VALUE,
    TYPE_ARRAY, TYPE_OBJECT, TYPE_REFERENCE,
};
use crate::dsl::{Projection, QueryExpression, Sort};
use crate::errors::{CatalogError, CatalogResult, ErrorKind};
use crate::model::{
    ArrayElement, DataStore, DocumentStoreRef, EntityAccess, EntityInfo, EntitySchema, Field,
    FieldAccess, FieldKind, Index, IndexSortKey, MetadataStatus, StatusChange, Version,
};

/// Identity key of an entity-info document.
pub fn info_id(name: &str) -> String {
    format!("{}{}", name, DELIMITER_ID)
}

/// Identity key of an entity-schema document.
pub fn schema_id(name: &str, version: &str) -> String {
    format!("{}{}{}", name, DELIMITER_ID, version)
}

const INFO_KEYS: &[&str] = &[
    DOC_ID,
    PROP_NAME,
    PROP_DEFAULT_VERSION,
    PROP_DATA_STORE,
    PROP_INDEXES,
];

const SCHEMA_KEYS: &[&str] = &[
    DOC_ID,
    PROP_NAME,
    PROP_VERSION,
    PROP_STATUS,
    PROP_ACCESS,
    PROP_FIELDS,
];

const FIELD_KEYS: &[&str] = &[
    PROP_TYPE,
    PROP_ACCESS,
    PROP_FIELDS,
    PROP_ITEMS,
    PROP_ENTITY,
    PROP_VERSION_VALUE,
    PROP_QUERY,
    PROP_PROJECTION,
    PROP_SORT,
];

fn malformed(name: &str) -> CatalogError {
    CatalogError::new(name, ErrorKind::MalformedMetadata)
}

/// Bidirectional translator between the metadata object model and persisted
/// documents, generic over the backing format.
#[derive(Clone, Debug, Default)]
pub struct MetadataCodec<A: DocumentAdapter> {
    adapter: A,
}

impl<A: DocumentAdapter> MetadataCodec<A> {
    pub fn new(adapter: A) -> MetadataCodec<A> {
        MetadataCodec { adapter }
    }

    // ---- object model -> document ----

    /// Serializes an [EntityInfo] to its persisted document, keyed
    /// `"<name>|"`.
    pub fn to_info_document(&self, info: &EntityInfo) -> CatalogResult<A::Node> {
        self.convert_info(info)
            .map_err(|e| e.push_context("convert[info]"))
    }

    fn convert_info(&self, info: &EntityInfo) -> CatalogResult<A::Node> {
        let mut node = self.adapter.new_node();
        self.adapter
            .put_string(&mut node, DOC_ID, &info_id(info.name()))?;
        self.adapter.put_string(&mut node, PROP_NAME, info.name())?;
        if let Some(default_version) = info.default_version() {
            self.adapter
                .put_string(&mut node, PROP_DEFAULT_VERSION, default_version)?;
        }

        let mut store_node = self.adapter.new_node();
        self.adapter
            .put_string(&mut store_node, PROP_BACKEND, info.data_store().kind())?;
        if let Some(store) = info.data_store().as_document_store() {
            if let Some(datasource) = &store.datasource {
                self.adapter
                    .put_string(&mut store_node, PROP_DATASOURCE, datasource)?;
            }
            if let Some(database) = &store.database {
                self.adapter
                    .put_string(&mut store_node, PROP_DATABASE, database)?;
            }
            self.adapter
                .put_string(&mut store_node, PROP_COLLECTION, &store.collection)?;
        }
        self.adapter.put_object(&mut node, PROP_DATA_STORE, store_node)?;

        if !info.indexes().is_empty() {
            self.adapter.new_array(&mut node, PROP_INDEXES)?;
            for index in info.indexes() {
                let index_node = self.convert_index(index)?;
                self.adapter
                    .append_object(&mut node, PROP_INDEXES, index_node)?;
            }
        }
        self.put_properties(&mut node, info.properties())?;
        Ok(node)
    }

    fn convert_index(&self, index: &Index) -> CatalogResult<A::Node> {
        let mut node = self.adapter.new_node();
        if let Some(name) = index.name() {
            self.adapter.put_string(&mut node, INDEX_NAME, name)?;
        }
        self.adapter
            .put_scalar(&mut node, INDEX_UNIQUE, Value::Bool(index.is_unique()))?;
        self.adapter.new_array(&mut node, PROP_FIELDS)?;
        for key in index.fields() {
            let mut key_node = self.adapter.new_node();
            self.adapter.put_string(&mut key_node, PROP_FIELD, &key.field)?;
            let dir = if key.order.is_descending() {
                DIR_DESC
            } else {
                DIR_ASC
            };
            self.adapter.put_string(&mut key_node, PROP_DIR, dir)?;
            self.adapter.append_object(&mut node, PROP_FIELDS, key_node)?;
        }
        Ok(node)
    }

    /// Serializes an [EntitySchema] to its persisted document, keyed
    /// `"<name>|<version>"`.
    pub fn to_schema_document(&self, schema: &EntitySchema) -> CatalogResult<A::Node> {
        self.convert_schema(schema)
            .map_err(|e| e.push_context("convert[schema]"))
    }

    fn convert_schema(&self, schema: &EntitySchema) -> CatalogResult<A::Node> {
        let mut node = self.adapter.new_node();
        self.adapter.put_string(
            &mut node,
            DOC_ID,
            &schema_id(schema.name(), schema.version().value()),
        )?;
        self.adapter.put_string(&mut node, PROP_NAME, schema.name())?;

        let mut version_node = self.adapter.new_node();
        self.adapter
            .put_string(&mut version_node, PROP_VALUE, schema.version().value())?;
        if !schema.version().extends_versions().is_empty() {
            self.adapter.new_array(&mut version_node, PROP_EXTEND_VERSIONS)?;
            for extended in schema.version().extends_versions() {
                self.adapter
                    .append_string(&mut version_node, PROP_EXTEND_VERSIONS, extended)?;
            }
        }
        if let Some(changelog) = schema.version().changelog() {
            self.adapter
                .put_string(&mut version_node, PROP_CHANGELOG, changelog)?;
        }
        self.adapter.put_object(&mut node, PROP_VERSION, version_node)?;

        let mut status_node = self.adapter.new_node();
        self.adapter
            .put_string(&mut status_node, PROP_VALUE, schema.status().as_str())?;
        if !schema.status_change_log().is_empty() {
            self.adapter.new_array(&mut status_node, PROP_LOG)?;
            for change in schema.status_change_log() {
                let mut change_node = self.adapter.new_node();
                self.adapter
                    .put_scalar(&mut change_node, PROP_DATE, Value::Date(change.date))?;
                self.adapter
                    .put_string(&mut change_node, PROP_VALUE, change.status.as_str())?;
                if let Some(comment) = &change.comment {
                    self.adapter
                        .put_string(&mut change_node, PROP_COMMENT, comment)?;
                }
                self.adapter
                    .append_object(&mut status_node, PROP_LOG, change_node)?;
            }
        }
        self.adapter.put_object(&mut node, PROP_STATUS, status_node)?;

        if !schema.access().is_empty() {
            let access_node = self.convert_entity_access(schema.access())?;
            self.adapter.put_object(&mut node, PROP_ACCESS, access_node)?;
        }

        let fields_node = self.convert_fields(schema.fields())?;
        self.adapter.put_object(&mut node, PROP_FIELDS, fields_node)?;

        self.put_properties(&mut node, schema.properties())?;
        Ok(node)
    }

    fn convert_entity_access(&self, access: &EntityAccess) -> CatalogResult<A::Node> {
        let mut node = self.adapter.new_node();
        self.put_role_list(&mut node, PROP_FIND, &access.find)?;
        self.put_role_list(&mut node, PROP_INSERT, &access.insert)?;
        self.put_role_list(&mut node, PROP_UPDATE, &access.update)?;
        self.put_role_list(&mut node, PROP_DELETE, &access.delete)?;
        Ok(node)
    }

    fn convert_field_access(&self, access: &FieldAccess) -> CatalogResult<A::Node> {
        let mut node = self.adapter.new_node();
        self.put_role_list(&mut node, PROP_FIND, &access.find)?;
        self.put_role_list(&mut node, PROP_INSERT, &access.insert)?;
        self.put_role_list(&mut node, PROP_UPDATE, &access.update)?;
        Ok(node)
    }

    fn put_role_list(&self, node: &mut A::Node, name: &str, roles: &[String]) -> CatalogResult<()> {
        if roles.is_empty() {
            return Ok(());
        }
        self.adapter.new_array(node, name)?;
        for role in roles {
            self.adapter.append_string(node, name, role)?;
        }
        Ok(())
    }

    fn convert_fields(&self, fields: &[Field]) -> CatalogResult<A::Node> {
        let mut node = self.adapter.new_node();
        for field in fields {
            let field_node = self.convert_field(field)?;
            self.adapter.put_object(&mut node, &field.name, field_node)?;
        }
        Ok(node)
    }

    fn convert_field(&self, field: &Field) -> CatalogResult<A::Node> {
        let mut node = self.adapter.new_node();
        match &field.kind {
            FieldKind::Simple { field_type } => {
                self.adapter.put_string(&mut node, PROP_TYPE, field_type)?;
            }
            FieldKind::Object { fields } => {
                self.adapter.put_string(&mut node, PROP_TYPE, TYPE_OBJECT)?;
                let children = self.convert_fields(fields)?;
                self.adapter.put_object(&mut node, PROP_FIELDS, children)?;
            }
            FieldKind::Array { element } => {
                self.adapter.put_string(&mut node, PROP_TYPE, TYPE_ARRAY)?;
                let mut items = self.adapter.new_node();
                match element.as_ref() {
                    ArrayElement::Simple { field_type } => {
                        self.adapter.put_string(&mut items, PROP_TYPE, field_type)?;
                    }
                    ArrayElement::Object { fields } => {
                        self.adapter.put_string(&mut items, PROP_TYPE, TYPE_OBJECT)?;
                        let children = self.convert_fields(fields)?;
                        self.adapter.put_object(&mut items, PROP_FIELDS, children)?;
                    }
                }
                self.adapter.put_object(&mut node, PROP_ITEMS, items)?;
            }
            FieldKind::Reference {
                entity,
                version,
                query,
                projection,
                sort,
            } => {
                self.adapter.put_string(&mut node, PROP_TYPE, TYPE_REFERENCE)?;
                self.adapter.put_string(&mut node, PROP_ENTITY, entity)?;
                self.adapter
                    .put_string(&mut node, PROP_VERSION_VALUE, version)?;
                if let Some(query) = query {
                    self.adapter
                        .put_expression(&mut node, PROP_QUERY, query.expression())?;
                }
                if let Some(projection) = projection {
                    self.adapter
                        .put_expression(&mut node, PROP_PROJECTION, projection.expression())?;
                }
                if let Some(sort) = sort {
                    self.adapter
                        .put_expression(&mut node, PROP_SORT, sort.expression())?;
                }
            }
        }
        if !field.access.is_empty() {
            let access_node = self.convert_field_access(&field.access)?;
            self.adapter.put_object(&mut node, PROP_ACCESS, access_node)?;
        }
        self.put_properties(&mut node, &field.properties)?;
        Ok(node)
    }

    fn put_properties(&self, node: &mut A::Node, properties: &Document) -> CatalogResult<()> {
        for (key, value) in properties.iter() {
            self.adapter.put_value(node, key, value.clone())?;
        }
        Ok(())
    }

    // ---- document -> object model ----

    /// Parses an entity-info document.
    pub fn parse_entity_info(&self, node: &A::Node) -> CatalogResult<EntityInfo> {
        self.do_parse_info(node)
            .map_err(|e| e.push_context("parse[info]"))
    }

    fn do_parse_info(&self, node: &A::Node) -> CatalogResult<EntityInfo> {
        let name = self
            .adapter
            .read_string(node, PROP_NAME)?
            .ok_or_else(|| malformed(PROP_NAME))?;
        let store_node = self
            .adapter
            .read_object(node, PROP_DATA_STORE)?
            .ok_or_else(|| malformed(PROP_DATA_STORE))?;
        let data_store = self.parse_data_store(&store_node)?;

        let mut info = EntityInfo::new(&name, data_store);
        if let Some(default_version) = self.adapter.read_string(node, PROP_DEFAULT_VERSION)? {
            info.set_default_version(Some(default_version));
        }
        if let Some(index_nodes) = self.adapter.read_object_list(node, PROP_INDEXES)? {
            let mut indexes = Vec::with_capacity(index_nodes.len());
            for index_node in &index_nodes {
                indexes.push(self.parse_index(index_node)?);
            }
            info.set_indexes(indexes);
        }
        self.read_properties(node, INFO_KEYS, info.properties_mut())?;
        Ok(info)
    }

    fn parse_data_store(&self, node: &A::Node) -> CatalogResult<DataStore> {
        let backend = self
            .adapter
            .read_string(node, PROP_BACKEND)?
            .ok_or_else(|| malformed(PROP_BACKEND))?;
        if backend != crate::common::BACKEND_DOCUMENT_STORE {
            return Ok(DataStore::Other { kind: backend });
        }
        let collection = self
            .adapter
            .read_string(node, PROP_COLLECTION)?
            .ok_or_else(|| malformed(PROP_COLLECTION))?;
        let mut store = DocumentStoreRef::new(&collection);
        store.datasource = self.adapter.read_string(node, PROP_DATASOURCE)?;
        store.database = self.adapter.read_string(node, PROP_DATABASE)?;
        Ok(DataStore::DocumentStore(store))
    }

    fn parse_index(&self, node: &A::Node) -> CatalogResult<Index> {
        let key_nodes = self
            .adapter
            .read_object_list(node, PROP_FIELDS)?
            .ok_or_else(|| malformed(PROP_FIELDS))?;
        if key_nodes.is_empty() {
            return Err(malformed(PROP_FIELDS));
        }
        let mut keys = Vec::with_capacity(key_nodes.len());
        for key_node in &key_nodes {
            let field = self
                .adapter
                .read_string(key_node, PROP_FIELD)?
                .ok_or_else(|| malformed(PROP_FIELD))?;
            let order = match self.adapter.read_string(key_node, PROP_DIR)?.as_deref() {
                None | Some(DIR_ASC) => SortOrder::Ascending,
                Some(DIR_DESC) => SortOrder::Descending,
                Some(_) => return Err(malformed(PROP_DIR)),
            };
            keys.push(IndexSortKey {
                field,
                order,
            });
        }
        let mut index = Index::new(keys);
        if let Some(name) = self.adapter.read_string(node, INDEX_NAME)? {
            index = index.with_name(&name);
        }
        if let Some(unique) = self.adapter.read_scalar(node, INDEX_UNIQUE)? {
            index = index.unique(unique.as_bool().ok_or_else(|| malformed(INDEX_UNIQUE))?);
        }
        Ok(index)
    }

    /// Parses an entity-schema document.
    pub fn parse_entity_schema(&self, node: &A::Node) -> CatalogResult<EntitySchema> {
        self.do_parse_schema(node)
            .map_err(|e| e.push_context("parse[schema]"))
    }

    fn do_parse_schema(&self, node: &A::Node) -> CatalogResult<EntitySchema> {
        let name = self
            .adapter
            .read_string(node, PROP_NAME)?
            .ok_or_else(|| malformed(PROP_NAME))?;
        let version = self.parse_version(node)?;

        let status_node = self
            .adapter
            .read_object(node, PROP_STATUS)?
            .ok_or_else(|| malformed(PROP_STATUS))?;
        let status_value = self
            .adapter
            .read_string(&status_node, PROP_VALUE)?
            .ok_or_else(|| malformed(PROP_VALUE))?;
        let status = MetadataStatus::parse(&status_value)?;

        let mut schema = EntitySchema::new(&name, version).with_status(status);

        if let Some(change_nodes) = self.adapter.read_object_list(&status_node, PROP_LOG)? {
            let mut log = Vec::with_capacity(change_nodes.len());
            for change_node in &change_nodes {
                log.push(self.parse_status_change(change_node)?);
            }
            schema.set_status_change_log(log);
        }

        if let Some(access_node) = self.adapter.read_object(node, PROP_ACCESS)? {
            schema.set_access(self.parse_entity_access(&access_node)?);
        }

        if let Some(fields_node) = self.adapter.read_object(node, PROP_FIELDS)? {
            schema.set_fields(self.parse_fields(&fields_node)?);
        }

        self.read_properties(node, SCHEMA_KEYS, schema.properties_mut())?;
        Ok(schema)
    }

    /// Parses the version object out of a schema document. Lets callers list
    /// an entity's versions without parsing whole schemas.
    pub fn parse_version(&self, node: &A::Node) -> CatalogResult<Version> {
        let version_node = self
            .adapter
            .read_object(node, PROP_VERSION)?
            .ok_or_else(|| malformed(PROP_VERSION))?;
        let value = self
            .adapter
            .read_string(&version_node, PROP_VALUE)?
            .ok_or_else(|| malformed(PROP_VALUE))?;
        let mut version = Version::new(&value).map_err(|e| {
            CatalogError::new_with_cause(PROP_VERSION, ErrorKind::MalformedMetadata, e)
        })?;
        if let Some(extends) = self
            .adapter
            .read_string_list(&version_node, PROP_EXTEND_VERSIONS)?
        {
            version = version.with_extends_versions(extends);
        }
        if let Some(changelog) = self.adapter.read_string(&version_node, PROP_CHANGELOG)? {
            version = version.with_changelog(&changelog);
        }
        Ok(version)
    }

    fn parse_status_change(&self, node: &A::Node) -> CatalogResult<StatusChange> {
        let date = self
            .adapter
            .read_scalar(node, PROP_DATE)?
            .and_then(|v| v.as_date())
            .ok_or_else(|| malformed(PROP_DATE))?;
        let status_value = self
            .adapter
            .read_string(node, PROP_VALUE)?
            .ok_or_else(|| malformed(PROP_VALUE))?;
        Ok(StatusChange {
            date,
            status: MetadataStatus::parse(&status_value)?,
            comment: self.adapter.read_string(node, PROP_COMMENT)?,
        })
    }

    fn parse_entity_access(&self, node: &A::Node) -> CatalogResult<EntityAccess> {
        Ok(EntityAccess {
            find: self.read_role_list(node, PROP_FIND)?,
            insert: self.read_role_list(node, PROP_INSERT)?,
            update: self.read_role_list(node, PROP_UPDATE)?,
            delete: self.read_role_list(node, PROP_DELETE)?,
        })
    }

    fn parse_field_access(&self, node: &A::Node) -> CatalogResult<FieldAccess> {
        Ok(FieldAccess {
            find: self.read_role_list(node, PROP_FIND)?,
            insert: self.read_role_list(node, PROP_INSERT)?,
            update: self.read_role_list(node, PROP_UPDATE)?,
        })
    }

    fn read_role_list(&self, node: &A::Node, name: &str) -> CatalogResult<Vec<String>> {
        Ok(self.adapter.read_string_list(node, name)?.unwrap_or_default())
    }

    fn parse_fields(&self, node: &A::Node) -> CatalogResult<Vec<Field>> {
        let names = self.adapter.fields_not_in(node, &[]);
        let mut fields = Vec::with_capacity(names.len());
        for name in names {
            let field_node = self
                .adapter
                .read_object(node, &name)?
                .ok_or_else(|| malformed(&name))?;
            fields.push(self.parse_field(&name, &field_node)?);
        }
        Ok(fields)
    }

    fn parse_field(&self, name: &str, node: &A::Node) -> CatalogResult<Field> {
        let field_type = self
            .adapter
            .read_string(node, PROP_TYPE)?
            .ok_or_else(|| malformed(PROP_TYPE))?;
        let kind = match field_type.as_str() {
            TYPE_OBJECT => {
                let children = self
                    .adapter
                    .read_object(node, PROP_FIELDS)?
                    .ok_or_else(|| malformed(PROP_FIELDS))?;
                FieldKind::Object {
                    fields: self.parse_fields(&children)?,
                }
            }
            TYPE_ARRAY => {
                let items = self
                    .adapter
                    .read_object(node, PROP_ITEMS)?
                    .ok_or_else(|| malformed(PROP_ITEMS))?;
                let item_type = self
                    .adapter
                    .read_string(&items, PROP_TYPE)?
                    .ok_or_else(|| malformed(PROP_TYPE))?;
                let element = if item_type == TYPE_OBJECT {
                    let children = self
                        .adapter
                        .read_object(&items, PROP_FIELDS)?
                        .ok_or_else(|| malformed(PROP_FIELDS))?;
                    ArrayElement::Object {
                        fields: self.parse_fields(&children)?,
                    }
                } else {
                    ArrayElement::Simple {
                        field_type: item_type,
                    }
                };
                FieldKind::Array {
                    element: Box::new(element),
                }
            }
            TYPE_REFERENCE => {
                let entity = self
                    .adapter
                    .read_string(node, PROP_ENTITY)?
                    .ok_or_else(|| malformed(PROP_ENTITY))?;
                let version = self
                    .adapter
                    .read_string(node, PROP_VERSION_VALUE)?
                    .ok_or_else(|| malformed(PROP_VERSION_VALUE))?;
                FieldKind::Reference {
                    entity,
                    version,
                    query: self
                        .adapter
                        .read_expression(node, PROP_QUERY)?
                        .map(QueryExpression::from_expression),
                    projection: self
                        .adapter
                        .read_expression(node, PROP_PROJECTION)?
                        .map(Projection::from_expression),
                    sort: self
                        .adapter
                        .read_expression(node, PROP_SORT)?
                        .map(Sort::from_expression),
                }
            }
            _ => FieldKind::Simple { field_type },
        };

        let access = match self.adapter.read_object(node, PROP_ACCESS)? {
            Some(access_node) => self.parse_field_access(&access_node)?,
            None => FieldAccess::new(),
        };

        let mut field = Field {
            name: name.to_string(),
            kind,
            access,
            properties: Document::new(),
        };
        self.read_properties(node, FIELD_KEYS, &mut field.properties)?;
        Ok(field)
    }

    fn read_properties(
        &self,
        node: &A::Node,
        known: &[&str],
        properties: &mut Document,
    ) -> CatalogResult<()> {
        for key in self.adapter.fields_not_in(node, known) {
            if let Some(value) = self.adapter.read_value(node, &key)? {
                properties.put(&key, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::TreeAdapter;
    use crate::doc;
    use chrono::Utc;

    fn codec() -> MetadataCodec<TreeAdapter> {
        MetadataCodec::new(TreeAdapter::new())
    }

    fn sample_info() -> EntityInfo {
        let mut info = EntityInfo::new(
            "user",
            DataStore::DocumentStore(
                DocumentStoreRef::new("users").with_database("appdata"),
            ),
        )
        .with_default_version("1.0")
        .with_indexes(vec![
            Index::new(vec![IndexSortKey::asc("email")]).unique(true),
            Index::new(vec![IndexSortKey::asc("lastName"), IndexSortKey::desc("createdAt")])
                .with_name("by_name_recency"),
        ]);
        info.properties_mut().put("owner", "identity-team").unwrap();
        info
    }

    fn sample_schema() -> EntitySchema {
        let mut access = EntityAccess::new();
        access.find.push("anyone".to_string());
        access.insert.push("admin".to_string());

        let mut email_access = FieldAccess::new();
        email_access.find.push("admin".to_string());

        let fields = vec![
            Field::simple("_id", "uid"),
            Field::simple("email", "string").with_access(email_access),
            Field::object(
                "address",
                vec![Field::simple("city", "string"), Field::simple("zip", "string")],
            ),
            Field::array(
                "roles",
                ArrayElement::Simple {
                    field_type: "string".to_string(),
                },
            ),
            Field {
                name: "manager".to_string(),
                kind: FieldKind::Reference {
                    entity: "user".to_string(),
                    version: "1.0".to_string(),
                    query: Some(
                        QueryExpression::from_text(
                            r#"{"field":"active","op":"=","rvalue":true}"#,
                        )
                        .unwrap(),
                    ),
                    projection: Some(
                        Projection::from_text(r#"{"field":"*","include":true}"#).unwrap(),
                    ),
                    sort: Some(Sort::from_text(r#"{"login":"$asc"}"#).unwrap()),
                },
                access: FieldAccess::new(),
                properties: Document::new(),
            },
        ];

        let mut schema = EntitySchema::new(
            "user",
            Version::new("1.0")
                .unwrap()
                .with_changelog("initial")
                .with_extends_versions(vec!["0.9".to_string()]),
        )
        .with_fields(fields)
        .with_access(access);
        schema.push_status_change(StatusChange {
            date: Utc::now(),
            status: MetadataStatus::Active,
            comment: Some("created".to_string()),
        });
        schema
    }

    #[test]
    fn test_info_document_identity_key() {
        let doc = codec().to_info_document(&sample_info()).unwrap();
        assert_eq!(doc.id(), Some("user|"));
        assert_eq!(doc.get(PROP_NAME).unwrap().as_str(), Some("user"));
    }

    #[test]
    fn test_schema_document_identity_key() {
        let doc = codec().to_schema_document(&sample_schema()).unwrap();
        assert_eq!(doc.id(), Some("user|1.0"));
    }

    #[test]
    fn test_info_round_trip() {
        let codec = codec();
        let original = sample_info();
        let doc = codec.to_info_document(&original).unwrap();
        let parsed = codec.parse_entity_info(&doc).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_schema_round_trip() {
        let codec = codec();
        let original = sample_schema();
        let doc = codec.to_schema_document(&original).unwrap();
        let parsed = codec.parse_entity_schema(&doc).unwrap();
        assert_eq!(parsed.name(), original.name());
        assert_eq!(parsed.version(), original.version());
        assert_eq!(parsed.version().changelog(), Some("initial"));
        assert_eq!(parsed.status(), original.status());
        assert_eq!(parsed.status_change_log().len(), 1);
        assert_eq!(parsed.access(), original.access());
        assert_eq!(parsed.fields(), original.fields());
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let codec = codec();
        let doc = doc! {
            "_id": "user|",
            "name": "user",
            "datastore": { "backend": "document", "collection": "users" },
            "tenancy": { "shard": 4i64 },
            "notes": "imported"
        };
        let parsed = codec.parse_entity_info(&doc).unwrap();
        assert_eq!(parsed.properties().len(), 2);

        let back = codec.to_info_document(&parsed).unwrap();
        assert_eq!(back.get("notes").unwrap().as_str(), Some("imported"));
        assert!(back.get("tenancy").unwrap().as_document().is_some());
    }

    #[test]
    fn test_parse_info_missing_name_is_malformed() {
        let doc = doc! { "_id": "user|", "datastore": { "backend": "document", "collection": "users" } };
        let err = codec().parse_entity_info(&doc).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedMetadata);
        assert_eq!(err.message(), PROP_NAME);
        assert_eq!(err.context(), &["parse[info]".to_string()]);
    }

    #[test]
    fn test_parse_foreign_backend() {
        let doc = doc! {
            "_id": "ledger|",
            "name": "ledger",
            "datastore": { "backend": "columnar", "table": "ledger" }
        };
        let parsed = codec().parse_entity_info(&doc).unwrap();
        assert_eq!(parsed.data_store().kind(), "columnar");
        assert!(parsed.data_store().as_document_store().is_none());
    }

    #[test]
    fn test_parse_index_defaults() {
        let codec = codec();
        // no dir means ascending, no unique means non-unique
        let doc = doc! {
            "_id": "user|",
            "name": "user",
            "datastore": { "backend": "document", "collection": "users" },
            "indexes": [ { "fields": [ { "field": "email" } ] } ]
        };
        let parsed = codec.parse_entity_info(&doc).unwrap();
        let index = &parsed.indexes()[0];
        assert!(!index.is_unique());
        assert_eq!(index.fields()[0].order, SortOrder::Ascending);
        assert!(index.name().is_none());
    }

    #[test]
    fn test_parse_index_without_fields_is_malformed() {
        let doc = doc! {
            "_id": "user|",
            "name": "user",
            "datastore": { "backend": "document", "collection": "users" },
            "indexes": [ { "unique": true } ]
        };
        let err = codec().parse_entity_info(&doc).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedMetadata);
        assert_eq!(err.message(), PROP_FIELDS);
    }

    #[test]
    fn test_parse_version_from_schema_document() {
        let codec = codec();
        let doc = codec.to_schema_document(&sample_schema()).unwrap();
        let version = codec.parse_version(&doc).unwrap();
        assert_eq!(version.value(), "1.0");
        assert_eq!(version.extends_versions(), &["0.9".to_string()]);
    }

    #[test]
    fn test_parse_schema_bad_status_is_malformed() {
        let doc = doc! {
            "_id": "user|1.0",
            "name": "user",
            "version": { "value": "1.0" },
            "status": { "value": "frozen" },
            "fields": {}
        };
        let err = codec().parse_entity_schema(&doc).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedMetadata);
    }

    #[test]
    fn test_parse_schema_version_with_delimiter_is_malformed() {
        let doc = doc! {
            "_id": "user|1|0",
            "name": "user",
            "version": { "value": "1|0" },
            "status": { "value": "active" },
            "fields": {}
        };
        let err = codec().parse_entity_schema(&doc).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedMetadata);
        assert!(err.cause().is_some());
    }

    #[test]
    fn test_field_custom_properties_preserved() {
        let codec = codec();
        let doc = doc! {
            "_id": "user|1.0",
            "name": "user",
            "version": { "value": "1.0" },
            "status": { "value": "active" },
            "fields": {
                "email": { "type": "string", "description": "login email" }
            }
        };
        let parsed = codec.parse_entity_schema(&doc).unwrap();
        let email = &parsed.fields()[0];
        assert_eq!(
            email.properties.get("description").unwrap().as_str(),
            Some("login email")
        );

        let back = codec.to_schema_document(&parsed).unwrap();
        let fields = back.get("fields").unwrap().as_document().unwrap();
        let email_doc = fields.get("email").unwrap().as_document().unwrap();
        assert_eq!(
            email_doc.get("description").unwrap().as_str(),
            Some("login email")
        );
    }
}
