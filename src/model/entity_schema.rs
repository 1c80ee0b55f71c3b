use crate::common::Document;
use crate::model::{EntityAccess, Field, MetadataStatus, StatusChange, Version};

/// The version-specific part of an entity's metadata: the field tree, access
/// rules, lifecycle status, and status history for one (name, version) pair.
///
/// A schema document is immutable once created, except for its status and
/// the append-only status-change log.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySchema {
    name: String,
    version: Version,
    status: MetadataStatus,
    status_change_log: Vec<StatusChange>,
    fields: Vec<Field>,
    access: EntityAccess,
    properties: Document,
}

impl EntitySchema {
    pub fn new(name: &str, version: Version) -> EntitySchema {
        EntitySchema {
            name: name.to_string(),
            version,
            status: MetadataStatus::Active,
            status_change_log: Vec::new(),
            fields: Vec::new(),
            access: EntityAccess::new(),
            properties: Document::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn status(&self) -> MetadataStatus {
        self.status
    }

    pub fn set_status(&mut self, status: MetadataStatus) {
        self.status = status;
    }

    pub fn with_status(mut self, status: MetadataStatus) -> EntitySchema {
        self.status = status;
        self
    }

    pub fn status_change_log(&self) -> &[StatusChange] {
        &self.status_change_log
    }

    /// Appends an audit entry; the log is append-only and never truncated.
    pub fn push_status_change(&mut self, change: StatusChange) {
        self.status_change_log.push(change);
    }

    pub(crate) fn set_status_change_log(&mut self, log: Vec<StatusChange>) {
        self.status_change_log = log;
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn set_fields(&mut self, fields: Vec<Field>) {
        self.fields = fields;
    }

    pub fn fields_mut(&mut self) -> &mut Vec<Field> {
        &mut self.fields
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> EntitySchema {
        self.fields = fields;
        self
    }

    pub fn access(&self) -> &EntityAccess {
        &self.access
    }

    pub fn set_access(&mut self, access: EntityAccess) {
        self.access = access;
    }

    pub fn with_access(mut self, access: EntityAccess) -> EntitySchema {
        self.access = access;
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
