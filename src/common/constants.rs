// document constants
pub const DOC_ID: &str = "_id";
pub const PROP_NAME: &str = "name";
pub const PROP_VERSION: &str = "version";
pub const PROP_VALUE: &str = "value";

/// Reserved separator between entity name and version in document identity
/// keys. Guaranteed not to appear in entity names or versions; this is a
/// durable on-disk contract: `"<name>|"` keys info documents and
/// `"<name>|<version>"` keys schema documents in the same collection.
pub const DELIMITER_ID: &str = "|";

// persisted metadata document fields
pub const PROP_DEFAULT_VERSION: &str = "defaultVersion";
pub const PROP_DATA_STORE: &str = "datastore";
pub const PROP_BACKEND: &str = "backend";
pub const PROP_DATASOURCE: &str = "datasource";
pub const PROP_DATABASE: &str = "database";
pub const PROP_COLLECTION: &str = "collection";
pub const PROP_INDEXES: &str = "indexes";
pub const PROP_FIELDS: &str = "fields";
pub const PROP_FIELD: &str = "field";
pub const PROP_DIR: &str = "dir";
pub const PROP_STATUS: &str = "status";
pub const PROP_LOG: &str = "log";
pub const PROP_DATE: &str = "date";
pub const PROP_COMMENT: &str = "comment";
pub const PROP_ACCESS: &str = "access";
pub const PROP_FIND: &str = "find";
pub const PROP_INSERT: &str = "insert";
pub const PROP_UPDATE: &str = "update";
pub const PROP_DELETE: &str = "delete";
pub const PROP_TYPE: &str = "type";
pub const PROP_ITEMS: &str = "items";
pub const PROP_ENTITY: &str = "entity";
pub const PROP_VERSION_VALUE: &str = "versionValue";
pub const PROP_QUERY: &str = "query";
pub const PROP_PROJECTION: &str = "projection";
pub const PROP_SORT: &str = "sort";
pub const PROP_EXTEND_VERSIONS: &str = "extendVersions";
pub const PROP_CHANGELOG: &str = "changelog";

// persisted sort directions
pub const DIR_ASC: &str = "$asc";
pub const DIR_DESC: &str = "$desc";

// structural field types
pub const TYPE_OBJECT: &str = "object";
pub const TYPE_ARRAY: &str = "array";
pub const TYPE_REFERENCE: &str = "reference";

// live index document constants, as reported by the backing store driver
pub const INDEX_KEY: &str = "key";
pub const INDEX_NAME: &str = "name";
pub const INDEX_UNIQUE: &str = "unique";

// status literals
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_DEPRECATED: &str = "deprecated";
pub const STATUS_DISABLED: &str = "disabled";

// data store backends
pub const BACKEND_DOCUMENT_STORE: &str = "document";

// predefined fields injected into every entity
pub const FIELD_OBJECT_TYPE: &str = "objectType";
pub const TYPE_UID: &str = "uid";
pub const TYPE_STRING: &str = "string";

pub const DEFAULT_METADATA_COLLECTION: &str = "metadata";

pub const METACAT_VERSION: &str = env!("CARGO_PKG_VERSION");
