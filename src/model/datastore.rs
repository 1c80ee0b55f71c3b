use crate::common::BACKEND_DOCUMENT_STORE;

/// Reference to the physical collection backing an entity's *data*,
/// distinct from the metadata collection the catalog itself lives in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentStoreRef {
    pub datasource: Option<String>,
    pub database: Option<String>,
    pub collection: String,
}

impl DocumentStoreRef {
    pub fn new(collection: &str) -> DocumentStoreRef {
        DocumentStoreRef {
            datasource: None,
            database: None,
            collection: collection.to_string(),
        }
    }

    pub fn with_database(mut self, database: &str) -> DocumentStoreRef {
        self.database = Some(database.to_string());
        self
    }

    pub fn with_datasource(mut self, datasource: &str) -> DocumentStoreRef {
        self.datasource = Some(datasource.to_string());
        self
    }
}

/// A data-store reference as a tagged union.
///
/// The catalog only accepts the document-store variant; every other backend
/// kind parses successfully but is rejected with
/// [crate::errors::ErrorKind::InvalidDataStore] before any write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataStore {
    DocumentStore(DocumentStoreRef),
    /// A backend kind this catalog does not manage. Kept so that foreign
    /// metadata documents parse and report a precise rejection.
    Other { kind: String },
}

impl DataStore {
    pub fn document_store(collection: &str) -> DataStore {
        DataStore::DocumentStore(DocumentStoreRef::new(collection))
    }

    pub fn as_document_store(&self) -> Option<&DocumentStoreRef> {
        match self {
            DataStore::DocumentStore(store) => Some(store),
            DataStore::Other { .. } => None,
        }
    }

    /// The persisted backend tag.
    pub fn kind(&self) -> &str {
        match self {
            DataStore::DocumentStore(_) => BACKEND_DOCUMENT_STORE,
            DataStore::Other { kind } => kind,
        }
    }
}
