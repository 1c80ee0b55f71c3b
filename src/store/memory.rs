use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::common::{Document, Value, DOC_ID, INDEX_KEY, INDEX_NAME, INDEX_UNIQUE};
use crate::errors::{CatalogError, CatalogResult, ErrorKind};
use crate::model::IndexSortKey;
use crate::store::{DocumentCollection, IndexOptions};

/// In-memory [DocumentCollection] backed by an ordered map.
///
/// Used by the test suite and as the reference implementation of the
/// collection contract. Cloning is cheap; all clones share state.
#[derive(Clone)]
pub struct MemoryCollection {
    inner: Arc<MemoryCollectionInner>,
}

struct MemoryCollectionInner {
    name: String,
    state: RwLock<CollectionState>,
}

#[derive(Default)]
struct CollectionState {
    documents: IndexMap<String, Document>,
    indexes: Vec<Document>,
}

impl MemoryCollection {
    pub fn new(name: &str) -> MemoryCollection {
        MemoryCollection {
            inner: Arc::new(MemoryCollectionInner {
                name: name.to_string(),
                state: RwLock::new(CollectionState::default()),
            }),
        }
    }

    fn document_id(document: &Document) -> CatalogResult<String> {
        match document.id() {
            Some(id) => Ok(id.to_string()),
            None => Err(CatalogError::new(
                &format!("Document has no {} field", DOC_ID),
                ErrorKind::InvalidArgument,
            )),
        }
    }

    fn auto_index_name(fields: &[IndexSortKey]) -> String {
        fields
            .iter()
            .map(|key| format!("{}_{}", key.field, key.order.direction()))
            .collect::<Vec<String>>()
            .join("_")
    }
}

impl DocumentCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn find_by_id(&self, id: &str) -> CatalogResult<Option<Document>> {
        let state = self.inner.state.read();
        Ok(state.documents.get(id).cloned())
    }

    fn find_with_field(
        &self,
        eq_field: &str,
        eq_value: &Value,
        present: &str,
    ) -> CatalogResult<Vec<Document>> {
        let state = self.inner.state.read();
        Ok(state
            .documents
            .values()
            .filter(|doc| doc.get(eq_field) == Some(eq_value) && doc.contains_key(present))
            .cloned()
            .collect())
    }

    fn distinct_strings(&self, field: &str) -> CatalogResult<Vec<String>> {
        let state = self.inner.state.read();
        let mut seen = Vec::new();
        for doc in state.documents.values() {
            if let Some(Value::String(value)) = doc.get(field) {
                if !seen.contains(value) {
                    seen.push(value.clone());
                }
            }
        }
        Ok(seen)
    }

    fn insert(&self, document: Document) -> CatalogResult<()> {
        let id = Self::document_id(&document)?;
        let mut state = self.inner.state.write();
        if state.documents.contains_key(&id) {
            return Err(CatalogError::new(
                &format!("Duplicate key '{}' in collection {}", id, self.inner.name),
                ErrorKind::DuplicateKey,
            ));
        }
        state.documents.insert(id, document);
        Ok(())
    }

    fn replace_by_id(&self, id: &str, document: Document) -> CatalogResult<bool> {
        let mut state = self.inner.state.write();
        if !state.documents.contains_key(id) {
            return Ok(false);
        }
        state.documents.insert(id.to_string(), document);
        Ok(true)
    }

    fn remove_by_id(&self, id: &str) -> CatalogResult<bool> {
        let mut state = self.inner.state.write();
        Ok(state.documents.shift_remove(id).is_some())
    }

    fn list_indexes(&self) -> CatalogResult<Vec<Document>> {
        let state = self.inner.state.read();
        Ok(state.indexes.clone())
    }

    fn create_index(&self, fields: &[IndexSortKey], options: &IndexOptions) -> CatalogResult<()> {
        if fields.is_empty() {
            return Err(CatalogError::new(
                "Cannot create an index with no fields",
                ErrorKind::InvalidArgument,
            ));
        }
        let name = options
            .name
            .clone()
            .unwrap_or_else(|| Self::auto_index_name(fields));

        let mut key = Document::new();
        for sort_key in fields {
            key.put(&sort_key.field, sort_key.order.direction())?;
        }
        let mut descriptor = Document::new();
        descriptor.put(INDEX_KEY, key)?;
        descriptor.put(INDEX_NAME, name.as_str())?;
        descriptor.put(INDEX_UNIQUE, options.unique)?;

        let mut state = self.inner.state.write();
        if state
            .indexes
            .iter()
            .any(|idx| idx.get(INDEX_NAME) == Some(&Value::String(name.clone())))
        {
            return Err(CatalogError::new(
                &format!("Index '{}' already exists on {}", name, self.inner.name),
                ErrorKind::DuplicateKey,
            ));
        }
        state.indexes.push(descriptor);
        Ok(())
    }

    fn drop_index(&self, name: &str) -> CatalogResult<()> {
        let mut state = self.inner.state.write();
        let before = state.indexes.len();
        state
            .indexes
            .retain(|idx| idx.get(INDEX_NAME) != Some(&Value::String(name.to_string())));
        if state.indexes.len() == before {
            return Err(CatalogError::new(
                &format!("No index '{}' on {}", name, self.inner.name),
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(())
    }
}
