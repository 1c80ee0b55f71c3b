use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::errors::CatalogResult;
use crate::model::DocumentStoreRef;
use crate::store::{DocumentCollection, MemoryCollection};

/// Maps a [DocumentStoreRef] to a live [DocumentCollection].
///
/// The catalog never opens connections itself; everything it knows about
/// entity data collections goes through this seam.
pub trait CollectionResolver: Send + Sync {
    fn resolve(&self, store: &DocumentStoreRef) -> CatalogResult<Arc<dyn DocumentCollection>>;
}

/// Resolver over in-memory collections, created on demand and cached by
/// their full (datasource, database, collection) coordinates.
#[derive(Clone, Default)]
pub struct MemoryResolver {
    collections: Arc<RwLock<IndexMap<String, Arc<dyn DocumentCollection>>>>,
}

impl MemoryResolver {
    pub fn new() -> MemoryResolver {
        MemoryResolver::default()
    }

    /// Pre-registers a collection under the given coordinates, replacing any
    /// cached one. Lets tests substitute instrumented collections.
    pub fn register(&self, store: &DocumentStoreRef, collection: Arc<dyn DocumentCollection>) {
        self.collections
            .write()
            .insert(Self::cache_key(store), collection);
    }

    fn cache_key(store: &DocumentStoreRef) -> String {
        format!(
            "{}/{}/{}",
            store.datasource.as_deref().unwrap_or(""),
            store.database.as_deref().unwrap_or(""),
            store.collection
        )
    }
}

impl CollectionResolver for MemoryResolver {
    fn resolve(&self, store: &DocumentStoreRef) -> CatalogResult<Arc<dyn DocumentCollection>> {
        let key = Self::cache_key(store);
        if let Some(collection) = self.collections.read().get(&key) {
            return Ok(Arc::clone(collection));
        }
        let mut collections = self.collections.write();
        let collection = collections
            .entry(key)
            .or_insert_with(|| Arc::new(MemoryCollection::new(&store.collection)));
        Ok(Arc::clone(collection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn test_resolve_caches_by_coordinates() {
        let resolver = MemoryResolver::new();
        let users = DocumentStoreRef::new("users");
        let first = resolver.resolve(&users).unwrap();
        first.insert(doc! { "_id": "1" }).unwrap();

        let second = resolver.resolve(&users).unwrap();
        assert!(second.find_by_id("1").unwrap().is_some());

        let elsewhere = resolver.resolve(&DocumentStoreRef::new("users").with_database("other"));
        assert!(elsewhere.unwrap().find_by_id("1").unwrap().is_none());
    }

    #[test]
    fn test_register_replaces_cached_collection() {
        let resolver = MemoryResolver::new();
        let users = DocumentStoreRef::new("users");
        resolver.resolve(&users).unwrap().insert(doc! { "_id": "1" }).unwrap();

        resolver.register(&users, Arc::new(MemoryCollection::new("users")));
        assert!(resolver.resolve(&users).unwrap().find_by_id("1").unwrap().is_none());
    }
}
