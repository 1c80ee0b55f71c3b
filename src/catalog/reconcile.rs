//! Convergence of a data collection's live indexes toward the declared index
//! set of an entity.
//!
//! Reconciliation is idempotent: running it twice against an unchanged
//! declaration performs no writes on the second run. Live indexes with no
//! declared counterpart are left alone.

use crate::common::{Document, INDEX_KEY, INDEX_NAME, INDEX_UNIQUE};
use crate::errors::{CatalogError, CatalogResult, ErrorKind};
use crate::model::{EntityInfo, Index};
use crate::store::{CollectionResolver, DocumentCollection, IndexOptions};

/// Brings the live indexes of the entity's data collection in line with the
/// declared index set of `info`.
pub fn create_update_entity_indexes(
    resolver: &dyn CollectionResolver,
    info: &EntityInfo,
) -> CatalogResult<()> {
    do_create_update(resolver, info).map_err(|e| e.push_context("createUpdateIndex"))
}

fn do_create_update(resolver: &dyn CollectionResolver, info: &EntityInfo) -> CatalogResult<()> {
    let store = info.data_store().as_document_store().ok_or_else(|| {
        CatalogError::new(info.data_store().kind(), ErrorKind::InvalidDataStore)
    })?;
    let collection = resolver.resolve(store)?;
    reconcile_indexes(collection.as_ref(), info.indexes())
}

/// Reconciles one collection against a declared index set.
///
/// For each declared index: a field-equivalent live index with matching
/// options is kept; one with differing options is dropped and recreated; if
/// none exists the index is created. Driver failures surface as
/// [ErrorKind::EntityIndexNotCreated].
pub fn reconcile_indexes(
    collection: &dyn DocumentCollection,
    declared: &[Index],
) -> CatalogResult<()> {
    let live = collection
        .list_indexes()
        .map_err(index_error)?;

    for index in declared {
        match live.iter().find(|doc| index_fields_match(doc, index)) {
            Some(existing) if index_options_match(existing, index) => {
                log::debug!("Index {} already in place on {}", index, collection.name());
            }
            Some(existing) => {
                let name = existing
                    .get(INDEX_NAME)
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| {
                        CatalogError::new(
                            &format!(
                                "Live index on {} matching {} has no name to drop",
                                collection.name(),
                                index
                            ),
                            ErrorKind::EntityIndexNotCreated,
                        )
                    })?;
                log::info!(
                    "Recreating index {} on {}: options changed",
                    name,
                    collection.name()
                );
                collection.drop_index(name).map_err(index_error)?;
                create_index(collection, index)?;
            }
            None => {
                log::info!("Creating index {} on {}", index, collection.name());
                create_index(collection, index)?;
            }
        }
    }
    Ok(())
}

fn create_index(collection: &dyn DocumentCollection, index: &Index) -> CatalogResult<()> {
    let name = index
        .name()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let options = IndexOptions {
        unique: index.is_unique(),
        name,
    };
    collection
        .create_index(index.fields(), &options)
        .map_err(index_error)
}

fn index_error(cause: CatalogError) -> CatalogError {
    let message = cause.message().to_string();
    CatalogError::new_with_cause(&message, ErrorKind::EntityIndexNotCreated, cause)
}

/// Field-equivalence between a live index descriptor and a declared index:
/// same field paths with the same directions, in the same order.
///
/// A live descriptor with no key document at all is treated as matching any
/// declared index, so malformed driver output stops reconciliation from
/// piling up duplicate indexes.
pub(crate) fn index_fields_match(live: &Document, declared: &Index) -> bool {
    let key = match live.get(INDEX_KEY).and_then(|v| v.as_document()) {
        Some(key) => key,
        None => return true,
    };
    if key.len() != declared.fields().len() {
        return false;
    }
    key.iter()
        .zip(declared.fields())
        .all(|((live_field, live_dir), declared_key)| {
            if live_field != &declared_key.field {
                return false;
            }
            let live_descending = live_dir.as_number().map(|d| d < 0.0).unwrap_or(false);
            live_descending == declared_key.order.is_descending()
        })
}

/// Option-equivalence: the uniqueness flags agree. A live descriptor without
/// a `unique` field is non-unique.
pub(crate) fn index_options_match(live: &Document, declared: &Index) -> bool {
    let live_unique = live
        .get(INDEX_UNIQUE)
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    live_unique == declared.is_unique()
}
