//! Per-type metadata cache.

use std::{
    any::TypeId,
    collections::HashMap,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
};

use super::{FieldMetadata, RecordDescriptor};

/// Cache of [`FieldMetadata`] keyed by the record type.
///
/// Metadata for each type is built at most once, even if multiple threads request it concurrently.
/// Entries are never evicted.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: RwLock<HashMap<TypeId, Arc<[FieldMetadata]>>>,
    build_count: AtomicUsize,
}

impl MetadataCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns metadata for the described record, building it on the first call for the record type.
    pub fn get_or_build(&self, descriptor: &RecordDescriptor) -> Arc<[FieldMetadata]> {
        let type_id = descriptor.ty.id();
        {
            // Entries are immutable once inserted, so a poisoned lock still guards consistent data.
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(metadata) = entries.get(&type_id) {
                return metadata.clone();
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have built the entry while we were waiting for the write lock.
        if let Some(metadata) = entries.get(&type_id) {
            return metadata.clone();
        }

        let metadata: Arc<[FieldMetadata]> = Self::build(descriptor).into();
        self.build_count.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            ty = descriptor.ty.name_in_code(),
            field_count = metadata.len(),
            "Built field metadata"
        );
        entries.insert(type_id, metadata.clone());
        metadata
    }

    fn build(descriptor: &RecordDescriptor) -> Vec<FieldMetadata> {
        descriptor
            .fields
            .iter()
            .enumerate()
            .filter_map(|(i, field)| FieldMetadata::from_descriptor(i, field))
            .collect()
    }

    /// Returns the number of record types with cached metadata.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Checks whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the total number of metadata builds performed by this cache.
    pub fn build_count(&self) -> usize {
        self.build_count.load(Ordering::Relaxed)
    }
}
