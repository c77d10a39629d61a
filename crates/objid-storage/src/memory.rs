//! In-memory storage implementation for testing and local runs.
//!
//! Blobs live in a `DashMap` keyed by path. Optimistic updates use the
//! entry API so the version comparison and the write happen under the same
//! shard lock.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::instrument;

use crate::error::{HealthStatus, StorageError, StorageResult};
use crate::traits::{Blob, BlobPath, BlobStore};

/// In-memory implementation of BlobStore.
///
/// # Performance Characteristics
///
/// - **Read**: O(1) (DashMap lookup, clones the JSON value)
/// - **Optimistic update**: O(1) under a single shard lock
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, Blob>,
}

impl MemoryBlobStore {
    /// Creates a new in-memory blob store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory blob store wrapped in Arc.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Unconditionally writes a blob, bumping its version.
    ///
    /// Used to seed data; request paths go through `optimistic_update`.
    pub fn put(&self, path: &BlobPath, value: serde_json::Value) -> Blob {
        let mut entry = self.blobs.entry(path.as_str().to_string()).or_insert(Blob {
            value: serde_json::Value::Null,
            version: 0,
        });
        entry.value = value;
        entry.version += 1;
        entry.clone()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn read(&self, path: &BlobPath) -> StorageResult<Option<Blob>> {
        Ok(self.blobs.get(path.as_str()).map(|b| b.value().clone()))
    }

    #[instrument(skip(self, value), fields(path = %path))]
    async fn optimistic_update(
        &self,
        path: &BlobPath,
        expected_version: Option<u64>,
        value: serde_json::Value,
    ) -> StorageResult<Blob> {
        match self.blobs.entry(path.as_str().to_string()) {
            Entry::Occupied(mut entry) => {
                let current = entry.get().version;
                if expected_version != Some(current) {
                    return Err(StorageError::VersionConflict {
                        path: path.to_string(),
                        expected: expected_version,
                        actual: Some(current),
                    });
                }
                let blob = Blob {
                    value,
                    version: current + 1,
                };
                entry.insert(blob.clone());
                Ok(blob)
            }
            Entry::Vacant(entry) => {
                if expected_version.is_some() {
                    return Err(StorageError::VersionConflict {
                        path: path.to_string(),
                        expected: expected_version,
                        actual: None,
                    });
                }
                let blob = Blob { value, version: 1 };
                entry.insert(blob.clone());
                Ok(blob)
            }
        }
    }

    async fn health_check(&self) -> StorageResult<HealthStatus> {
        Ok(HealthStatus {
            healthy: true,
            backend: "memory",
        })
    }
}
