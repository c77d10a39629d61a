//! objid-storage: Blob storage abstraction layer
//!
//! App records and their event logs are persisted as JSON blobs addressed by
//! a path such as `apps://<appId>.json`. This crate provides:
//! - BlobStore trait for read and optimistic-update operations
//! - Blob path construction and validation
//! - In-memory implementation for testing and local runs
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               objid-storage                  │
//! ├─────────────────────────────────────────────┤
//! │  traits.rs   - BlobStore trait, BlobPath    │
//! │  memory.rs   - In-memory implementation     │
//! │  error.rs    - StorageError                 │
//! └─────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use error::{HealthStatus, StorageError, StorageResult};
pub use memory::MemoryBlobStore;
pub use traits::{Blob, BlobPath, BlobStore};
