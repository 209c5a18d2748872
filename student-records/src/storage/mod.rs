//! Storage module
//!
//! Provides blob storage for the bytes of generated reports.

pub mod blob_store;

pub use blob_store::{BlobStore, StoredBlob};
