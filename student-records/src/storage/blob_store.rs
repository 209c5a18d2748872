//! Content-addressed blob storage
//!
//! Holds the bytes of generated report attachments, keyed by SHA-256 hash.
//! Files are organized in a two-level directory structure.
//!
//! Example: hash "abcd1234..." is stored at "blobs/ab/cd/abcd1234..."

use crate::error::{AppError, Result};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Outcome of a blob write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub hash: String,
    /// False when identical content was already stored
    pub created: bool,
}

/// Content-addressed blob store
#[derive(Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a new blob store at the given root directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Initialize the blob store (create directory if needed)
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("Blob store initialized at: {:?}", self.root);
        Ok(())
    }

    /// Write data to the blob store
    pub async fn write(&self, data: &[u8]) -> Result<StoredBlob> {
        let hash = calculate_hash(data);
        let path = self.get_path(&hash)?;

        if fs::try_exists(&path).await? {
            tracing::debug!("Blob already exists: {}", hash);
            return Ok(StoredBlob {
                hash,
                created: false,
            });
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write to a temp file first so readers never see a partial blob
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        fs::rename(temp_path, &path).await?;

        tracing::debug!("Wrote blob: {} ({} bytes)", hash, data.len());

        Ok(StoredBlob {
            hash,
            created: true,
        })
    }

    /// Read data from the blob store
    pub async fn read(&self, hash: &str) -> Result<Vec<u8>> {
        let path = self.get_path(hash)?;

        if !fs::try_exists(&path).await? {
            return Err(AppError::BlobStore(format!("Blob not found: {}", hash)));
        }

        let data = fs::read(&path).await?;
        tracing::debug!("Read blob: {} ({} bytes)", hash, data.len());

        Ok(data)
    }

    /// Check if a blob exists
    pub async fn exists(&self, hash: &str) -> Result<bool> {
        let path = self.get_path(hash)?;
        Ok(fs::try_exists(&path).await?)
    }

    /// Delete a blob
    pub async fn delete(&self, hash: &str) -> Result<()> {
        let path = self.get_path(hash)?;

        if !fs::try_exists(&path).await? {
            return Ok(());
        }

        fs::remove_file(&path).await?;
        tracing::debug!("Deleted blob: {}", hash);

        Ok(())
    }

    /// Get file path for a hash
    fn get_path(&self, hash: &str) -> Result<PathBuf> {
        if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AppError::BlobStore(format!("Invalid blob hash: {}", hash)));
        }

        Ok(self.root.join(&hash[0..2]).join(&hash[2..4]).join(hash))
    }
}

/// SHA-256 of the data as lowercase hex
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
