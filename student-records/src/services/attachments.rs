//! Attachments service
//!
//! Persists generated reports: bytes go to the BlobStore, metadata to the
//! Repository. Attachments are created once and never updated.

use crate::config::MAX_ATTACHMENT_NAME_LENGTH;
use crate::database::{Attachment, RecordLink, Repository};
use crate::error::{AppError, Result};
use crate::storage::BlobStore;

/// Service for managing attachments
#[derive(Clone)]
pub struct AttachmentsService {
    repo: Repository,
    blob_store: BlobStore,
    download_endpoint: String,
}

impl AttachmentsService {
    pub fn new(repo: Repository, blob_store: BlobStore, download_endpoint: impl Into<String>) -> Self {
        Self {
            repo,
            blob_store,
            download_endpoint: download_endpoint.into(),
        }
    }

    /// Store binary data and record it as an attachment.
    ///
    /// If the metadata insert fails, a blob written by this call is removed
    /// again so nothing half-created remains.
    pub async fn create_attachment(
        &self,
        name: &str,
        mime_type: &str,
        data: &[u8],
        link: Option<&RecordLink>,
    ) -> Result<Attachment> {
        tracing::info!("Creating attachment: {} ({} bytes)", name, data.len());

        if data.is_empty() {
            return Err(AppError::Generic(format!("Refusing to store empty attachment {}", name)));
        }

        let safe_name = sanitize_filename(name);
        let blob = self.blob_store.write(data).await?;

        let attachment = match self
            .repo
            .create_attachment(&safe_name, mime_type, &blob.hash, data.len() as i64, link)
            .await
        {
            Ok(attachment) => attachment,
            Err(e) => {
                if blob.created {
                    if let Err(cleanup) = self.blob_store.delete(&blob.hash).await {
                        tracing::warn!("Failed to remove orphaned blob {}: {}", blob.hash, cleanup);
                    }
                }
                return Err(e);
            }
        };

        tracing::info!("Attachment created: {}", attachment.id);
        Ok(attachment)
    }

    pub async fn get_attachment(&self, attachment_id: &str) -> Result<Attachment> {
        self.repo.get_attachment(attachment_id).await
    }

    /// Get attachment bytes by attachment ID
    pub async fn get_attachment_data(&self, attachment_id: &str) -> Result<Vec<u8>> {
        let attachment = self.repo.get_attachment(attachment_id).await?;
        self.blob_store.read(&attachment.blob_hash).await
    }

    /// List attachments linked to a record type, optionally one record
    pub async fn list_attachments(&self, record_type: &str, record_id: Option<&str>) -> Result<Vec<Attachment>> {
        self.repo.list_attachments(record_type, record_id).await
    }

    /// URL the front end downloads an attachment from
    pub fn download_url(&self, attachment: &Attachment) -> String {
        format!(
            "{}/{}?download=true",
            self.download_endpoint.trim_end_matches('/'),
            attachment.id
        )
    }
}

/// Sanitize filename to prevent path traversal.
///
/// Over-long names are shortened before the extension, which is kept.
fn sanitize_filename(filename: &str) -> String {
    let clean: String = filename
        .chars()
        .filter(|c| *c != '/' && *c != '\\' && *c != '\0')
        .collect();

    if clean.chars().count() <= MAX_ATTACHMENT_NAME_LENGTH {
        return clean;
    }

    let (stem, extension) = match clean.rfind('.') {
        Some(dot) if dot > 0 => clean.split_at(dot),
        _ => (clean.as_str(), ""),
    };
    let room = MAX_ATTACHMENT_NAME_LENGTH.saturating_sub(extension.chars().count());
    if room == 0 {
        return clean.chars().take(MAX_ATTACHMENT_NAME_LENGTH).collect();
    }

    let mut name: String = stem.chars().take(room).collect();
    name.push_str(extension);
    name
}
