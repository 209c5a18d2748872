//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here and made available through AppState.

use crate::config::{BLOBS_DIR, DATABASE_FILE};
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::reporting::renderer_from_settings;
use crate::services::settings::AppSettings;
use crate::services::{
    AttachmentsService, LookupService, ReportService, SettingsService, StudentsService,
};
use crate::storage::BlobStore;
use sqlx::SqlitePool;
use std::path::PathBuf;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
    pub settings: AppSettings,
    pub students_service: StudentsService,
    pub lookup_service: LookupService,
    pub attachments_service: AttachmentsService,
    pub report_service: ReportService,
}

impl AppState {
    /// Open (or create) the data directory and bring every service up.
    pub async fn initialize(data_dir: PathBuf) -> Result<Self> {
        tracing::info!("Initializing application");
        tracing::info!("Data directory: {:?}", data_dir);

        tokio::fs::create_dir_all(&data_dir).await?;

        let settings = SettingsService::new(data_dir.clone()).load().await?;
        let pool = create_pool(&data_dir.join(DATABASE_FILE)).await?;

        let state = Self::from_pool(data_dir, pool, settings).await?;

        tracing::info!("Application initialized successfully");
        Ok(state)
    }

    /// Build services over an existing pool. Blobs live under `data_dir`.
    ///
    /// Seeds the lookup tables, so the pool must already carry the schema.
    pub async fn from_pool(data_dir: PathBuf, pool: SqlitePool, settings: AppSettings) -> Result<Self> {
        let repo = Repository::new(pool);

        let blob_store = BlobStore::new(data_dir.join(BLOBS_DIR));
        blob_store.initialize().await?;

        let lookup_service = LookupService::new(repo.clone());
        lookup_service.seed().await?;

        let renderer = renderer_from_settings(&settings.pdf)?;
        let attachments_service = AttachmentsService::new(
            repo.clone(),
            blob_store,
            settings.reports.download_endpoint.clone(),
        );
        let report_service = ReportService::new(repo.clone(), attachments_service.clone(), renderer);

        Ok(Self {
            data_dir,
            settings,
            students_service: StudentsService::new(repo),
            lookup_service,
            attachments_service,
            report_service,
        })
    }
}
