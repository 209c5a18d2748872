//! Settings service
//!
//! Manages application settings persistence using JSON file storage.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Which engine turns report HTML into PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfEngine {
    #[default]
    Builtin,
    Command,
}

/// PDF rasterization settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfSettings {
    #[serde(default)]
    pub engine: PdfEngine,
    /// External converter reading HTML on stdin and writing PDF on stdout
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Report delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Path prefix of the attachment download endpoint
    #[serde(default = "default_download_endpoint")]
    pub download_endpoint: String,
}

fn default_download_endpoint() -> String {
    "/web/content".to_string()
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            download_endpoint: default_download_endpoint(),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub reports: ReportSettings,
    #[serde(default)]
    pub pdf: PdfSettings,
}

/// Service for managing application settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join("settings.json"),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<AppSettings> {
        if !fs::try_exists(&self.settings_path).await? {
            tracing::info!("Settings file not found, creating default settings");
            let default = AppSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: AppSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Generic(format!("Failed to parse settings: {}", e)))?;

        Ok(settings)
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        let content = serde_json::to_string_pretty(settings)?;

        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }
}
