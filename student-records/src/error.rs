//! Error types for the student records application
//!
//! All errors use thiserror for structured error handling.
//! These errors are serialized to the caller as plain messages.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing or malformed input, reported to the user verbatim
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} {id} is still referenced by {dependents} record(s)")]
    InUse {
        entity: &'static str,
        id: String,
        dependents: i64,
    },

    #[error("{0}")]
    Rendering(String),

    /// Failure raised while producing a report, prefixed at the wizard boundary
    #[error("{context}:\n{source}")]
    Generation {
        context: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Blob store error: {0}")]
    BlobStore(String),

    #[error("{0}")]
    Generic(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Wrap an error with the context of the report being generated.
    pub fn generation(context: impl Into<String>, source: AppError) -> Self {
        AppError::Generation {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Stable machine-readable code for the request protocol.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database",
            AppError::Io(_) => "io",
            AppError::Serialization(_) => "bad_params",
            AppError::Validation(_) => "validation",
            AppError::NotFound { .. } => "not_found",
            AppError::InUse { .. } => "in_use",
            AppError::Rendering(_) => "rendering",
            AppError::Generation { .. } => "generation",
            AppError::BlobStore(_) => "blob_store",
            AppError::Generic(_) => "error",
        }
    }

    /// Errors caused by the request itself rather than the infrastructure.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::NotFound { .. }
                | AppError::InUse { .. }
                | AppError::Rendering(_)
                | AppError::Generation { .. }
        )
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
