//! Lookup tables service
//!
//! Departments, institutes and degrees: startup seeding and the small
//! amount of administration users do on them.

use crate::config::{MAX_LOOKUP_NAME_LENGTH, SEED_DEGREES, SEED_DEPARTMENTS, SEED_INSTITUTES};
use crate::database::{Lookup, LookupKind, Repository};
use crate::error::{AppError, Result};

/// Canonical names each lookup table starts with
pub fn seed_names(kind: LookupKind) -> &'static [&'static str] {
    match kind {
        LookupKind::Department => SEED_DEPARTMENTS,
        LookupKind::Institute => SEED_INSTITUTES,
        LookupKind::Degree => SEED_DEGREES,
    }
}

/// Rows inserted by a seeding run
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SeedReport {
    pub departments: usize,
    pub institutes: usize,
    pub degrees: usize,
}

/// Service for lookup tables
#[derive(Clone)]
pub struct LookupService {
    repo: Repository,
}

impl LookupService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Insert every canonical name that is not present yet.
    ///
    /// Safe to run on every startup.
    pub async fn seed(&self) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        for kind in LookupKind::ALL {
            let mut inserted = 0;
            for name in seed_names(kind) {
                if self.repo.ensure_lookup(kind, name).await? {
                    inserted += 1;
                }
            }

            match kind {
                LookupKind::Department => report.departments = inserted,
                LookupKind::Institute => report.institutes = inserted,
                LookupKind::Degree => report.degrees = inserted,
            }
        }

        tracing::info!(
            "Seeded lookups: {} departments, {} institutes, {} degrees",
            report.departments,
            report.institutes,
            report.degrees
        );

        Ok(report)
    }

    pub async fn list(&self, kind: LookupKind) -> Result<Vec<Lookup>> {
        self.repo.list_lookups(kind).await
    }

    pub async fn get(&self, kind: LookupKind, id: &str) -> Result<Lookup> {
        self.repo.get_lookup(kind, id).await
    }

    pub async fn create(&self, kind: LookupKind, name: &str) -> Result<Lookup> {
        let name = validate_name(kind, name)?;
        tracing::info!("Creating {}: {}", kind.entity_name(), name);
        self.repo.create_lookup(kind, &name).await
    }

    pub async fn rename(&self, kind: LookupKind, id: &str, name: &str) -> Result<Lookup> {
        let name = validate_name(kind, name)?;
        tracing::info!("Renaming {} {} to {}", kind.entity_name(), id, name);
        self.repo.rename_lookup(kind, id, &name).await
    }

    /// Delete a lookup row; refused while any record references it
    pub async fn delete(&self, kind: LookupKind, id: &str) -> Result<()> {
        tracing::info!("Deleting {}: {}", kind.entity_name(), id);
        self.repo.delete_lookup(kind, id).await
    }
}

fn validate_name(kind: LookupKind, name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation(format!(
            "{} name is required.",
            kind.entity_name()
        )));
    }
    if name.chars().count() > MAX_LOOKUP_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "{} name must be at most {} characters.",
            kind.entity_name(),
            MAX_LOOKUP_NAME_LENGTH
        )));
    }
    Ok(name.to_string())
}
