//! Database models
//!
//! Rust structs representing database entities.
//! All models use serde for serialization to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle status shared by students and education records.
///
/// Archived rows are hidden from default listings but never destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Active,
    Archived,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Human-readable label shown in reports
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

/// The three reference tables share one shape and differ only by table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupKind {
    Department,
    Institute,
    Degree,
}

impl LookupKind {
    pub const ALL: [LookupKind; 3] = [LookupKind::Department, LookupKind::Institute, LookupKind::Degree];

    pub fn table(self) -> &'static str {
        match self {
            LookupKind::Department => "departments",
            LookupKind::Institute => "institutes",
            LookupKind::Degree => "degrees",
        }
    }

    pub fn entity_name(self) -> &'static str {
        match self {
            LookupKind::Department => "Department",
            LookupKind::Institute => "Institute",
            LookupKind::Degree => "Degree",
        }
    }
}

/// A department, institute or degree row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lookup {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A student record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: String,
    pub status: RecordStatus,
    pub name: String,
    pub father_name: Option<String>,
    pub age: i64,
    pub grade: Option<String>,
    pub address: Option<String>,
    pub department_id: String,
    pub gender: Option<Gender>,
    pub total_marks: f64,
    pub obtained_marks: f64,
    /// Derived from the marks, see [`compute_percentage`]
    pub percentage: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }
}

/// Student joined with the name of its department, if it still resolves
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StudentDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub student: Student,
    pub department_name: Option<String>,
}

/// Validated input for a new student
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub father_name: Option<String>,
    pub age: i64,
    pub grade: Option<String>,
    pub address: Option<String>,
    pub department_id: String,
    pub gender: Option<Gender>,
    pub total_marks: f64,
    pub obtained_marks: f64,
}

/// Create student request.
///
/// Required fields are optional here so that their absence is reported as
/// a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateStudentRequest {
    pub name: Option<String>,
    pub father_name: Option<String>,
    pub age: Option<i64>,
    pub grade: Option<String>,
    pub address: Option<String>,
    pub department_id: Option<String>,
    pub gender: Option<Gender>,
    pub total_marks: Option<f64>,
    pub obtained_marks: Option<f64>,
}

/// Update student request. Blank strings clear optional text fields and
/// `clear_gender` unsets the gender.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStudentRequest {
    pub id: String,
    pub name: Option<String>,
    pub father_name: Option<String>,
    pub age: Option<i64>,
    pub grade: Option<String>,
    pub address: Option<String>,
    pub department_id: Option<String>,
    pub gender: Option<Gender>,
    #[serde(default)]
    pub clear_gender: bool,
    pub total_marks: Option<f64>,
    pub obtained_marks: Option<f64>,
}

impl UpdateStudentRequest {
    /// Whether the update touches an input of the derived percentage
    pub fn touches_marks(&self) -> bool {
        self.total_marks.is_some() || self.obtained_marks.is_some()
    }
}

/// Education history entry owned by a student
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EducationRecord {
    pub id: String,
    pub student_id: String,
    pub institute_id: String,
    pub degree_id: String,
    pub passing_year: Option<i64>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
}

/// Education record with resolved institute and degree names
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EducationDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: EducationRecord,
    pub institute_name: Option<String>,
    pub degree_name: Option<String>,
}

/// Create education record request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEducationRequest {
    pub student_id: String,
    pub institute_id: Option<String>,
    pub degree_id: Option<String>,
    pub passing_year: Option<i64>,
}

/// Stored binary produced by report generation
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    /// SHA-256 hash of the content in the blob store
    pub blob_hash: String,
    pub size: i64,
    pub linked_record_type: Option<String>,
    pub linked_record_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Record an attachment is linked to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLink {
    pub record_type: String,
    pub record_id: Option<String>,
}

impl RecordLink {
    pub fn student(id: &str) -> Self {
        Self {
            record_type: crate::config::STUDENT_RECORD_TYPE.to_string(),
            record_id: Some(id.to_string()),
        }
    }

    /// Linked to the student model but to no particular record
    pub fn student_model() -> Self {
        Self {
            record_type: crate::config::STUDENT_RECORD_TYPE.to_string(),
            record_id: None,
        }
    }
}

/// Derived percentage of a student's marks.
///
/// Zero when no total is recorded.
pub fn compute_percentage(total_marks: f64, obtained_marks: f64) -> f64 {
    if total_marks > 0.0 {
        obtained_marks / total_marks * 100.0
    } else {
        0.0
    }
}

/// Trim text input, treating blank strings as absent.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
