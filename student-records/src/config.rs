//! Application configuration constants
//!
//! Central location for seed data, report placeholders and validation
//! boundaries used throughout the application. Runtime-tunable values
//! live in `services::settings`.

// ===== Seed Data =====

/// Departments created on first startup
pub const SEED_DEPARTMENTS: &[&str] = &["MATH", "BSCS", "PHYSICS", "BBA", "COMMERCE", "ALL"];

/// Institutes created on first startup
pub const SEED_INSTITUTES: &[&str] = &["Superior", "Aspire", "Degree", "GUCF", "Punjab"];

/// Degrees created on first startup
pub const SEED_DEGREES: &[&str] = &["Matric", "FSc", "BSc", "MPhil"];

// ===== Reports =====

/// Label used for a department report spanning every department.
/// A department carrying exactly this name also selects the full report.
pub const ALL_DEPARTMENTS_LABEL: &str = "ALL";

/// Cell value for missing data
pub const EMPTY_CELL: &str = "-";

/// Group heading for students whose department cannot be resolved
pub const NO_DEPARTMENT_LABEL: &str = "No Department";

/// Report title fallback when a student has a blank name
pub const UNKNOWN_STUDENT_TITLE: &str = "Unknown Student";

/// Attachment file stem fallback when a student has a blank name
pub const STUDENT_FILE_FALLBACK: &str = "Student";

pub const EMPTY_DEPARTMENT_MESSAGE: &str = "No students in this department";
pub const EMPTY_REPORT_MESSAGE: &str = "No student records found for this department";
pub const EMPTY_EDUCATION_MESSAGE: &str = "No education history available";

/// MIME type of generated reports
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Record type that student report attachments are linked to
pub const STUDENT_RECORD_TYPE: &str = "student";

// ===== Validation Limits =====

/// Maximum length of a stored attachment name
pub const MAX_ATTACHMENT_NAME_LENGTH: usize = 255;

/// Maximum length for lookup names (department, institute, degree)
pub const MAX_LOOKUP_NAME_LENGTH: usize = 128;

// ===== Storage Layout =====

/// SQLite database file inside the data directory
pub const DATABASE_FILE: &str = "students.db";

/// Blob store directory inside the data directory
pub const BLOBS_DIR: &str = "blobs";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "STUDENT_RECORDS_DATA_DIR";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_list_sizes() {
        assert_eq!(SEED_DEPARTMENTS.len(), 6);
        assert_eq!(SEED_INSTITUTES.len(), 5);
        assert_eq!(SEED_DEGREES.len(), 4);
        assert!(SEED_DEPARTMENTS.contains(&ALL_DEPARTMENTS_LABEL));
    }
}
