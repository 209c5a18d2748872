//! Services module
//!
//! Business logic services that coordinate between commands and repository.

pub mod attachments;
pub mod lookups;
pub mod reports;
pub mod settings;
pub mod students;

pub use attachments::AttachmentsService;
pub use lookups::LookupService;
pub use reports::ReportService;
pub use settings::SettingsService;
pub use students::StudentsService;
