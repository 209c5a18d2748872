//! Report building blocks
//!
//! - `format`: per-field cell formatters
//! - `rows`: typed rows for each report section and their grouping
//! - `html`: HTML synthesis
//! - `pdf`: HTML to PDF rasterization engines

pub mod format;
pub mod html;
pub mod pdf;
pub mod rows;

pub use pdf::{renderer_from_settings, BuiltinPdfRenderer, CommandPdfRenderer, PdfRenderer};
pub use rows::{DepartmentReport, StudentReport};
