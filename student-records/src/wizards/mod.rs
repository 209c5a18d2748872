//! Transient wizard state
//!
//! Wizards are request-scoped parameter forms for one-shot actions. They are
//! built from the caller's input, validated on submit and then dropped.

mod email;
mod report_selection;

pub use email::EmailWizard;
pub use report_selection::ReportSelectionWizard;

use crate::config::ALL_DEPARTMENTS_LABEL;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which report a wizard produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    #[default]
    Single,
    Department,
}

impl FromStr for ReportType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "single" => Ok(ReportType::Single),
            "department" => Ok(ReportType::Department),
            _ => Err(AppError::validation("Invalid report type selected.")),
        }
    }
}

/// Departments a department report covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepartmentTarget {
    All,
    Department(String),
}

impl DepartmentTarget {
    /// `"all"` in any case selects every department, anything else is an id
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case(ALL_DEPARTMENTS_LABEL) {
            DepartmentTarget::All
        } else {
            DepartmentTarget::Department(value.to_string())
        }
    }
}

/// Treat blank ids as unselected
fn selected(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
