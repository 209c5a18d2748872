//! Report selection wizard

use super::{selected, DepartmentTarget, ReportType};
use crate::actions::Action;
use crate::error::{AppError, Result};
use crate::services::ReportService;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportSelectionWizard {
    #[serde(default)]
    pub report_type: ReportType,
    #[serde(default)]
    pub student_id: Option<String>,
    /// Department id, or `"all"`
    #[serde(default)]
    pub department_id: Option<String>,
}

impl ReportSelectionWizard {
    pub fn new(report_type: ReportType) -> Self {
        Self {
            report_type,
            ..Default::default()
        }
    }

    /// Switch mode, clearing the field the new mode does not use
    pub fn set_report_type(&mut self, report_type: ReportType) {
        self.report_type = report_type;
        match report_type {
            ReportType::Single => self.department_id = None,
            ReportType::Department => self.student_id = None,
        }
    }

    /// Validate the selection and generate the matching report.
    ///
    /// Generation failures are wrapped with the report type; validation
    /// failures are returned as they are.
    pub async fn submit(&self, reports: &ReportService) -> Result<Action> {
        match self.report_type {
            ReportType::Single => {
                let student_id = selected(&self.student_id)
                    .ok_or_else(|| AppError::validation("Please select a student."))?;

                tracing::info!("Generating single student report for {}", student_id);
                reports
                    .student_report(student_id)
                    .await
                    .map_err(|e| AppError::generation("Error generating single student report", e))
            }
            ReportType::Department => {
                let department_id = selected(&self.department_id)
                    .ok_or_else(|| AppError::validation("Please select a department."))?;

                tracing::info!("Generating department report for {}", department_id);
                reports
                    .department_report(DepartmentTarget::parse(department_id))
                    .await
                    .map_err(|e| AppError::generation("Error generating department report", e))
            }
        }
    }
}
