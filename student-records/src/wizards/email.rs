//! Email wizard
//!
//! Validates a recipient and a report target and confirms the send. No
//! report is rendered or attached.

use super::{selected, ReportType};
use crate::actions::{Action, Notification};
use crate::error::{AppError, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailWizard {
    #[serde(default)]
    pub report_type: ReportType,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub email_to: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl EmailWizard {
    /// Switch mode, clearing the field the new mode does not use
    pub fn set_report_type(&mut self, report_type: ReportType) {
        self.report_type = report_type;
        match report_type {
            ReportType::Single => self.department_id = None,
            ReportType::Department => self.student_id = None,
        }
    }

    pub fn submit(&self) -> Result<Action> {
        let email_to = selected(&self.email_to)
            .ok_or_else(|| AppError::validation("Recipient email is required!"))?;

        match self.report_type {
            ReportType::Single if selected(&self.student_id).is_none() => {
                return Err(AppError::validation(
                    "Please select a student for the single report.",
                ));
            }
            ReportType::Department if selected(&self.department_id).is_none() => {
                return Err(AppError::validation(
                    "Please select a department for the department report.",
                ));
            }
            _ => {}
        }

        tracing::info!("Report email confirmed for {}", email_to);

        Ok(Notification::success(
            "Success!",
            format!("Report sent successfully to {}.", email_to),
        )
        .then(Action::CloseWizard)
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wizard(report_type: ReportType) -> EmailWizard {
        EmailWizard {
            report_type,
            student_id: Some("s-1".to_string()),
            department_id: Some("d-1".to_string()),
            email_to: Some("teacher@example.com".to_string()),
            phone: None,
        }
    }

    #[test]
    fn test_blank_recipient_rejected_in_any_mode() {
        for report_type in [ReportType::Single, ReportType::Department] {
            let mut w = wizard(report_type);
            w.email_to = Some("   ".to_string());
            assert_eq!(w.submit().unwrap_err().to_string(), "Recipient email is required!");

            w.email_to = None;
            assert!(w.submit().is_err());
        }
    }

    #[test]
    fn test_single_requires_student() {
        let mut w = wizard(ReportType::Single);
        w.student_id = None;

        assert_eq!(
            w.submit().unwrap_err().to_string(),
            "Please select a student for the single report."
        );
    }

    #[test]
    fn test_department_requires_department() {
        let mut w = wizard(ReportType::Single);
        w.set_report_type(ReportType::Department);
        w.department_id = None;

        assert_eq!(
            w.submit().unwrap_err().to_string(),
            "Please select a department for the department report."
        );
    }

    #[test]
    fn test_success_names_recipient_and_closes() {
        let action = wizard(ReportType::Department).submit().unwrap();

        match action {
            Action::Notification(n) => {
                assert_eq!(n.title, "Success!");
                assert_eq!(n.message, "Report sent successfully to teacher@example.com.");
                assert!(!n.sticky);
                assert_eq!(n.next.as_deref(), Some(&Action::CloseWizard));
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_switching_mode_clears_inactive_field() {
        let mut w = wizard(ReportType::Single);
        w.set_report_type(ReportType::Department);
        assert_eq!(w.student_id, None);
        assert!(w.submit().is_ok());
    }
}
