//! Report wizard commands

use super::{params, to_value, Request};
use crate::app::AppState;
use crate::error::Result;
use crate::wizards::{EmailWizard, ReportSelectionWizard, ReportType};
use serde::Deserialize;
use serde_json::Value;

/// Raw wizard input; the report type stays a string until submit so an
/// unknown mode is reported as a user error.
#[derive(Debug, Default, Deserialize)]
struct WizardParams {
    #[serde(default)]
    report_type: Option<String>,
    #[serde(default)]
    student_id: Option<String>,
    #[serde(default)]
    department_id: Option<String>,
    #[serde(default)]
    email_to: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

impl WizardParams {
    fn report_type(&self) -> Result<ReportType> {
        match self.report_type.as_deref() {
            Some(value) => value.parse(),
            None => Ok(ReportType::default()),
        }
    }
}

pub(super) async fn try_handle(state: &AppState, req: &Request) -> Option<Result<Value>> {
    let result = match req.method.as_str() {
        "reports.generate" => generate(state, req).await,
        "reports.email" => email(req),
        _ => return None,
    };

    Some(result)
}

async fn generate(state: &AppState, req: &Request) -> Result<Value> {
    let p: WizardParams = params(req)?;
    let report_type = p.report_type()?;

    let mut wizard = ReportSelectionWizard {
        report_type,
        student_id: p.student_id,
        department_id: p.department_id,
    };
    wizard.set_report_type(report_type);

    to_value(wizard.submit(&state.report_service).await?)
}

fn email(req: &Request) -> Result<Value> {
    let p: WizardParams = params(req)?;
    let report_type = p.report_type()?;

    let mut wizard = EmailWizard {
        report_type,
        student_id: p.student_id,
        department_id: p.department_id,
        email_to: p.email_to,
        phone: p.phone,
    };
    wizard.set_report_type(report_type);

    to_value(wizard.submit()?)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{call, create_test_state};
    use crate::database::LookupKind;
    use serde_json::json;

    #[tokio::test]
    async fn test_generate_all_departments_report() {
        let (state, _temp) = create_test_state().await;
        let departments = state.lookup_service.list(LookupKind::Department).await.unwrap();

        let resp = call(
            &state,
            "students.create",
            json!({
                "name": "Ali",
                "age": 20,
                "department_id": departments[0].id,
                "total_marks": 80,
                "obtained_marks": 70
            }),
        )
        .await;
        assert!(resp.ok);

        let resp = call(
            &state,
            "reports.generate",
            json!({ "report_type": "department", "department_id": "all" }),
        )
        .await;
        assert!(resp.ok, "{:?}", resp.error);

        let action = resp.result.unwrap();
        assert_eq!(action["type"], "open_url");
        assert_eq!(action["target"], "self");
        let url = action["url"].as_str().unwrap();
        assert!(url.starts_with("/web/content/"));
        assert!(url.ends_with("?download=true"));

        let attachments = state
            .attachments_service
            .list_attachments("student", None)
            .await
            .unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].name, "Department_Report_ALL.pdf");
    }

    #[tokio::test]
    async fn test_invalid_report_type() {
        let (state, _temp) = create_test_state().await;

        let resp = call(&state, "reports.generate", json!({ "report_type": "weekly" })).await;
        let error = resp.error.unwrap();
        assert_eq!(error.code, "validation");
        assert_eq!(error.message, "Invalid report type selected.");
    }

    #[tokio::test]
    async fn test_generate_wraps_missing_student() {
        let (state, _temp) = create_test_state().await;

        let resp = call(
            &state,
            "reports.generate",
            json!({ "report_type": "single", "student_id": "ghost" }),
        )
        .await;
        let error = resp.error.unwrap();
        assert_eq!(error.code, "generation");
        assert!(error.message.starts_with("Error generating single student report:\n"));
    }

    #[tokio::test]
    async fn test_email_mode_discipline() {
        let (state, _temp) = create_test_state().await;

        // The student id belongs to the inactive mode and is cleared
        let resp = call(
            &state,
            "reports.email",
            json!({ "report_type": "department", "student_id": "s-1", "email_to": "a@b.c" }),
        )
        .await;
        assert_eq!(
            resp.error.unwrap().message,
            "Please select a department for the department report."
        );

        let resp = call(
            &state,
            "reports.email",
            json!({ "student_id": "s-1", "email_to": "a@b.c" }),
        )
        .await;
        let action = resp.result.unwrap();
        assert_eq!(action["message"], "Report sent successfully to a@b.c.");
        assert_eq!(action["next"]["type"], "close_wizard");
    }
}
