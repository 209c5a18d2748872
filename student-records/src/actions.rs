//! UI action descriptors
//!
//! Every user-triggered operation answers with one of these, telling the
//! front end to show a notification, open a wizard, or navigate to a URL.

use crate::wizards::ReportType;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
}

/// Toast-style message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub sticky: bool,
    /// Action to run once the notification is shown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<Action>>,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity: Severity::Success,
            sticky: false,
            next: None,
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity: Severity::Warning,
            sticky: false,
            next: None,
        }
    }

    pub fn then(mut self, next: Action) -> Self {
        self.next = Some(Box::new(next));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardKind {
    ReportSelection,
    Email,
}

/// Initial field values of a wizard being opened
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardDefaults {
    pub report_type: ReportType,
    pub student_id: Option<String>,
    pub department_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardLaunch {
    pub title: String,
    pub wizard: WizardKind,
    pub defaults: WizardDefaults,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Notification(Notification),
    OpenWizard(WizardLaunch),
    OpenUrl { url: String, target: String },
    CloseWizard,
}

impl Action {
    /// Navigate the current window to a URL
    pub fn open_url(url: impl Into<String>) -> Self {
        Action::OpenUrl {
            url: url.into(),
            target: "self".to_string(),
        }
    }
}

impl From<Notification> for Action {
    fn from(notification: Notification) -> Self {
        Action::Notification(notification)
    }
}
