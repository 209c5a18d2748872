//! Request dispatch
//!
//! Every request names a method `<area>.<operation>` and carries JSON
//! params. This module organizes the handlers into logical submodules:
//! - `students`: student CRUD, archive/restore and wizard launchers
//! - `education`: education history of a student
//! - `lookups`: departments, institutes and degrees
//! - `reports`: report selection and email wizards
//! - `attachments`: generated report metadata

mod attachments;
mod education;
mod lookups;
mod reports;
mod students;

use crate::app::AppState;
use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    pub fn ok(id: impl Into<String>, result: Value) -> Self {
        Self {
            id: id.into(),
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ok: false,
            result: None,
            error: Some(ErrorBody {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// Run one request against the application state
pub async fn handle_request(state: &AppState, req: Request) -> Response {
    tracing::debug!("Handling {} ({})", req.method, req.id);

    let outcome = match req.method.split_once('.').map(|(area, _)| area) {
        Some("students") => students::try_handle(state, &req).await,
        Some("education") => education::try_handle(state, &req).await,
        Some("lookups") => lookups::try_handle(state, &req).await,
        Some("reports") => reports::try_handle(state, &req).await,
        Some("attachments") => attachments::try_handle(state, &req).await,
        _ => None,
    };

    match outcome {
        Some(Ok(result)) => Response::ok(req.id, result),
        Some(Err(e)) => {
            if e.is_user_facing() {
                tracing::debug!("{} rejected: {}", req.method, e);
            } else {
                tracing::error!("{} failed: {}", req.method, e);
            }
            Response::err(req.id, e.code(), e.to_string())
        }
        None => {
            tracing::warn!("Unknown method: {}", req.method);
            Response::err(req.id, "unknown_method", format!("unknown method: {}", req.method))
        }
    }
}

/// Deserialize request params; absent params read as an empty object
fn params<T: DeserializeOwned>(req: &Request) -> Result<T> {
    let value = match &req.params {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    Ok(serde_json::from_value(value)?)
}

fn to_value<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).map_err(AppError::from)
}

#[derive(Debug, Deserialize)]
struct IdParams {
    id: String,
}
