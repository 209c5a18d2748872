//! Education history commands

use super::{params, to_value, IdParams, Request};
use crate::app::AppState;
use crate::database::CreateEducationRequest;
use crate::error::Result;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct StudentParams {
    student_id: String,
}

pub(super) async fn try_handle(state: &AppState, req: &Request) -> Option<Result<Value>> {
    let result = match req.method.as_str() {
        "education.add" => add(state, req).await,
        "education.list" => list(state, req).await,
        "education.remove" => remove(state, req).await,
        _ => return None,
    };

    Some(result)
}

async fn add(state: &AppState, req: &Request) -> Result<Value> {
    let p: CreateEducationRequest = params(req)?;
    to_value(state.students_service.add_education(p).await?)
}

async fn list(state: &AppState, req: &Request) -> Result<Value> {
    let p: StudentParams = params(req)?;
    to_value(state.students_service.list_education(&p.student_id).await?)
}

async fn remove(state: &AppState, req: &Request) -> Result<Value> {
    let p: IdParams = params(req)?;
    state.students_service.remove_education(&p.id).await?;
    Ok(Value::Null)
}
