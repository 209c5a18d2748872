//! Student commands

use super::{params, to_value, IdParams, Request};
use crate::app::AppState;
use crate::database::{CreateStudentRequest, UpdateStudentRequest};
use crate::error::Result;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    #[serde(default)]
    department_id: Option<String>,
    #[serde(default)]
    include_archived: bool,
}

#[derive(Debug, Deserialize)]
struct TargetParams {
    ids: Vec<String>,
}

pub(super) async fn try_handle(state: &AppState, req: &Request) -> Option<Result<Value>> {
    let result = match req.method.as_str() {
        "students.create" => create(state, req).await,
        "students.get" => get(state, req).await,
        "students.list" => list(state, req).await,
        "students.update" => update(state, req).await,
        "students.save" => save(state, req).await,
        "students.archive" => archive(state, req).await,
        "students.restore" => restore(state, req).await,
        "students.delete" => delete(state, req).await,
        "students.open_report_wizard" => open_report_wizard(state, req).await,
        "students.open_email_wizard" => open_email_wizard(state, req).await,
        _ => return None,
    };

    Some(result)
}

async fn create(state: &AppState, req: &Request) -> Result<Value> {
    let p: CreateStudentRequest = params(req)?;
    to_value(state.students_service.create(p).await?)
}

async fn get(state: &AppState, req: &Request) -> Result<Value> {
    let p: IdParams = params(req)?;
    to_value(state.students_service.get(&p.id).await?)
}

async fn list(state: &AppState, req: &Request) -> Result<Value> {
    let p: ListParams = params(req)?;
    let service = &state.students_service;

    match (p.department_id, p.include_archived) {
        (Some(department_id), include_archived) => {
            to_value(service.list_by_department(&department_id, include_archived).await?)
        }
        (None, true) => to_value(service.list_all().await?),
        (None, false) => to_value(service.list().await?),
    }
}

async fn update(state: &AppState, req: &Request) -> Result<Value> {
    let p: UpdateStudentRequest = params(req)?;
    to_value(state.students_service.update(p).await?)
}

async fn save(state: &AppState, req: &Request) -> Result<Value> {
    let p: IdParams = params(req)?;
    to_value(state.students_service.save(&p.id).await?)
}

async fn archive(state: &AppState, req: &Request) -> Result<Value> {
    let p: TargetParams = params(req)?;
    to_value(state.students_service.archive(&p.ids).await?)
}

async fn restore(state: &AppState, req: &Request) -> Result<Value> {
    let p: TargetParams = params(req)?;
    to_value(state.students_service.restore(&p.ids).await?)
}

async fn delete(state: &AppState, req: &Request) -> Result<Value> {
    let p: IdParams = params(req)?;
    state.students_service.delete(&p.id).await?;
    Ok(Value::Null)
}

async fn open_report_wizard(state: &AppState, req: &Request) -> Result<Value> {
    let p: IdParams = params(req)?;
    to_value(state.students_service.open_report_wizard(&p.id).await?)
}

async fn open_email_wizard(state: &AppState, req: &Request) -> Result<Value> {
    let p: IdParams = params(req)?;
    to_value(state.students_service.open_email_wizard(&p.id).await?)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{call, create_test_state};
    use crate::database::LookupKind;
    use serde_json::json;

    #[tokio::test]
    async fn test_student_lifecycle_over_protocol() {
        let (state, _temp) = create_test_state().await;
        let departments = state.lookup_service.list(LookupKind::Department).await.unwrap();
        let math = departments.iter().find(|d| d.name == "MATH").unwrap();

        let resp = call(
            &state,
            "students.create",
            json!({
                "name": "Ali",
                "age": 20,
                "department_id": math.id,
                "total_marks": 80,
                "obtained_marks": 70
            }),
        )
        .await;
        assert!(resp.ok, "{:?}", resp.error);
        let student = resp.result.unwrap();
        assert_eq!(student["percentage"], json!(87.5));
        let id = student["id"].as_str().unwrap().to_string();

        let resp = call(&state, "students.archive", json!({ "ids": [id] })).await;
        let action = resp.result.unwrap();
        assert_eq!(action["type"], "notification");
        assert_eq!(action["severity"], "warning");
        assert_eq!(action["message"], "Student Ali has been archived.");

        let resp = call(&state, "students.list", json!({})).await;
        assert_eq!(resp.result.unwrap(), json!([]));

        let resp = call(&state, "students.list", json!({ "include_archived": true })).await;
        assert_eq!(resp.result.unwrap().as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_department_listing_honours_include_archived() {
        let (state, _temp) = create_test_state().await;
        let departments = state.lookup_service.list(LookupKind::Department).await.unwrap();
        let math = departments.iter().find(|d| d.name == "MATH").unwrap();

        let resp = call(
            &state,
            "students.create",
            json!({
                "name": "Omar",
                "age": 22,
                "department_id": math.id,
                "total_marks": 100,
                "obtained_marks": 60
            }),
        )
        .await;
        let id = resp.result.unwrap()["id"].as_str().unwrap().to_string();
        call(&state, "students.archive", json!({ "ids": [id] })).await;

        let resp = call(&state, "students.list", json!({ "department_id": math.id })).await;
        assert_eq!(resp.result.unwrap(), json!([]));

        let resp = call(
            &state,
            "students.list",
            json!({ "department_id": math.id, "include_archived": true }),
        )
        .await;
        let listed = resp.result.unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["name"], "Omar");
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let (state, _temp) = create_test_state().await;

        let resp = call(&state, "students.create", json!({ "name": "Ali" })).await;
        let error = resp.error.unwrap();
        assert_eq!(error.code, "validation");
        assert_eq!(error.message, "Missing required field: Age");
    }

    #[tokio::test]
    async fn test_open_report_wizard() {
        let (state, _temp) = create_test_state().await;
        let departments = state.lookup_service.list(LookupKind::Department).await.unwrap();

        let resp = call(
            &state,
            "students.create",
            json!({
                "name": "Sara",
                "age": 21,
                "department_id": departments[0].id,
                "total_marks": 100,
                "obtained_marks": 90
            }),
        )
        .await;
        let id = resp.result.unwrap()["id"].as_str().unwrap().to_string();

        let resp = call(&state, "students.open_report_wizard", json!({ "id": id })).await;
        let action = resp.result.unwrap();
        assert_eq!(action["type"], "open_wizard");
        assert_eq!(action["wizard"], "report_selection");
        assert_eq!(action["defaults"]["report_type"], "single");
        assert_eq!(action["defaults"]["department_id"], json!(departments[0].id));
    }
}
