//! Lookup table commands

use super::{params, to_value, Request};
use crate::app::AppState;
use crate::database::LookupKind;
use crate::error::Result;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct KindParams {
    kind: LookupKind,
}

#[derive(Debug, Deserialize)]
struct CreateParams {
    kind: LookupKind,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RenameParams {
    kind: LookupKind,
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct DeleteParams {
    kind: LookupKind,
    id: String,
}

pub(super) async fn try_handle(state: &AppState, req: &Request) -> Option<Result<Value>> {
    let result = match req.method.as_str() {
        "lookups.list" => list(state, req).await,
        "lookups.create" => create(state, req).await,
        "lookups.rename" => rename(state, req).await,
        "lookups.delete" => delete(state, req).await,
        _ => return None,
    };

    Some(result)
}

async fn list(state: &AppState, req: &Request) -> Result<Value> {
    let p: KindParams = params(req)?;
    to_value(state.lookup_service.list(p.kind).await?)
}

async fn create(state: &AppState, req: &Request) -> Result<Value> {
    let p: CreateParams = params(req)?;
    to_value(state.lookup_service.create(p.kind, &p.name).await?)
}

async fn rename(state: &AppState, req: &Request) -> Result<Value> {
    let p: RenameParams = params(req)?;
    to_value(state.lookup_service.rename(p.kind, &p.id, &p.name).await?)
}

async fn delete(state: &AppState, req: &Request) -> Result<Value> {
    let p: DeleteParams = params(req)?;
    state.lookup_service.delete(p.kind, &p.id).await?;
    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{call, create_test_state};
    use serde_json::json;

    #[tokio::test]
    async fn test_department_in_use_cannot_be_deleted() {
        let (state, _temp) = create_test_state().await;

        let resp = call(&state, "lookups.create", json!({ "kind": "department", "name": "Chemistry" })).await;
        let dept_id = resp.result.unwrap()["id"].as_str().unwrap().to_string();

        let resp = call(
            &state,
            "students.create",
            json!({
                "name": "Ali",
                "age": 20,
                "department_id": dept_id,
                "total_marks": 50,
                "obtained_marks": 25
            }),
        )
        .await;
        assert!(resp.ok);

        let resp = call(&state, "lookups.delete", json!({ "kind": "department", "id": dept_id })).await;
        assert_eq!(resp.error.unwrap().code, "in_use");

        let resp = call(&state, "lookups.list", json!({ "kind": "department" })).await;
        assert_eq!(resp.result.unwrap().as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_unknown_kind_is_bad_params() {
        let (state, _temp) = create_test_state().await;

        let resp = call(&state, "lookups.list", json!({ "kind": "faculty" })).await;
        assert_eq!(resp.error.unwrap().code, "bad_params");
    }
}
