//! Attachment commands
//!
//! Read-only access to stored reports; attachments are only ever created
//! by report generation.

use super::{params, to_value, IdParams, Request};
use crate::app::AppState;
use crate::config::STUDENT_RECORD_TYPE;
use crate::database::Attachment;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default = "default_record_type")]
    record_type: String,
    #[serde(default)]
    record_id: Option<String>,
}

fn default_record_type() -> String {
    STUDENT_RECORD_TYPE.to_string()
}

/// Attachment metadata together with where to download it
#[derive(Debug, Serialize)]
struct AttachmentInfo {
    #[serde(flatten)]
    attachment: Attachment,
    download_url: String,
}

/// Stored bytes of one attachment, sent as a JSON byte array
#[derive(Debug, Serialize)]
struct AttachmentData {
    name: String,
    mime_type: String,
    data: Vec<u8>,
}

pub(super) async fn try_handle(state: &AppState, req: &Request) -> Option<Result<Value>> {
    let result = match req.method.as_str() {
        "attachments.get" => get(state, req).await,
        "attachments.list" => list(state, req).await,
        "attachments.data" => data(state, req).await,
        _ => return None,
    };

    Some(result)
}

async fn get(state: &AppState, req: &Request) -> Result<Value> {
    let p: IdParams = params(req)?;
    let service = &state.attachments_service;

    let attachment = service.get_attachment(&p.id).await?;
    let download_url = service.download_url(&attachment);
    to_value(AttachmentInfo {
        attachment,
        download_url,
    })
}

async fn list(state: &AppState, req: &Request) -> Result<Value> {
    let p: ListParams = params(req)?;
    let service = &state.attachments_service;

    let infos: Vec<AttachmentInfo> = service
        .list_attachments(&p.record_type, p.record_id.as_deref())
        .await?
        .into_iter()
        .map(|attachment| AttachmentInfo {
            download_url: service.download_url(&attachment),
            attachment,
        })
        .collect();
    to_value(infos)
}

async fn data(state: &AppState, req: &Request) -> Result<Value> {
    let p: IdParams = params(req)?;
    let service = &state.attachments_service;

    let attachment = service.get_attachment(&p.id).await?;
    let data = service.get_attachment_data(&attachment.id).await?;
    to_value(AttachmentData {
        name: attachment.name,
        mime_type: attachment.mime_type,
        data,
    })
}
