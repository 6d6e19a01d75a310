use crate::{
    error::{RelayError, Result},
    image::ImagePayload,
    orchestrator::Orchestrator,
    server::responses::{error_response, process_status, ApiResponse},
};
use actix_multipart::{Field, Multipart};
use actix_web::{http::StatusCode, web, HttpResponse};
use futures::StreamExt;

/// Per-server upload settings shared with the handlers.
#[derive(Debug, Clone, Copy)]
pub struct UploadSettings {
    pub limit: usize,
}

/// Longest workflow selector we accept.
const MAX_TEXT_FIELD: usize = 1024;

#[derive(Debug, Default)]
struct ProcessForm {
    image: Option<ImagePayload>,
    workflow: Option<String>,
}

async fn read_field(field: &mut Field, limit: usize, what: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| {
            RelayError::Validation(format!("Malformed multipart {} field format: {}", what, e))
        })?;
        if buf.len() + chunk.len() > limit {
            return Err(RelayError::SizeLimit(format!(
                "File size exceeds the {} byte limit",
                limit
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

async fn read_process_form(mut payload: Multipart, limit: usize) -> Result<ProcessForm> {
    let mut form = ProcessForm::default();
    // Base64 inflates by 4/3; allow for that plus a data URI prefix.
    let base64_limit = limit / 3 * 4 + 4 + MAX_TEXT_FIELD;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            RelayError::Validation(format!("Invalid multipart request format: {}", e))
        })?;
        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_string();

        match name.as_str() {
            "image" => {
                let bytes = read_field(&mut field, limit, "image").await?;
                if !bytes.is_empty() {
                    form.image = Some(ImagePayload::from_bytes(bytes));
                }
            }
            "imageBase64" => {
                let bytes = read_field(&mut field, base64_limit, "imageBase64").await?;
                let text = String::from_utf8_lossy(&bytes);
                if form.image.is_none() && !text.trim().is_empty() {
                    form.image = Some(ImagePayload::from_base64(&text)?);
                }
            }
            "workflow" => {
                let bytes = read_field(&mut field, MAX_TEXT_FIELD, "workflow").await?;
                form.workflow = Some(String::from_utf8_lossy(&bytes).trim().to_string());
            }
            other => {
                log::debug!("Ignoring multipart field '{}'", other);
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| {
                        RelayError::Validation(format!("Invalid multipart request format: {}", e))
                    })?;
                }
            }
        }
    }

    Ok(form)
}

/// `POST /process`: multipart `image` (or `imageBase64`) plus optional `workflow`.
pub async fn process_image(
    orchestrator: web::Data<Orchestrator>,
    settings: web::Data<UploadSettings>,
    payload: Multipart,
) -> HttpResponse {
    let result = async {
        let form = read_process_form(payload, settings.limit).await?;
        let image = form
            .image
            .ok_or_else(|| RelayError::Validation("No image file provided".into()))?;
        image.validate(settings.limit)?;

        let workflow = orchestrator.workflow_for(form.workflow.as_deref());
        orchestrator.process_image(&image, &workflow).await
    }
    .await;

    match result {
        Ok(task) => HttpResponse::Ok().json(ApiResponse::success(task)),
        Err(err) => error_response(process_status(&err), &err),
    }
}

/// `GET /status/{task_id}`
pub async fn task_status(
    orchestrator: web::Data<Orchestrator>,
    task_id: web::Path<String>,
) -> HttpResponse {
    match orchestrator.get_task_status(&task_id).await {
        Ok(status) => HttpResponse::Ok().json(ApiResponse::success(status)),
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &err),
    }
}

/// `POST /cancel/{task_id}`. Forwarding the cancel is all we promise.
pub async fn cancel_task(
    orchestrator: web::Data<Orchestrator>,
    task_id: web::Path<String>,
) -> HttpResponse {
    match orchestrator.cancel_task(&task_id).await {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::message("Task cancelled successfully")),
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &err),
    }
}

/// `GET /account`
pub async fn account_status(orchestrator: web::Data<Orchestrator>) -> HttpResponse {
    match orchestrator.account_status().await {
        Ok(account) => HttpResponse::Ok().json(ApiResponse::success(account)),
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &err),
    }
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::message("ok"))
}
