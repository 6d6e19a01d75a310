//! Turns raw RunningHub replies into typed results. Kept free of I/O so the
//! provider's quirks can be tested without a network.

use crate::error::{RelayError, Result};
use crate::models::{
    value_as_i64, value_as_string, AccountStatus, ProviderReply, RemoteAssetReference,
    TaskCreated, TaskStatus,
};

/// Task creation was refused because the account's queue is full.
pub const QUEUE_FULL_SENTINEL: &str = "TASK_QUEUE_MAXED";
/// Output query on a task that has not finished yet.
pub const TASK_RUNNING_SENTINEL: &str = "APIKEY_TASK_IS_RUNNING";

const UNKNOWN_ERROR: &str = "unknown error";

/// Tags a rejected upload by what the provider complained about, so the HTTP
/// boundary can answer 413 or 400 without re-reading the text.
fn upload_failure(message: &str) -> RelayError {
    let text = format!("Image upload failed: {}", message);
    let lower = message.to_ascii_lowercase();
    if lower.contains("size") || lower.contains("too large") {
        RelayError::SizeLimit(text)
    } else if lower.contains("format") {
        RelayError::Validation(text)
    } else {
        RelayError::Upload(text)
    }
}

pub fn interpret_upload(reply: &ProviderReply) -> Result<RemoteAssetReference> {
    if !reply.http_ok() {
        return Err(upload_failure(&reply.failure_text()));
    }
    let envelope = reply.envelope.as_ref().ok_or_else(|| {
        RelayError::InvalidResponse(format!(
            "Image upload failed: unreadable response: {}",
            reply.body
        ))
    })?;
    if !envelope.is_ok() {
        return Err(upload_failure(envelope.message().unwrap_or(UNKNOWN_ERROR)));
    }

    let data = reply.data();
    let file_name = data
        .and_then(|d| d.get("fileName"))
        .and_then(value_as_string)
        .ok_or_else(|| {
            RelayError::InvalidResponse(format!(
                "Image upload failed: response carries no fileName: {}",
                reply.body
            ))
        })?;
    let file_type = data
        .and_then(|d| d.get("fileType"))
        .and_then(value_as_string);

    Ok(RemoteAssetReference {
        file_name,
        file_type,
    })
}

pub fn interpret_create(reply: &ProviderReply) -> Result<TaskCreated> {
    // The queue sentinel wins over whatever HTTP status it came with.
    if reply.message() == Some(QUEUE_FULL_SENTINEL) {
        return Err(RelayError::QueueFull(
            "Task queue is full, please retry later".into(),
        ));
    }
    if !reply.http_ok() {
        return Err(RelayError::Provider(format!(
            "Workflow execution failed: {}",
            reply.failure_text()
        )));
    }
    let envelope = reply.envelope.as_ref().ok_or_else(|| {
        RelayError::InvalidResponse(format!("Invalid workflow response: {}", reply.body))
    })?;
    if !envelope.is_ok() {
        return Err(RelayError::Provider(format!(
            "Workflow execution failed: {}",
            envelope.message().unwrap_or(UNKNOWN_ERROR)
        )));
    }

    let data = reply.data();
    let task_id = data
        .and_then(|d| d.get("taskId"))
        .and_then(value_as_string)
        .ok_or_else(|| {
            RelayError::InvalidResponse(format!("Invalid workflow response: {}", reply.body))
        })?;

    Ok(TaskCreated {
        task_id,
        client_id: data
            .and_then(|d| d.get("clientId"))
            .and_then(value_as_string),
        task_status: data
            .and_then(|d| d.get("taskStatus"))
            .and_then(value_as_string),
    })
}

pub fn interpret_outputs(reply: &ProviderReply) -> Result<TaskStatus> {
    if reply.message() == Some(TASK_RUNNING_SENTINEL) {
        return Ok(TaskStatus::Running);
    }
    if !reply.http_ok() {
        return Err(RelayError::Provider(reply.failure_text()));
    }
    let envelope = reply.envelope.as_ref().ok_or_else(|| {
        RelayError::InvalidResponse(format!("Invalid task status response: {}", reply.body))
    })?;
    if !envelope.is_ok() {
        return Err(RelayError::Provider(
            envelope
                .message()
                .unwrap_or("Failed to fetch task status")
                .to_string(),
        ));
    }

    let outputs = match reply.data() {
        None => return Ok(TaskStatus::Running),
        Some(data) => data.as_array().ok_or_else(|| {
            RelayError::InvalidResponse(format!(
                "Task outputs are not a list: {}",
                reply.body
            ))
        })?,
    };
    if outputs.is_empty() {
        return Ok(TaskStatus::Running);
    }
    if outputs.len() > 1 {
        log::debug!(
            "Task produced {} outputs, surfacing the first only",
            outputs.len()
        );
    }

    let first = &outputs[0];
    let file_url = first
        .get("fileUrl")
        .and_then(value_as_string)
        .ok_or_else(|| {
            RelayError::InvalidResponse(format!("Task output carries no fileUrl: {}", reply.body))
        })?;

    Ok(TaskStatus::Success {
        file_url,
        file_type: first.get("fileType").and_then(value_as_string),
    })
}

pub fn interpret_cancel(reply: &ProviderReply) -> Result<()> {
    if !reply.http_ok() {
        return Err(RelayError::Provider(format!(
            "Failed to cancel task: {}",
            reply.failure_text()
        )));
    }
    match reply.envelope.as_ref() {
        Some(envelope) if envelope.is_ok() => Ok(()),
        Some(envelope) => Err(RelayError::Provider(format!(
            "Failed to cancel task: {}",
            envelope.message().unwrap_or(UNKNOWN_ERROR)
        ))),
        None => Err(RelayError::InvalidResponse(format!(
            "Failed to cancel task: unreadable response: {}",
            reply.body
        ))),
    }
}

pub fn interpret_account(reply: &ProviderReply) -> Result<AccountStatus> {
    if !reply.http_ok() {
        return Err(RelayError::Provider(format!(
            "Failed to check account status: {}",
            reply.failure_text()
        )));
    }
    let envelope = reply.envelope.as_ref().ok_or_else(|| {
        RelayError::InvalidResponse(format!(
            "Failed to check account status: unreadable response: {}",
            reply.body
        ))
    })?;
    if !envelope.is_ok() {
        return Err(RelayError::Provider(format!(
            "Failed to check account status: {}",
            envelope.message().unwrap_or(UNKNOWN_ERROR)
        )));
    }

    let field = |name: &str| {
        reply
            .data()
            .and_then(|d| d.get(name))
            .filter(|v| !v.is_null())
            .ok_or_else(|| {
                RelayError::InvalidResponse(format!(
                    "Failed to check account status: missing {}",
                    name
                ))
            })
    };

    // The balance can be fractional and arrives as string or number; pass it on verbatim.
    let remain_coins = value_as_string(field("remainCoins")?).ok_or_else(|| {
        RelayError::InvalidResponse("Failed to check account status: invalid remainCoins".into())
    })?;
    let current_task_counts = value_as_i64(field("currentTaskCounts")?).ok_or_else(|| {
        RelayError::InvalidResponse(
            "Failed to check account status: invalid currentTaskCounts".into(),
        )
    })?;

    Ok(AccountStatus {
        remain_coins,
        current_task_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn reply(status: u16, body: serde_json::Value) -> ProviderReply {
        ProviderReply::new(status, body.to_string())
    }

    #[test]
    fn upload_echoes_file_name() {
        let asset = interpret_upload(&reply(
            200,
            json!({ "code": 0, "msg": "success", "data": { "fileName": "api/x.png", "fileType": "image" } }),
        ))
        .unwrap();
        assert_eq!(asset.file_name, "api/x.png");
        assert_eq!(asset.file_type.as_deref(), Some("image"));
    }

    #[test]
    fn upload_non_zero_code_keeps_provider_message() {
        let err = interpret_upload(&reply(200, json!({ "code": 412, "msg": "TOKEN_INVALID" })))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upload);
        assert_eq!(err.to_string(), "Image upload failed: TOKEN_INVALID");
    }

    #[test]
    fn upload_rejections_are_tagged_by_cause() {
        let err = interpret_upload(&reply(200, json!({ "code": 413, "msg": "file size exceeds limit" })))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SizeLimit);
        assert_eq!(err.to_string(), "Image upload failed: file size exceeds limit");

        let err = interpret_upload(&reply(413, json!({ "code": 413, "msg": "Payload Too Large" })))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SizeLimit);

        let err = interpret_upload(&reply(200, json!({ "code": 301, "msg": "unsupported image format" })))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Image upload failed: unsupported image format");
    }

    #[test]
    fn upload_http_failure_prefers_embedded_message() {
        let err = interpret_upload(&reply(500, json!({ "code": 500, "msg": "disk full" })))
            .unwrap_err();
        assert_eq!(err.to_string(), "Image upload failed: disk full");

        let err = interpret_upload(&ProviderReply::new(503, "")).unwrap_err();
        assert_eq!(err.to_string(), "Image upload failed: HTTP 503");
    }

    #[test]
    fn create_detects_queue_full_regardless_of_status() {
        for status in [200, 429, 500] {
            let err = interpret_create(&reply(
                status,
                json!({ "code": 421, "msg": QUEUE_FULL_SENTINEL, "data": null }),
            ))
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::QueueFull);
        }
    }

    #[test]
    fn create_requires_task_id() {
        let err = interpret_create(&reply(200, json!({ "code": 0, "msg": "success", "data": {} })))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
        assert!(err.to_string().starts_with("Invalid workflow response"));
    }

    #[test]
    fn create_returns_task() {
        let task = interpret_create(&reply(
            200,
            json!({
                "code": 0,
                "msg": "success",
                "data": { "taskId": 1910246754753896450u64, "clientId": "e825290b", "taskStatus": "QUEUED" }
            }),
        ))
        .unwrap();
        assert_eq!(task.task_id, "1910246754753896450");
        assert_eq!(task.client_id.as_deref(), Some("e825290b"));
        assert_eq!(task.task_status.as_deref(), Some("QUEUED"));
    }

    #[test]
    fn create_non_zero_code_is_provider_error() {
        let err = interpret_create(&reply(200, json!({ "code": 380, "msg": "WORKFLOW_NOT_EXISTS" })))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
        assert_eq!(err.to_string(), "Workflow execution failed: WORKFLOW_NOT_EXISTS");
    }

    #[test]
    fn outputs_empty_list_is_running() {
        let status = interpret_outputs(&reply(200, json!({ "code": 0, "msg": "", "data": [] }))).unwrap();
        assert_eq!(status, TaskStatus::Running);

        let status = interpret_outputs(&reply(200, json!({ "code": 0, "msg": "", "data": null }))).unwrap();
        assert_eq!(status, TaskStatus::Running);
    }

    #[test]
    fn outputs_object_data_is_invalid() {
        let err = interpret_outputs(&reply(
            200,
            json!({ "code": 0, "msg": "success", "data": { "fileUrl": "https://cdn/x.png" } }),
        ))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
        assert!(err.to_string().starts_with("Task outputs are not a list"));
    }

    #[test]
    fn outputs_running_sentinel_is_not_an_error() {
        let status = interpret_outputs(&reply(
            200,
            json!({ "code": 804, "msg": TASK_RUNNING_SENTINEL, "data": null }),
        ))
        .unwrap();
        assert_eq!(status, TaskStatus::Running);

        let status = interpret_outputs(&reply(
            400,
            json!({ "code": 804, "msg": TASK_RUNNING_SENTINEL }),
        ))
        .unwrap();
        assert_eq!(status, TaskStatus::Running);
    }

    #[test]
    fn outputs_surface_first_only() {
        let status = interpret_outputs(&reply(
            200,
            json!({
                "code": 0,
                "msg": "success",
                "data": [
                    { "fileUrl": "https://cdn/first.png", "fileType": "png" },
                    { "fileUrl": "https://cdn/second.png", "fileType": "png" }
                ]
            }),
        ))
        .unwrap();
        assert_eq!(
            status,
            TaskStatus::Success {
                file_url: "https://cdn/first.png".into(),
                file_type: Some("png".into()),
            }
        );
    }

    #[test]
    fn outputs_other_failures_carry_provider_message() {
        let err = interpret_outputs(&reply(200, json!({ "code": 805, "msg": "APIKEY_TASK_STATUS_ERROR" })))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
        assert_eq!(err.to_string(), "APIKEY_TASK_STATUS_ERROR");
    }

    #[test]
    fn cancel_checks_code() {
        assert!(interpret_cancel(&reply(200, json!({ "code": 0, "msg": "success" }))).is_ok());
        let err = interpret_cancel(&reply(200, json!({ "code": 807, "msg": "TASK_NOT_FOUND" })))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
        assert_eq!(err.to_string(), "Failed to cancel task: TASK_NOT_FOUND");
    }

    #[test]
    fn account_accepts_string_counts() {
        let account = interpret_account(&reply(
            200,
            json!({ "code": 0, "msg": "success", "data": { "remainCoins": "1520", "currentTaskCounts": 1 } }),
        ))
        .unwrap();
        assert_eq!(
            account,
            AccountStatus {
                remain_coins: "1520".into(),
                current_task_counts: 1
            }
        );
    }

    #[test]
    fn account_keeps_fractional_balance() {
        let account = interpret_account(&reply(
            200,
            json!({ "code": 0, "msg": "success", "data": { "remainCoins": "1520.5", "currentTaskCounts": "0" } }),
        ))
        .unwrap();
        assert_eq!(account.remain_coins, "1520.5");

        let account = interpret_account(&reply(
            200,
            json!({ "code": 0, "msg": "success", "data": { "remainCoins": 12.75, "currentTaskCounts": 2 } }),
        ))
        .unwrap();
        assert_eq!(account.remain_coins, "12.75");
        assert_eq!(account.current_task_counts, 2);
    }

    #[test]
    fn account_reports_missing_only_when_absent() {
        let err = interpret_account(&reply(
            200,
            json!({ "code": 0, "msg": "success", "data": { "currentTaskCounts": 1 } }),
        ))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
        assert_eq!(err.to_string(), "Failed to check account status: missing remainCoins");

        let err = interpret_account(&reply(
            200,
            json!({ "code": 0, "msg": "success", "data": { "remainCoins": "3", "currentTaskCounts": "1.5" } }),
        ))
        .unwrap_err();
        assert_eq!(err.to_string(), "Failed to check account status: invalid currentTaskCounts");
    }

    #[test]
    fn account_failure_is_wrapped() {
        let err = interpret_account(&reply(200, json!({ "code": 1, "msg": "APIKEY_INVALID" })))
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to check account status: APIKEY_INVALID");
    }
}
