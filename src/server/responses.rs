use crate::error::{ErrorKind, RelayError};
use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Status code for a failed `/process` call.
pub fn process_status(err: &RelayError) -> StatusCode {
    match err.kind() {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::SizeLimit => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(status: StatusCode, err: &RelayError) -> HttpResponse {
    if status.is_server_error() {
        log::error!("{} ({})", err, err.kind().as_str());
    } else {
        log::warn!("{} ({})", err, err.kind().as_str());
    }
    HttpResponse::build(status).json(ApiResponse::error(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classification() {
        assert_eq!(
            process_status(&RelayError::Validation("No image file provided".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            process_status(&RelayError::SizeLimit("too big".into())),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        for err in [
            RelayError::Upload("x".into()),
            RelayError::QueueFull("x".into()),
            RelayError::InvalidResponse("x".into()),
            RelayError::Provider("x".into()),
            RelayError::Transport("x".into()),
        ] {
            assert_eq!(process_status(&err), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_envelopes() {
        assert_eq!(
            serde_json::to_value(ApiResponse::error("boom")).unwrap(),
            json!({ "status": "error", "message": "boom" })
        );
        assert_eq!(
            serde_json::to_value(ApiResponse::success(json!({ "taskId": "1" }))).unwrap(),
            json!({ "status": "success", "data": { "taskId": "1" } })
        );
    }
}
