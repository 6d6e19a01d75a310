use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope every RunningHub endpoint answers with. `code == 0` means success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEnvelope {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ProviderEnvelope {
    pub fn is_ok(&self) -> bool {
        self.code == Some(0)
    }

    pub fn message(&self) -> Option<&str> {
        self.msg.as_deref().filter(|m| !m.is_empty())
    }
}

/// A response that reached us: HTTP status, the parsed envelope if the body
/// was one, and the raw body for diagnostics.
#[derive(Debug, Clone)]
pub struct ProviderReply {
    pub http_status: u16,
    pub envelope: Option<ProviderEnvelope>,
    pub body: String,
}

impl ProviderReply {
    pub fn new(http_status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let envelope = serde_json::from_str(&body).ok();
        ProviderReply {
            http_status,
            envelope,
            body,
        }
    }

    pub fn http_ok(&self) -> bool {
        (200..300).contains(&self.http_status)
    }

    pub fn message(&self) -> Option<&str> {
        self.envelope.as_ref().and_then(|e| e.message())
    }

    /// The provider's own message when it sent one, otherwise the HTTP status.
    pub fn failure_text(&self) -> String {
        match self.message() {
            Some(msg) => msg.to_string(),
            None => format!("HTTP {}", self.http_status),
        }
    }

    pub fn data(&self) -> Option<&Value> {
        self.envelope
            .as_ref()
            .and_then(|e| e.data.as_ref())
            .filter(|d| !d.is_null())
    }
}

/// Ids come back as strings or numbers depending on the endpoint.
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
