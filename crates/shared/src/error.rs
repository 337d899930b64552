use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body shape the backend returns on non-2xx responses. FastAPI-style
/// handlers put the message in `detail`; other layers use `message`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Picks the human-readable message for a failed response, in order of
/// preference: `detail`, then `message`, then the raw body, then `status N`.
/// A `detail` that is not a plain string (validation errors arrive as
/// arrays) is stringified rather than dropped.
pub fn remote_error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        match parsed.detail {
            Some(Value::String(detail)) if !detail.is_empty() => return detail,
            Some(Value::Null) | None => {}
            Some(other) => return other.to_string(),
        }
        if let Some(message) = parsed.message {
            if !message.is_empty() {
                return message;
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    format!("status {status}")
}
