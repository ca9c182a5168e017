//! Normalization of the backend's response envelopes.
//!
//! Two shapes are seen in practice, `{status, message, data, code}` and
//! `{detail, data}`. Both collapse here into either the `data` payload or a
//! [`GradebookError`]; nothing past this module looks at an envelope.

use serde::Deserialize;
use serde_json::Value;

use super::transport::TransportResponse;
use crate::error::{FieldErrors, GradebookError, Result};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    code: Option<Value>,
}

impl Envelope {
    fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    fn is_error(&self) -> bool {
        self.status.as_ref().and_then(Value::as_str) == Some("error")
    }

    /// `message`, then `detail`, then `fallback`.
    fn message_or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .or_else(|| self.detail.as_ref().and_then(render_detail))
            .unwrap_or_else(|| fallback.to_string())
    }

    fn code_or(&self, http_status: u16) -> u16 {
        self.code
            .as_ref()
            .and_then(|c| match c {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .and_then(|c| u16::try_from(c).ok())
            .filter(|c| *c != 0)
            .unwrap_or(http_status)
    }

    fn field_errors(&self) -> Option<FieldErrors> {
        if !self.data.is_object() {
            return None;
        }
        serde_json::from_value::<FieldErrors>(self.data.clone())
            .ok()
            .filter(|errors| !errors.is_empty())
    }
}

/// Render a `detail` value as text. FastAPI validation failures arrive as
/// a list of `{loc, msg, type}` objects; their `msg`s are joined.
fn render_detail(detail: &Value) -> Option<String> {
    let text = match detail {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .map(|item| match item.get("msg").and_then(Value::as_str) {
                    Some(msg) => msg.to_string(),
                    None => item.as_str().map(str::to_string).unwrap_or_else(|| item.to_string()),
                })
                .collect();
            messages.join("; ")
        }
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// Unwrap a JSON call: the `data` payload on success, an error otherwise.
pub(crate) fn into_data(response: &TransportResponse, fallback: &str) -> Result<Value> {
    let envelope = Envelope::parse(&response.body);

    if !response.is_success() {
        let envelope = envelope.unwrap_or_default();
        let default = format!("Request failed with status code {}", response.status);
        return Err(GradebookError::Server {
            message: envelope.message_or(&default),
            code: response.status,
            details: envelope.field_errors(),
        });
    }

    let envelope = envelope.ok_or_else(|| {
        GradebookError::Decode(format!(
            "expected a JSON envelope, got {} bytes of {}",
            response.body.len(),
            response.content_type.as_deref().unwrap_or("unknown content")
        ))
    })?;

    if envelope.is_error() {
        return Err(GradebookError::Server {
            message: envelope.message_or(fallback),
            code: envelope.code_or(response.status),
            details: envelope.field_errors(),
        });
    }

    Ok(envelope.data)
}

/// Unwrap a blob download: the raw body on success.
pub(crate) fn into_blob(response: TransportResponse, fallback: &str) -> Result<Vec<u8>> {
    if !response.is_success() {
        let envelope = Envelope::parse(&response.body).unwrap_or_default();
        return Err(GradebookError::Server {
            message: envelope.message_or(fallback),
            code: response.status,
            details: envelope.field_errors(),
        });
    }

    if response.is_json() {
        if let Some(envelope) = Envelope::parse(&response.body).filter(Envelope::is_error) {
            return Err(GradebookError::Server {
                message: envelope.message_or(fallback),
                code: envelope.code_or(response.status),
                details: envelope.field_errors(),
            });
        }
    }

    Ok(response.body)
}
