use std::future::Future;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tracing::debug;

use crate::config::{ClientConfig, USER_AGENT};
use crate::error::{GradebookError, Result};

/// Body of an outbound POST.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// Endpoint path relative to the base URL.
    pub path: String,
    pub payload: Payload,
}

/// Raw HTTP answer, before any envelope handling.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: value.to_string().into_bytes(),
        }
    }

    pub fn bytes(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: Some(content_type.to_string()),
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
    }
}

/// The request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }
}

/// Sends one POST to the backend. Implemented over HTTP by
/// [`HttpTransport`]; tests substitute an in-memory backend.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// reqwest-backed transport. The inner client is built once from the
/// [`ClientConfig`] and reused for every call.
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in config.headers() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| GradebookError::Config(format!("invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| GradebookError::Config(format!("invalid header value for '{}': {}", name.as_str(), e)))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| GradebookError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = self.config.endpoint_url(&request.path);
        debug!("POST {}", url);

        let builder = self.client.post(&url);
        let builder = match request.payload {
            Payload::Json(body) => builder.json(&body),
            Payload::Multipart(parts) => builder.multipart(build_form(parts)),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        debug!("POST {} -> {} ({} bytes)", url, status, body.len());
        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}

fn build_form(parts: Vec<FormPart>) -> Form {
    parts.into_iter().fold(Form::new(), |form, part| match part {
        FormPart::Text { name, value } => form.text(name, value),
        FormPart::File {
            name,
            file_name,
            content,
        } => form.part(name, Part::bytes(content).file_name(file_name)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_helpers() {
        let resp = TransportResponse::json(200, &serde_json::json!({"data": []}));
        assert!(resp.is_success());
        assert!(resp.is_json());

        let blob = TransportResponse::bytes(200, "image/png", vec![0x89, b'P']);
        assert!(!blob.is_json());

        let err = TransportResponse::bytes(502, "text/html", b"Bad Gateway".to_vec());
        assert!(!err.is_success());
    }

    #[test]
    fn test_http_transport_rejects_bad_header() {
        let config = ClientConfig::default().with_header("Bad Header", "x");
        assert!(matches!(
            HttpTransport::new(&config),
            Err(GradebookError::Config(_))
        ));
    }

    #[test]
    fn test_http_transport_builds_from_defaults() {
        let transport = HttpTransport::new(&ClientConfig::default()).unwrap();
        assert_eq!(
            transport.config().base_url(),
            crate::config::DEFAULT_BASE_URL
        );
    }
}
