//! The API client: one POST per call, envelope in, typed data out.

mod envelope;
pub mod transport;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{GradebookError, Result};

pub use transport::{
    FormPart, HttpTransport, Payload, Transport, TransportError, TransportRequest, TransportResponse,
};

pub const DEFAULT_ERROR_MESSAGE: &str = "Unknown error";
pub const UPLOAD_ERROR_MESSAGE: &str = "Upload failed";

/// Backend client. Holds no state besides its transport, so it can be
/// shared by reference across every service call.
pub struct ApiClient<T = HttpTransport> {
    transport: T,
}

impl ApiClient<HttpTransport> {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(config)?))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// JSON request/response call returning the decoded `data` payload.
    pub async fn request<R, B>(&self, endpoint: &str, body: &B) -> Result<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)
            .map_err(|e| GradebookError::Decode(format!("failed to encode request: {}", e)))?;
        let response = self.send(endpoint, Payload::Json(body)).await?;
        let data = envelope::into_data(&response, DEFAULT_ERROR_MESSAGE)?;
        decode(endpoint, data)
    }

    /// Multipart upload returning the decoded `data` payload.
    pub async fn upload<R>(&self, endpoint: &str, parts: Vec<FormPart>) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self.send(endpoint, Payload::Multipart(parts)).await?;
        let data = envelope::into_data(&response, UPLOAD_ERROR_MESSAGE)?;
        decode(endpoint, data)
    }

    /// JSON request answered with a binary body (Excel, image, stored file).
    pub async fn download<B>(&self, endpoint: &str, body: &B, fallback: &str) -> Result<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)
            .map_err(|e| GradebookError::Decode(format!("failed to encode request: {}", e)))?;
        let response = self.send(endpoint, Payload::Json(body)).await?;
        envelope::into_blob(response, fallback)
    }

    async fn send(&self, endpoint: &str, payload: Payload) -> Result<TransportResponse> {
        debug!("Calling {}", endpoint);
        let request = TransportRequest {
            path: endpoint.to_string(),
            payload,
        };
        self.transport.send(request).await.map_err(|e| {
            warn!("Request to {} failed: {}", endpoint, e);
            GradebookError::Network {
                reason: e.to_string(),
            }
        })
    }
}

fn decode<R: DeserializeOwned>(endpoint: &str, data: serde_json::Value) -> Result<R> {
    serde_json::from_value(data)
        .map_err(|e| GradebookError::Decode(format!("{}: {}", endpoint, e)))
}
