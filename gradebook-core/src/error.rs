use std::collections::BTreeMap;

use thiserror::Error;

use crate::validation::ValidationError;

/// Field-level error details reported by the backend (`field -> messages`).
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub type Result<T, E = GradebookError> = std::result::Result<T, E>;

/// The single error type every backend call and workflow resolves to.
#[derive(Debug, Error)]
pub enum GradebookError {
    /// Rejected client-side; no request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A keyed lookup returned zero rows.
    #[error("{message}")]
    NotFound { message: String },

    /// The backend answered with a failure envelope or a non-2xx status.
    #[error("{message}")]
    Server {
        message: String,
        code: u16,
        details: Option<FieldErrors>,
    },

    /// Timeout, refused connection or any other transport failure.
    #[error("Network error - unable to reach server")]
    Network { reason: String },

    /// A success response whose payload did not have the expected shape.
    #[error("Invalid response from server: {0}")]
    Decode(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl GradebookError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Numeric code surfaced to the user, mirroring HTTP semantics.
    pub fn code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Server { code, .. } => *code,
            Self::Network { .. } | Self::Decode(_) | Self::Config(_) => 500,
        }
    }

    pub fn details(&self) -> Option<&FieldErrors> {
        match self {
            Self::Server { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == 404
    }
}

impl From<GradebookError> for String {
    fn from(err: GradebookError) -> Self {
        err.to_string()
    }
}
