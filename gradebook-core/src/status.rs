//! Four-state status of an in-flight backend call.

use std::fmt;
use std::future::Future;

use serde::Serialize;

use crate::error::{GradebookError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AsyncStatus {
    Idle,
    Loading,
    Success,
    Error,
}

impl fmt::Display for AsyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        })
    }
}

/// Data and error are only ever present in their own state, so a stale
/// result cannot outlive a new call.
#[derive(Debug, Default)]
pub enum AsyncState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Error(GradebookError),
}

impl<T> AsyncState<T> {
    pub fn status(&self) -> AsyncStatus {
        match self {
            Self::Idle => AsyncStatus::Idle,
            Self::Loading => AsyncStatus::Loading,
            Self::Success(_) => AsyncStatus::Success,
            Self::Error(_) => AsyncStatus::Error,
        }
    }

    pub fn begin(&mut self) {
        *self = Self::Loading;
    }

    pub fn finish(&mut self, result: Result<T>) {
        *self = match result {
            Ok(data) => Self::Success(data),
            Err(e) => Self::Error(e),
        };
    }

    /// Run `call` through loading into success or error, returning the
    /// settled outcome.
    pub async fn execute<F>(&mut self, call: F) -> std::result::Result<&T, &GradebookError>
    where
        F: Future<Output = Result<T>>,
    {
        self.begin();
        let result = call.await;
        self.finish(result);
        match &*self {
            Self::Success(data) => Ok(data),
            Self::Error(e) => Err(e),
            Self::Idle | Self::Loading => unreachable!("finish always settles the state"),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&GradebookError> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The settled outcome, or `None` while idle or loading.
    pub fn into_result(self) -> Option<Result<T>> {
        match self {
            Self::Success(data) => Some(Ok(data)),
            Self::Error(e) => Some(Err(e)),
            Self::Idle | Self::Loading => None,
        }
    }
}
