//! Typed client for the course grade-management backend.
//!
//! [`client::ApiClient`] turns each backend envelope into data or a
//! [`GradebookError`]; [`services`] maps one call per operation and
//! [`workflows`] composes them.

pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod listing;
pub mod services;
pub mod status;
pub mod types;
pub mod validation;
pub mod workflows;

pub use client::ApiClient;
pub use config::{ClientConfig, ConfigOverrides};
pub use error::{GradebookError, Result};
pub use status::{AsyncState, AsyncStatus};
pub use validation::ValidationError;
