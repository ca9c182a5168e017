//! Client configuration and the backend endpoint catalog.
//!
//! A [`ClientConfig`] is built once at process start and handed to the API
//! client. Layers, lowest precedence first: built-in defaults, an optional
//! TOML file, the `GRADEBOOK_API_BASE_URL` environment variable, then
//! explicit overrides (CLI flags).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::{GradebookError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v0.1/Calculus_oom/Calculus_metadata";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const BASE_URL_ENV: &str = "GRADEBOOK_API_BASE_URL";
pub const USER_AGENT: &str = concat!("gradebook/", env!("CARGO_PKG_VERSION"));

/// Endpoint paths, relative to the configured base URL.
pub mod endpoints {
    pub mod student {
        pub const CREATE: &str = "/Student_MetadataWriter/create";
        pub const READ: &str = "/Student_MetadataWriter/read";
        pub const UPDATE: &str = "/Student_MetadataWriter/update";
        pub const DELETE: &str = "/Student_MetadataWriter/delete";
        pub const STATUS: &str = "/Student_MetadataWriter/status";
        pub const UPLOAD_EXCEL: &str = "/Student_MetadataWriter/upload_excel";
        pub const EXPORT_EXCEL: &str = "/Student_MetadataWriter/feedback_excel";
    }

    pub mod score {
        pub const CREATE: &str = "/Score_MetadataWriter/create";
        pub const READ: &str = "/Score_MetadataWriter/read";
        pub const UPDATE: &str = "/Score_MetadataWriter/update";
        pub const DELETE: &str = "/Score_MetadataWriter/delete";
        pub const CALCULATION_FINAL: &str = "/Score_MetadataWriter/calculation_final";
        pub const TEST_SCORE: &str = "/Score_MetadataWriter/test_score";
        pub const STEP_DIAGRAM: &str = "/Score_MetadataWriter/step_diagram";
    }

    pub mod exam {
        pub const CREATE: &str = "/Test_MetadataWriter/create";
        pub const READ: &str = "/Test_MetadataWriter/read";
        pub const UPDATE: &str = "/Test_MetadataWriter/update";
        pub const DELETE: &str = "/Test_MetadataWriter/delete";
        pub const STATUS: &str = "/Test_MetadataWriter/status";
        pub const SET_WEIGHT: &str = "/Test_MetadataWriter/setweight";
    }

    pub mod file {
        pub const CREATE: &str = "/test-filedata/create";
        pub const READ: &str = "/test-filedata/read";
        pub const UPDATE: &str = "/test-filedata/update";
        pub const DELETE: &str = "/test-filedata/delete";
    }
}

/// Immutable settings for the HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    base_url: String,
    timeout: Duration,
    headers: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            headers,
        }
    }
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Highest-precedence values, usually from command-line flags.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Default configuration pointed at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            ..Self::default()
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(GradebookError::Config("timeout must be greater than zero".into()));
        }
        self.timeout = timeout;
        Ok(self)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Full URL for an endpoint path such as `/Student_MetadataWriter/read`.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Location of the per-user config file, if the platform has one.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gradebook").join("config.toml"))
    }

    /// Build the configuration from every layer.
    ///
    /// An explicit `config_path` must exist; the default path is only read
    /// when present.
    pub fn load(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let file = match config_path {
            Some(path) => Some(read_config_file(path)?),
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Some(read_config_file(&path)?),
                _ => None,
            },
        };
        let env_base_url = std::env::var(BASE_URL_ENV).ok().filter(|v| !v.trim().is_empty());
        Self::resolve(file, env_base_url, overrides)
    }

    /// Merge already-read layers. Split out from [`ClientConfig::load`] so
    /// precedence can be checked without touching the environment.
    pub fn resolve(
        file: Option<ConfigFile>,
        env_base_url: Option<String>,
        overrides: &ConfigOverrides,
    ) -> Result<Self> {
        let mut config = Self::default();
        let mut base_url: Option<String> = None;
        let mut timeout_secs: Option<u64> = None;

        if let Some(file) = file {
            base_url = file.base_url;
            timeout_secs = file.timeout_secs;
            config.headers.extend(file.headers);
        }
        if let Some(url) = env_base_url {
            debug!("Base URL taken from {}", BASE_URL_ENV);
            base_url = Some(url);
        }
        if let Some(url) = &overrides.base_url {
            base_url = Some(url.clone());
        }
        if let Some(secs) = overrides.timeout_secs {
            timeout_secs = Some(secs);
        }

        if let Some(url) = base_url {
            config.base_url = normalize_base_url(&url)?;
        }
        if let Some(secs) = timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs))?;
        }

        info!(
            "Using backend {} (timeout {}s)",
            config.base_url,
            config.timeout.as_secs()
        );
        Ok(config)
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| GradebookError::Config(format!("failed to read {:?}: {}", path, e)))?;
    toml::from_str(&content)
        .map_err(|e| GradebookError::Config(format!("failed to parse {:?}: {}", path, e)))
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|e| GradebookError::Config(format!("invalid base URL '{}': {}", trimmed, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(GradebookError::Config(format!(
            "base URL must use http or https, got '{}'",
            url.scheme()
        )));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
