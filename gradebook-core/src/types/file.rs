use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::common::text_or_number;
use super::exam::ExamState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Paper,
    TestPic,
    Histogram,
    TestPicHistogram,
}

impl AssetType {
    pub const ALL: [AssetType; 4] = [
        AssetType::Paper,
        AssetType::TestPic,
        AssetType::Histogram,
        AssetType::TestPicHistogram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::TestPic => "test_pic",
            Self::Histogram => "histogram",
            Self::TestPicHistogram => "test_pic_histogram",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|asset| asset.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown asset type '{}'. Expected one of: paper, test_pic, histogram, test_pic_histogram",
                    s
                )
            })
    }
}

/// A file held in memory, ready to be sent as a multipart part.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self { file_name, content })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadFileRequest {
    pub test_uuid: String,
    pub asset_type: AssetType,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadFileResponse {
    pub file_uuid: String,
    pub asset_type: AssetType,
    pub file_count: u32,
    #[serde(default)]
    pub mongodb_id: String,
    /// Present when the upload moved the exam to a new state. Kept as the
    /// backend's label; see [`UploadFileResponse::state`].
    #[serde(default, deserialize_with = "text_or_number")]
    pub test_states: Option<String>,
}

impl UploadFileResponse {
    /// The reported state, when it is one of the known labels.
    pub fn state(&self) -> Option<ExamState> {
        self.test_states.as_deref().and_then(|s| s.parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadFileRequest {
    pub test_pic_uuid: String,
    pub asset_type: AssetType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateFileRequest {
    pub uid: String,
    pub asset_type: AssetType,
    pub file: UploadedFile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateFileResponse {
    pub file_uuid: String,
    pub asset_type: AssetType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteFileRequest {
    pub uid: String,
    pub asset_type: AssetType,
}
