//! Writing downloaded blobs to disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::info;

use crate::types::{AssetType, DiagramFormat, ScoreField};

/// Header and sample rows of the roster import sheet.
const TEMPLATE_ROWS: [[&str; 3]; 3] = [
    ["姓名", "學號", "學期"],
    ["張三", "B11001001", "1141"],
    ["李四", "B11001002", "1141"],
];

/// Write `bytes` to `target` atomically: a temp file in the same directory
/// is filled, then renamed over the target.
pub fn write_blob(bytes: &[u8], target: &Path) -> Result<PathBuf> {
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)
        .with_context(|| format!("Failed to create directory {:?}", parent))?;

    let mut temp = NamedTempFile::new_in(&parent)
        .with_context(|| format!("Failed to create temp file in {:?}", parent))?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.persist(target)
        .with_context(|| format!("Failed to write {:?}", target))?;

    info!("Wrote {} bytes to {:?}", bytes.len(), target);
    Ok(target.to_path_buf())
}

pub fn excel_file_name(semester: &str) -> String {
    format!("students_scores_{}.xlsx", semester)
}

pub fn diagram_file_name(semester: &str, field: ScoreField, format: DiagramFormat) -> String {
    format!("score_diagram_{}_{}.{}", semester, field.as_str(), format.extension())
}

pub fn asset_file_name(asset_type: AssetType, file_uuid: &str) -> String {
    format!("{}_{}", asset_type.as_str(), file_uuid)
}

pub const TEMPLATE_FILE_NAME: &str = "students_template.csv";

/// UTF-8 CSV with a byte-order mark so spreadsheet tools detect the encoding.
pub fn import_template() -> Vec<u8> {
    let csv = TEMPLATE_ROWS
        .iter()
        .map(|row| row.join(","))
        .collect::<Vec<_>>()
        .join("\n");
    let mut bytes = "\u{feff}".as_bytes().to_vec();
    bytes.extend_from_slice(csv.as_bytes());
    bytes
}
