//! Glue between the CLI pages and the core library: every backend call goes
//! through [`call`], which drives an [`AsyncState`] and turns failures into
//! readable reports.

use std::future::Future;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use tracing::debug;

use gradebook_core::export;
use gradebook_core::types::UploadedFile;
use gradebook_core::{AsyncState, GradebookError};

/// Await one backend call, logging its status transitions.
pub async fn call<T, F>(label: &str, request: F) -> Result<T>
where
    F: Future<Output = gradebook_core::Result<T>>,
{
    let mut state = AsyncState::default();
    state.begin();
    debug!("{}: {}", label, state.status());

    state.finish(request.await);
    debug!("{}: {}", label, state.status());

    match state.into_result() {
        Some(Ok(data)) => Ok(data),
        Some(Err(e)) => Err(anyhow!(describe(&e))).with_context(|| format!("{} failed", label)),
        None => bail!("{} did not complete", label),
    }
}

/// Message, code and any field-level details of a backend failure.
pub fn describe(err: &GradebookError) -> String {
    let mut text = format!("{} (code {})", err, err.code());
    if let Some(details) = err.details() {
        for (field, messages) in details {
            text.push_str(&format!("\n  {}: {}", field, messages.join("; ")));
        }
    }
    text
}

/// Ask a yes/no question on stdin; `assume_yes` skips the prompt.
pub fn confirm(question: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

pub fn read_upload(path: &Path) -> Result<UploadedFile> {
    UploadedFile::from_path(path).with_context(|| format!("Failed to read {:?}", path))
}

/// Write a downloaded blob to `output`, or to `default_name` in the current
/// directory.
pub fn save_blob(bytes: &[u8], output: Option<PathBuf>, default_name: &str) -> Result<PathBuf> {
    let target = output.unwrap_or_else(|| PathBuf::from(default_name));
    let written = export::write_blob(bytes, &target)?;
    println!("Saved {} ({} bytes)", written.display(), bytes.len());
    Ok(written)
}
