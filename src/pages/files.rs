use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use gradebook_core::client::{ApiClient, Transport};
use gradebook_core::export;
use gradebook_core::services::file;
use gradebook_core::types::{
    AssetType, DeleteFileRequest, DownloadFileRequest, UpdateFileRequest, UploadFileRequest,
    UploadFileResponse,
};

use super::use_color;
use crate::commands::{call, confirm, read_upload, save_blob};
use crate::components::status_badge::exam_state_badge;

#[derive(Subcommand, Debug)]
pub enum FilesCommand {
    /// Attach one or more files to an exam
    Upload {
        test_uuid: String,
        /// paper, test_pic, histogram or test_pic_histogram
        asset_type: AssetType,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    Download {
        uid: String,
        asset_type: AssetType,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace the content of a stored file
    Replace {
        uid: String,
        asset_type: AssetType,
        file: PathBuf,
    },
    Delete {
        uid: String,
        asset_type: AssetType,
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run<T: Transport>(api: &ApiClient<T>, cmd: FilesCommand) -> Result<()> {
    match cmd {
        FilesCommand::Upload {
            test_uuid,
            asset_type,
            files,
        } => {
            let files = files
                .iter()
                .map(|path| read_upload(path))
                .collect::<Result<Vec<_>>>()?;
            let request = UploadFileRequest {
                test_uuid,
                asset_type,
                files,
            };
            let uploaded = call("Upload files", file::upload(api, request)).await?;
            println!("{}", upload_summary(&uploaded, use_color()));
        }
        FilesCommand::Download {
            uid,
            asset_type,
            output,
        } => {
            let request = DownloadFileRequest {
                test_pic_uuid: uid,
                asset_type,
            };
            let bytes = call("Download file", file::download(api, &request)).await?;
            let default_name = export::asset_file_name(asset_type, &request.test_pic_uuid);
            save_blob(&bytes, output, &default_name)?;
        }
        FilesCommand::Replace {
            uid,
            asset_type,
            file: path,
        } => {
            let request = UpdateFileRequest {
                uid,
                asset_type,
                file: read_upload(&path)?,
            };
            let updated = call("Replace file", file::update(api, request)).await?;
            println!("Replaced {} ({})", updated.file_uuid, updated.asset_type);
        }
        FilesCommand::Delete {
            uid,
            asset_type,
            yes,
        } => {
            if !confirm(&format!("Delete {} file {}?", asset_type, uid), yes)? {
                println!("Cancelled");
                return Ok(());
            }
            let request = DeleteFileRequest { uid, asset_type };
            call("Delete file", file::delete(api, &request)).await?;
            println!("Deleted {}", request.uid);
        }
    }
    Ok(())
}

fn upload_summary(uploaded: &UploadFileResponse, ansi: bool) -> String {
    let mut text = format!(
        "Uploaded {} {} file(s) as {}",
        uploaded.file_count, uploaded.asset_type, uploaded.file_uuid
    );
    // Unknown labels are shown as sent.
    let state = match uploaded.state() {
        Some(state) => Some(exam_state_badge(state, ansi)),
        None => uploaded.test_states.clone(),
    };
    if let Some(state) = state {
        text.push_str(&format!("\nTest is now {}", state));
    }
    text
}
