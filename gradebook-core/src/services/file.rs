use serde::de::IgnoredAny;

use crate::client::{ApiClient, FormPart, Transport};
use crate::config::endpoints::file as ep;
use crate::error::Result;
use crate::types::{
    DeleteFileRequest, DownloadFileRequest, UpdateFileRequest, UpdateFileResponse, UploadFileRequest,
    UploadFileResponse, UploadedFile,
};

pub const DOWNLOAD_FAILED: &str = "Failed to download file";

fn file_part(file: UploadedFile) -> FormPart {
    FormPart::File {
        name: "file".to_string(),
        file_name: file.file_name,
        content: file.content,
    }
}

fn text_part(name: &str, value: &str) -> FormPart {
    FormPart::Text {
        name: name.to_string(),
        value: value.to_string(),
    }
}

/// Attach one or more files to an exam. Each file is sent as its own
/// `file` part.
pub async fn upload<T: Transport>(client: &ApiClient<T>, request: UploadFileRequest) -> Result<UploadFileResponse> {
    let mut parts = vec![
        text_part("test_uuid", &request.test_uuid),
        text_part("asset_type", request.asset_type.as_str()),
    ];
    parts.extend(request.files.into_iter().map(file_part));
    client.upload(ep::CREATE, parts).await
}

pub async fn download<T: Transport>(client: &ApiClient<T>, request: &DownloadFileRequest) -> Result<Vec<u8>> {
    client.download(ep::READ, request, DOWNLOAD_FAILED).await
}

/// Replace the stored content of an existing asset.
pub async fn update<T: Transport>(client: &ApiClient<T>, request: UpdateFileRequest) -> Result<UpdateFileResponse> {
    let parts = vec![
        text_part("uid", &request.uid),
        text_part("asset_type", request.asset_type.as_str()),
        file_part(request.file),
    ];
    client.upload(ep::UPDATE, parts).await
}

pub async fn delete<T: Transport>(client: &ApiClient<T>, request: &DeleteFileRequest) -> Result<()> {
    let _: IgnoredAny = client.request(ep::DELETE, request).await?;
    Ok(())
}
