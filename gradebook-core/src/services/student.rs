use serde::de::IgnoredAny;
use serde_json::json;
use tracing::info;

use crate::client::{ApiClient, FormPart, Transport};
use crate::config::endpoints::student as ep;
use crate::error::{GradebookError, Result};
use crate::types::{
    CreateStudentRequest, ExportStudentsExcelRequest, Student, StudentFilters, StudentStatusStats,
    UpdateStudentRequest, UpdateStudentStatusRequest, UploadStudentsExcelResponse, UploadedFile,
};

pub const NOT_FOUND: &str = "Student not found";
pub const EXPORT_FAILED: &str = "Failed to export Excel file";

pub async fn create<T: Transport>(client: &ApiClient<T>, request: &CreateStudentRequest) -> Result<Student> {
    client.request(ep::CREATE, request).await
}

pub async fn list<T: Transport>(client: &ApiClient<T>, filters: &StudentFilters) -> Result<Vec<Student>> {
    let students: Option<Vec<Student>> = client.request(ep::READ, filters).await?;
    Ok(students.unwrap_or_default())
}

pub async fn get<T: Transport>(client: &ApiClient<T>, student_uuid: &str) -> Result<Student> {
    first(list(client, &StudentFilters::by_uuid(student_uuid)).await?)
}

pub async fn get_by_number<T: Transport>(client: &ApiClient<T>, student_number: &str) -> Result<Student> {
    first(list(client, &StudentFilters::by_number(student_number)).await?)
}

fn first(students: Vec<Student>) -> Result<Student> {
    students
        .into_iter()
        .next()
        .ok_or_else(|| GradebookError::not_found(NOT_FOUND))
}

pub async fn update<T: Transport>(client: &ApiClient<T>, request: &UpdateStudentRequest) -> Result<Student> {
    client.request(ep::UPDATE, request).await
}

pub async fn delete<T: Transport>(client: &ApiClient<T>, student_uuid: &str) -> Result<()> {
    let _: IgnoredAny = client
        .request(ep::DELETE, &json!({ "student_uuid": student_uuid }))
        .await?;
    Ok(())
}

pub async fn update_status<T: Transport>(
    client: &ApiClient<T>,
    request: &UpdateStudentStatusRequest,
) -> Result<Student> {
    client.request(ep::STATUS, request).await
}

/// Import a roster spreadsheet. Rows the backend rejects come back in
/// `errors` rather than failing the whole call.
pub async fn upload_excel<T: Transport>(
    client: &ApiClient<T>,
    file: UploadedFile,
) -> Result<UploadStudentsExcelResponse> {
    let parts = vec![FormPart::File {
        name: "file".to_string(),
        file_name: file.file_name,
        content: file.content,
    }];
    let response: UploadStudentsExcelResponse = client.upload(ep::UPLOAD_EXCEL, parts).await?;
    info!(
        "Imported {} students ({} rows rejected)",
        response.created_count, response.error_count
    );
    Ok(response)
}

/// Semester score sheet as `.xlsx` bytes.
pub async fn export_excel<T: Transport>(
    client: &ApiClient<T>,
    request: &ExportStudentsExcelRequest,
) -> Result<Vec<u8>> {
    client.download(ep::EXPORT_EXCEL, request, EXPORT_FAILED).await
}

/// Head count per status, computed from the semester's roster.
pub async fn status_stats<T: Transport>(client: &ApiClient<T>, semester: &str) -> Result<StudentStatusStats> {
    let students = list(client, &StudentFilters::by_semester(semester)).await?;
    Ok(StudentStatusStats::from_students(&students))
}
