use std::collections::BTreeSet;

use serde::de::IgnoredAny;
use serde_json::json;

use crate::client::{ApiClient, Transport};
use crate::config::endpoints::exam as ep;
use crate::error::{GradebookError, Result};
use crate::types::{
    CreateExamRequest, Exam, ExamFilters, OneOrMany, SetWeightsRequest, SetWeightsResponse,
    UpdateExamRequest, UpdateExamStateRequest,
};

pub const NOT_FOUND: &str = "Test not found";

pub async fn create<T: Transport>(client: &ApiClient<T>, request: &CreateExamRequest) -> Result<Exam> {
    client.request(ep::CREATE, request).await
}

pub async fn list<T: Transport>(client: &ApiClient<T>, filters: &ExamFilters) -> Result<Vec<Exam>> {
    let exams: Option<Vec<Exam>> = client.request(ep::READ, filters).await?;
    Ok(exams.unwrap_or_default())
}

/// The read endpoint answers a uuid lookup with a list or a single object.
pub async fn get<T: Transport>(client: &ApiClient<T>, test_uuid: &str) -> Result<Exam> {
    let found: Option<OneOrMany<Exam>> = client.request(ep::READ, &ExamFilters::by_uuid(test_uuid)).await?;
    found
        .and_then(OneOrMany::into_first)
        .ok_or_else(|| GradebookError::not_found(NOT_FOUND))
}

pub async fn update<T: Transport>(client: &ApiClient<T>, request: &UpdateExamRequest) -> Result<Exam> {
    client.request(ep::UPDATE, request).await
}

pub async fn delete<T: Transport>(client: &ApiClient<T>, test_uuid: &str) -> Result<()> {
    let _: IgnoredAny = client
        .request(ep::DELETE, &json!({ "test_uuid": test_uuid }))
        .await?;
    Ok(())
}

pub async fn update_state<T: Transport>(
    client: &ApiClient<T>,
    request: &UpdateExamStateRequest,
) -> Result<Exam> {
    client.request(ep::STATUS, request).await
}

pub async fn set_weights<T: Transport>(
    client: &ApiClient<T>,
    request: &SetWeightsRequest,
) -> Result<SetWeightsResponse> {
    client.request(ep::SET_WEIGHT, request).await
}

/// Distinct semesters that have at least one exam, newest first.
pub async fn semesters<T: Transport>(client: &ApiClient<T>) -> Result<Vec<String>> {
    let exams = list(client, &ExamFilters::default()).await?;
    Ok(distinct_semesters(&exams))
}

pub fn distinct_semesters(exams: &[Exam]) -> Vec<String> {
    let unique: BTreeSet<&str> = exams.iter().map(|e| e.test_semester.as_str()).collect();
    unique.into_iter().rev().map(str::to_string).collect()
}
