use serde::de::IgnoredAny;
use serde_json::json;

use crate::client::{ApiClient, Transport};
use crate::config::endpoints::score as ep;
use crate::error::{GradebookError, Result};
use crate::types::{
    CalculateFinalScoresRequest, CalculateFinalScoresResponse, GenerateScoreDiagramRequest, Score,
    ScoreFilters, TestStatistics, TestStatisticsRequest, UpsertScoreRequest,
};

pub const NOT_FOUND: &str = "Score not found";
pub const NOT_FOUND_FOR_STUDENT: &str = "Score not found for this student";
pub const DIAGRAM_FAILED: &str = "Failed to generate score diagram";

/// Write one field of a student's score, creating the record if needed.
pub async fn upsert<T: Transport>(client: &ApiClient<T>, request: &UpsertScoreRequest) -> Result<Score> {
    client.request(ep::CREATE, request).await
}

pub async fn list<T: Transport>(client: &ApiClient<T>, filters: &ScoreFilters) -> Result<Vec<Score>> {
    let scores: Option<Vec<Score>> = client.request(ep::READ, filters).await?;
    Ok(scores.unwrap_or_default())
}

pub async fn get<T: Transport>(client: &ApiClient<T>, score_uuid: &str) -> Result<Score> {
    list(client, &ScoreFilters::by_uuid(score_uuid))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| GradebookError::not_found(NOT_FOUND))
}

pub async fn get_by_student<T: Transport>(client: &ApiClient<T>, student_uuid: &str) -> Result<Score> {
    list(client, &ScoreFilters::by_student(student_uuid))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| GradebookError::not_found(NOT_FOUND_FOR_STUDENT))
}

pub async fn update<T: Transport>(client: &ApiClient<T>, request: &UpsertScoreRequest) -> Result<Score> {
    client.request(ep::UPDATE, request).await
}

pub async fn delete<T: Transport>(client: &ApiClient<T>, score_uuid: &str) -> Result<()> {
    let _: IgnoredAny = client
        .request(ep::DELETE, &json!({ "score_uuid": score_uuid }))
        .await?;
    Ok(())
}

/// Ask the backend to recompute `score_total` for every student of a semester.
pub async fn calculate_final<T: Transport>(
    client: &ApiClient<T>,
    request: &CalculateFinalScoresRequest,
) -> Result<CalculateFinalScoresResponse> {
    client.request(ep::CALCULATION_FINAL, request).await
}

pub async fn test_statistics<T: Transport>(
    client: &ApiClient<T>,
    request: &TestStatisticsRequest,
) -> Result<TestStatistics> {
    client.request(ep::TEST_SCORE, request).await
}

/// Rendered score distribution image (png or jpg bytes).
pub async fn step_diagram<T: Transport>(
    client: &ApiClient<T>,
    request: &GenerateScoreDiagramRequest,
) -> Result<Vec<u8>> {
    client.download(ep::STEP_DIAGRAM, request, DIAGRAM_FAILED).await
}
