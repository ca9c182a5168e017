//! Operations that span more than one resource call.

pub mod batch;

use std::collections::HashMap;

use tracing::{debug, info};

use crate::client::{ApiClient, Transport};
use crate::error::Result;
use crate::services::{score, student};
use crate::types::{
    Score, ScoreField, ScoreFilters, ScoreValue, ScoreWithStudent, Student, StudentFilters,
    StudentWithScore, UpsertScoreRequest,
};

pub use batch::{batch_update_scores, BatchEntry, BatchOutcome, ScoreUpdate};

/// Every score whose owner is among the fetched students, enriched with the
/// owner's identity. `semester` narrows the student side only.
pub async fn scores_with_students<T: Transport>(
    client: &ApiClient<T>,
    semester: Option<&str>,
) -> Result<Vec<ScoreWithStudent>> {
    let filters = semester.map(StudentFilters::by_semester).unwrap_or_default();
    let students = student::list(client, &filters).await?;
    let scores = score::list(client, &ScoreFilters::default()).await?;

    let joined = join_scores(&students, scores);
    debug!(
        "Joined {} scores against {} students",
        joined.len(),
        students.len()
    );
    Ok(joined)
}

/// Keeps score order; scores without a matching student are dropped.
pub fn join_scores(students: &[Student], scores: Vec<Score>) -> Vec<ScoreWithStudent> {
    let by_uuid: HashMap<&str, &Student> = students
        .iter()
        .map(|s| (s.student_uuid.as_str(), s))
        .collect();

    scores
        .into_iter()
        .filter_map(|score| {
            let owner = by_uuid.get(score.f_student_uuid.as_str()).copied()?;
            Some(ScoreWithStudent::new(score, owner))
        })
        .collect()
}

/// The semester roster, each student paired with their score if any.
pub async fn students_with_scores<T: Transport>(
    client: &ApiClient<T>,
    semester: &str,
) -> Result<Vec<StudentWithScore>> {
    let students = student::list(client, &StudentFilters::by_semester(semester)).await?;
    let scores = score::list(client, &ScoreFilters::default()).await?;
    Ok(pair_students(students, scores))
}

/// When a student has several score rows, the last one wins.
pub fn pair_students(students: Vec<Student>, scores: Vec<Score>) -> Vec<StudentWithScore> {
    let mut by_student: HashMap<String, Score> = HashMap::with_capacity(scores.len());
    for score in scores {
        by_student.insert(score.f_student_uuid.clone(), score);
    }

    students
        .into_iter()
        .map(|student| {
            let score = by_student.remove(&student.student_uuid);
            StudentWithScore { student, score }
        })
        .collect()
}

pub async fn score_by_student_number<T: Transport>(
    client: &ApiClient<T>,
    student_number: &str,
) -> Result<Score> {
    let owner = student::get_by_number(client, student_number).await?;
    score::get_by_student(client, &owner.student_uuid).await
}

/// Resolve the student number first; nothing is written when it is unknown.
pub async fn update_score_by_student_number<T: Transport>(
    client: &ApiClient<T>,
    student_number: &str,
    field: ScoreField,
    value: ScoreValue,
) -> Result<Score> {
    let owner = student::get_by_number(client, student_number).await?;
    info!(
        "Setting {} = {} for {} ({})",
        field, value, student_number, owner.student_uuid
    );
    score::upsert(
        client,
        &UpsertScoreRequest {
            f_student_uuid: owner.student_uuid,
            update_field: field,
            score_value: value,
        },
    )
    .await
}
