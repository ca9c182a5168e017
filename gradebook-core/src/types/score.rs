use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::common::text_or_number;
use super::student::{Student, StudentStatus};
use crate::validation::{self, ValidationError};

/// One of the four raw exam components a client may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreField {
    #[serde(rename = "score_quiz1")]
    Quiz1,
    #[serde(rename = "score_midterm")]
    Midterm,
    #[serde(rename = "score_quiz2")]
    Quiz2,
    #[serde(rename = "score_finalexam")]
    FinalExam,
}

impl ScoreField {
    pub const ALL: [ScoreField; 4] = [
        ScoreField::Quiz1,
        ScoreField::Midterm,
        ScoreField::Quiz2,
        ScoreField::FinalExam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quiz1 => "score_quiz1",
            Self::Midterm => "score_midterm",
            Self::Quiz2 => "score_quiz2",
            Self::FinalExam => "score_finalexam",
        }
    }

    /// Display name, which is also the exam's `test_name`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Quiz1 => "第一次小考",
            Self::Midterm => "期中考",
            Self::Quiz2 => "第二次小考",
            Self::FinalExam => "期末考",
        }
    }

    pub fn from_test_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.label() == name.trim())
    }

    pub fn column(&self) -> ScoreColumn {
        match self {
            Self::Quiz1 => ScoreColumn::Quiz1,
            Self::Midterm => ScoreColumn::Midterm,
            Self::Quiz2 => ScoreColumn::Quiz2,
            Self::FinalExam => ScoreColumn::FinalExam,
        }
    }
}

impl fmt::Display for ScoreField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoreField {
    type Err = String;

    /// Accepts `score_quiz1`, `quiz1` or the exam name `第一次小考`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| {
                field.as_str() == s
                    || field.as_str().trim_start_matches("score_") == s
                    || field.label() == s
            })
            .ok_or_else(|| {
                format!(
                    "Unknown score field '{}'. Expected one of: quiz1, midterm, quiz2, finalexam",
                    s
                )
            })
    }
}

/// A readable score column: the four raw fields plus the computed total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreColumn {
    #[serde(rename = "score_quiz1")]
    Quiz1,
    #[serde(rename = "score_midterm")]
    Midterm,
    #[serde(rename = "score_quiz2")]
    Quiz2,
    #[serde(rename = "score_finalexam")]
    FinalExam,
    #[serde(rename = "score_total")]
    Total,
}

impl ScoreColumn {
    pub const ALL: [ScoreColumn; 5] = [
        ScoreColumn::Quiz1,
        ScoreColumn::Midterm,
        ScoreColumn::Quiz2,
        ScoreColumn::FinalExam,
        ScoreColumn::Total,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Total => "總分",
            Self::Quiz1 => ScoreField::Quiz1.label(),
            Self::Midterm => ScoreField::Midterm.label(),
            Self::Quiz2 => ScoreField::Quiz2.label(),
            Self::FinalExam => ScoreField::FinalExam.label(),
        }
    }
}

impl From<ScoreField> for ScoreColumn {
    fn from(field: ScoreField) -> Self {
        field.column()
    }
}

impl FromStr for ScoreColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "score_total" | "total" | "總分" => Ok(Self::Total),
            other => other.parse::<ScoreField>().map(Self::from),
        }
    }
}

/// Score record for one student. Raw values travel as strings and may be
/// blank until entered; `score_total` is written by the backend only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub score_uuid: String,
    pub f_student_uuid: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub score_quiz1: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub score_midterm: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub score_quiz2: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub score_finalexam: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub score_total: Option<String>,
    #[serde(default)]
    pub score_created_at: String,
    #[serde(default)]
    pub score_updated_at: String,
}

impl Score {
    pub fn value(&self, column: ScoreColumn) -> Option<&str> {
        let value = match column {
            ScoreColumn::Quiz1 => &self.score_quiz1,
            ScoreColumn::Midterm => &self.score_midterm,
            ScoreColumn::Quiz2 => &self.score_quiz2,
            ScoreColumn::FinalExam => &self.score_finalexam,
            ScoreColumn::Total => &self.score_total,
        };
        value.as_deref()
    }
}

/// Score joined with the identity of the student it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreWithStudent {
    #[serde(flatten)]
    pub score: Score,
    pub student_name: String,
    pub student_number: String,
    pub student_semester: String,
    pub student_status: StudentStatus,
}

impl ScoreWithStudent {
    pub fn new(score: Score, student: &Student) -> Self {
        Self {
            score,
            student_name: student.student_name.clone(),
            student_number: student.student_number.clone(),
            student_semester: student.student_semester.clone(),
            student_status: student.student_status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentWithScore {
    pub student: Student,
    pub score: Option<Score>,
}

/// A value submitted for a score field, either typed text or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Number(f64),
    Text(String),
}

impl ScoreValue {
    /// Check the value lies in [0, 100] without changing its wire form.
    pub fn validate(&self) -> Result<f64, ValidationError> {
        match self {
            Self::Number(n) => validation::validate_score(&n.to_string()),
            Self::Text(s) => validation::validate_score(s),
        }
    }
}

impl fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ScoreValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ScoreValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for ScoreValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Create-or-update of a single score field, keyed by student UUID.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpsertScoreRequest {
    pub f_student_uuid: String,
    pub update_field: ScoreField,
    pub score_value: ScoreValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f_student_uuid: Option<String>,
}

impl ScoreFilters {
    pub fn by_uuid(uuid: &str) -> Self {
        Self {
            score_uuid: Some(uuid.to_string()),
            ..Default::default()
        }
    }

    pub fn by_student(student_uuid: &str) -> Self {
        Self {
            f_student_uuid: Some(student_uuid.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculateFinalScoresRequest {
    pub test_semester: String,
    pub passing_score: u8,
}

impl CalculateFinalScoresRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_semester(&self.test_semester)?;
        if self.passing_score > 100 {
            return Err(ValidationError::InvalidPassingScore(self.passing_score.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateFinalScoresResponse {
    pub updated_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestStatisticsRequest {
    pub score_semester: String,
    pub score_field: ScoreColumn,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_empty: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestStatistics {
    pub semester: String,
    pub score_field: String,
    pub total_count: u32,
    pub average: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagramBins {
    FixedWidth { width: f64 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramFormat {
    #[default]
    Png,
    Jpg,
}

impl DiagramFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
        }
    }
}

impl FromStr for DiagramFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            other => Err(format!("Unsupported diagram format '{}' (png or jpg)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateScoreDiagramRequest {
    pub test_semester: String,
    pub score_field: ScoreField,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bins: Option<DiagramBins>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<DiagramFormat>,
}

impl GenerateScoreDiagramRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_semester(&self.test_semester)?;
        if let Some(DiagramBins::FixedWidth { width }) = self.bins {
            if !(width.is_finite() && width > 0.0) {
                return Err(ValidationError::InvalidBinWidth(width));
            }
        }
        Ok(())
    }
}
