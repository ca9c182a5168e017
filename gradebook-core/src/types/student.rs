use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationError};

/// Enrollment status. The backend uses the Chinese labels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StudentStatus {
    #[serde(rename = "修業中")]
    InProgress,
    #[serde(rename = "二退")]
    Withdrawn,
    #[serde(rename = "被當")]
    Failed,
    #[serde(rename = "修業完畢")]
    Completed,
}

impl StudentStatus {
    pub const ALL: [StudentStatus; 4] = [
        StudentStatus::InProgress,
        StudentStatus::Completed,
        StudentStatus::Failed,
        StudentStatus::Withdrawn,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::InProgress => "修業中",
            Self::Withdrawn => "二退",
            Self::Failed => "被當",
            Self::Completed => "修業完畢",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::InProgress => "in-progress",
            Self::Withdrawn => "withdrawn",
            Self::Failed => "failed",
            Self::Completed => "completed",
        }
    }

    /// Moving a student to this status makes the backend clear their scores.
    pub fn clears_scores(&self) -> bool {
        matches!(self, Self::Withdrawn)
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StudentStatus {
    type Err = String;

    /// Accepts either the wire label (`修業中`) or the English key (`in-progress`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label() == s || status.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Unknown student status '{}'. Expected one of: in-progress, completed, failed, withdrawn",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub student_uuid: String,
    pub student_name: String,
    pub student_number: String,
    pub student_semester: String,
    pub student_status: StudentStatus,
    #[serde(default)]
    pub student_created_at: String,
    #[serde(default)]
    pub student_updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateStudentRequest {
    pub student_name: String,
    pub student_number: String,
    pub student_semester: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_status: Option<StudentStatus>,
}

impl CreateStudentRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require("student_name", &self.student_name)?;
        validation::validate_student_number(&self.student_number)?;
        validation::validate_semester(&self.student_semester)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateStudentRequest {
    pub student_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_semester: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_status: Option<StudentStatus>,
}

impl UpdateStudentRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require("student_uuid", &self.student_uuid)?;
        if let Some(name) = &self.student_name {
            validation::require("student_name", name)?;
        }
        if let Some(number) = &self.student_number {
            validation::validate_student_number(number)?;
        }
        if let Some(semester) = &self.student_semester {
            validation::validate_semester(semester)?;
        }
        Ok(())
    }
}

/// Filters for the student read endpoint; unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudentFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_semester: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_status: Option<StudentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
}

impl StudentFilters {
    pub fn by_uuid(uuid: &str) -> Self {
        Self {
            student_uuid: Some(uuid.to_string()),
            ..Default::default()
        }
    }

    pub fn by_number(number: &str) -> Self {
        Self {
            student_number: Some(number.to_string()),
            ..Default::default()
        }
    }

    pub fn by_semester(semester: &str) -> Self {
        Self {
            student_semester: Some(semester.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateStudentStatusRequest {
    pub student_uuid: String,
    pub student_status: StudentStatus,
}

/// Per-status head count for one semester.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentStatusStats {
    #[serde(rename = "修業中")]
    pub in_progress: usize,
    #[serde(rename = "修業完畢")]
    pub completed: usize,
    #[serde(rename = "被當")]
    pub failed: usize,
    #[serde(rename = "二退")]
    pub withdrawn: usize,
}

impl StudentStatusStats {
    pub fn from_students<'a>(students: impl IntoIterator<Item = &'a Student>) -> Self {
        let mut stats = Self::default();
        for student in students {
            stats.record(student.student_status);
        }
        stats
    }

    pub fn record(&mut self, status: StudentStatus) {
        *self.slot(status) += 1;
    }

    pub fn count(&self, status: StudentStatus) -> usize {
        match status {
            StudentStatus::InProgress => self.in_progress,
            StudentStatus::Completed => self.completed,
            StudentStatus::Failed => self.failed,
            StudentStatus::Withdrawn => self.withdrawn,
        }
    }

    pub fn total(&self) -> usize {
        self.in_progress + self.completed + self.failed + self.withdrawn
    }

    fn slot(&mut self, status: StudentStatus) -> &mut usize {
        match status {
            StudentStatus::InProgress => &mut self.in_progress,
            StudentStatus::Completed => &mut self.completed,
            StudentStatus::Failed => &mut self.failed,
            StudentStatus::Withdrawn => &mut self.withdrawn,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadStudentsExcelResponse {
    #[serde(default)]
    pub created_count: u32,
    #[serde(default)]
    pub error_count: u32,
    #[serde(default)]
    pub created_students: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportStudentsExcelRequest {
    pub student_semester: String,
}
