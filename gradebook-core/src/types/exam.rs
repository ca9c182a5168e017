//! Exams ("tests" on the wire: `test_uuid`, `Test_MetadataWriter`, ...).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::common::text_or_number;
use super::score::ScoreField;
use crate::validation::{self, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamState {
    #[serde(rename = "尚未出考卷")]
    NotCreated,
    #[serde(rename = "考卷完成")]
    Created,
    #[serde(rename = "考卷成績結算")]
    Finalized,
}

impl ExamState {
    pub const ALL: [ExamState; 3] = [ExamState::NotCreated, ExamState::Created, ExamState::Finalized];

    pub fn label(&self) -> &'static str {
        match self {
            Self::NotCreated => "尚未出考卷",
            Self::Created => "考卷完成",
            Self::Finalized => "考卷成績結算",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::NotCreated => "not-created",
            Self::Created => "created",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for ExamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExamState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|state| state.label() == s || state.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Unknown exam state '{}'. Expected one of: not-created, created, finalized",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub test_uuid: String,
    pub test_name: String,
    #[serde(default)]
    pub test_date: String,
    #[serde(default)]
    pub test_range: String,
    pub test_semester: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub test_weight: Option<String>,
    pub test_states: ExamState,
    #[serde(default)]
    pub pt_opt_score_uuid: Option<String>,
    #[serde(default)]
    pub test_created_at: String,
    #[serde(default)]
    pub test_updated_at: String,
}

impl Exam {
    /// Score field this exam feeds, when its name is one of the four known exams.
    pub fn score_field(&self) -> Option<ScoreField> {
        ScoreField::from_test_name(&self.test_name)
    }

    pub fn weight(&self) -> Option<f64> {
        self.test_weight
            .as_deref()
            .and_then(|w| w.trim().parse::<f64>().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateExamRequest {
    pub test_name: String,
    pub test_date: String,
    pub test_range: String,
    pub test_semester: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_weight: Option<String>,
}

impl CreateExamRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require("test_name", &self.test_name)?;
        validation::require("test_date", &self.test_date)?;
        validation::require("test_range", &self.test_range)?;
        validation::validate_semester(&self.test_semester)?;
        if let Some(weight) = &self.test_weight {
            validate_single_weight(&self.test_name, weight)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateExamRequest {
    pub test_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_weight: Option<String>,
}

impl UpdateExamRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require("test_uuid", &self.test_uuid)?;
        if let Some(name) = &self.test_name {
            validation::require("test_name", name)?;
        }
        if let Some(weight) = &self.test_weight {
            validate_single_weight(self.test_name.as_deref().unwrap_or(&self.test_uuid), weight)?;
        }
        Ok(())
    }
}

fn validate_single_weight(test_name: &str, raw: &str) -> Result<(), ValidationError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if (0.0..=1.0).contains(&v) => Ok(()),
        Ok(_) => Err(ValidationError::WeightOutOfRange {
            test_name: test_name.to_string(),
            value: raw.trim().to_string(),
        }),
        Err(_) => Err(ValidationError::WeightNotNumeric {
            test_name: test_name.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExamFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_semester: Option<String>,
}

impl ExamFilters {
    pub fn by_uuid(uuid: &str) -> Self {
        Self {
            test_uuid: Some(uuid.to_string()),
            ..Default::default()
        }
    }

    pub fn by_semester(semester: &str) -> Self {
        Self {
            test_semester: Some(semester.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateExamStateRequest {
    pub test_uuid: String,
    pub test_states: ExamState,
}

/// Weight per exam name for one semester. Weights are decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetWeightsRequest {
    pub test_semester: String,
    pub weights: BTreeMap<String, String>,
}

impl SetWeightsRequest {
    pub fn validate(&self) -> Result<f64, ValidationError> {
        validation::validate_semester(&self.test_semester)?;
        validation::validate_weight_form(&self.weights)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetWeightsResponse {
    pub updated_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exam_decodes_numeric_weight() {
        let exam: Exam = serde_json::from_value(json!({
            "test_uuid": "t-1",
            "test_name": "期中考",
            "test_date": "2025-04-20",
            "test_range": "Ch1-Ch5",
            "test_semester": "1141",
            "test_weight": 0.3,
            "test_states": "考卷完成"
        }))
        .unwrap();
        assert_eq!(exam.test_states, ExamState::Created);
        assert_eq!(exam.weight(), Some(0.3));
        assert_eq!(exam.score_field(), Some(ScoreField::Midterm));
    }

    #[test]
    fn test_exam_state_parsing() {
        assert_eq!("finalized".parse::<ExamState>(), Ok(ExamState::Finalized));
        assert_eq!("尚未出考卷".parse::<ExamState>(), Ok(ExamState::NotCreated));
        assert!("graded".parse::<ExamState>().is_err());
    }

    #[test]
    fn test_create_request_validation() {
        let mut req = CreateExamRequest {
            test_name: "期中考".into(),
            test_date: "2025-04-20".into(),
            test_range: "Ch1-Ch5".into(),
            test_semester: "1141".into(),
            test_weight: None,
        };
        assert!(req.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "test_name": "期中考",
                "test_date": "2025-04-20",
                "test_range": "Ch1-Ch5",
                "test_semester": "1141"
            })
        );
        req.test_weight = Some("1.2".into());
        assert!(matches!(
            req.validate(),
            Err(ValidationError::WeightOutOfRange { .. })
        ));
        req.test_weight = None;
        req.test_range = "".into();
        assert_eq!(req.validate(), Err(ValidationError::MissingField("test_range")));
    }

    #[test]
    fn test_set_weights_request_rejects_bad_total() {
        let req = SetWeightsRequest {
            test_semester: "1141".into(),
            weights: [("期中考", "0.5"), ("期末考", "0.51")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        assert!(matches!(req.validate(), Err(ValidationError::WeightSum { .. })));
    }
}
