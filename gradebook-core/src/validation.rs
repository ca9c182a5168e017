use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Inclusive bounds for a raw exam score.
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

/// Maximum distance from 1.0 a weight total may have.
pub const WEIGHT_TOLERANCE: f64 = 1e-4;

static STUDENT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][0-9]{8}$").expect("student number pattern"));
static SEMESTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}$").expect("semester pattern"));

/// Input rejected before any request is sent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Score must be a number, got '{0}'")]
    ScoreNotNumeric(String),

    #[error("Score must be between 0 and 100, got {0}")]
    ScoreOutOfRange(String),

    #[error("Passing score must be an integer between 0 and 100, got '{0}'")]
    InvalidPassingScore(String),

    #[error("No weights provided")]
    NoWeights,

    #[error("Weight for '{test_name}' is missing")]
    MissingWeight { test_name: String },

    #[error("Weight for '{test_name}' must be a number, got '{value}'")]
    WeightNotNumeric { test_name: String, value: String },

    #[error("Weight for '{test_name}' must be between 0 and 1, got {value}")]
    WeightOutOfRange { test_name: String, value: String },

    #[error("Weights must sum to 1.0, current total is {total:.4}")]
    WeightSum { total: f64 },

    #[error("Student number must be one uppercase letter followed by 8 digits, got '{0}'")]
    InvalidStudentNumber(String),

    #[error("Semester must be 4 digits (e.g. 1141), got '{0}'")]
    InvalidSemester(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Bin width must be positive, got {0}")]
    InvalidBinWidth(f64),
}

/// Parse a score and check it lies in [0, 100].
pub fn validate_score(raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    let value: f64 = trimmed
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| ValidationError::ScoreNotNumeric(raw.to_string()))?;
    if !(SCORE_MIN..=SCORE_MAX).contains(&value) {
        return Err(ValidationError::ScoreOutOfRange(trimmed.to_string()));
    }
    Ok(value)
}

pub fn validate_passing_score(raw: &str) -> Result<u8, ValidationError> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|v| *v <= 100)
        .ok_or_else(|| ValidationError::InvalidPassingScore(raw.to_string()))
}

pub fn validate_student_number(raw: &str) -> Result<(), ValidationError> {
    if STUDENT_NUMBER.is_match(raw) {
        Ok(())
    } else {
        Err(ValidationError::InvalidStudentNumber(raw.to_string()))
    }
}

pub fn validate_semester(raw: &str) -> Result<(), ValidationError> {
    if SEMESTER.is_match(raw) {
        Ok(())
    } else {
        Err(ValidationError::InvalidSemester(raw.to_string()))
    }
}

pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Sum the proposed weights and accept only a total within
/// [`WEIGHT_TOLERANCE`] of 1.0. Returns the total on success.
pub fn validate_weight_sum(weights: &BTreeMap<String, String>) -> Result<f64, ValidationError> {
    if weights.is_empty() {
        return Err(ValidationError::NoWeights);
    }
    let mut total = 0.0;
    for (test_name, raw) in weights {
        total += parse_weight(test_name, raw)?;
    }
    if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(ValidationError::WeightSum { total });
    }
    Ok(total)
}

/// Full check run before submitting a weight form: every weight filled in,
/// the total equal to 1.0, and each weight inside [0, 1].
pub fn validate_weight_form(weights: &BTreeMap<String, String>) -> Result<f64, ValidationError> {
    if let Some((test_name, _)) = weights.iter().find(|(_, w)| w.trim().is_empty()) {
        return Err(ValidationError::MissingWeight {
            test_name: test_name.clone(),
        });
    }
    let total = validate_weight_sum(weights)?;
    for (test_name, raw) in weights {
        let value = parse_weight(test_name, raw)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::WeightOutOfRange {
                test_name: test_name.clone(),
                value: raw.trim().to_string(),
            });
        }
    }
    Ok(total)
}

fn parse_weight(test_name: &str, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValidationError::WeightNotNumeric {
            test_name: test_name.to_string(),
            value: raw.to_string(),
        })
}
