//! Presentation helpers shared by every front end.

use crate::types::{ExamState, StudentStatus};

pub const BLANK: &str = "-";

/// Score cell text: blank or missing values render as `-`.
pub fn score_display(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => BLANK,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeBand {
    High,
    Pass,
    Fail,
}

impl GradeBand {
    /// `None` for blank or non-numeric values.
    pub fn classify(value: Option<&str>) -> Option<Self> {
        let score: f64 = value?.trim().parse().ok()?;
        if !score.is_finite() {
            return None;
        }
        Some(if score >= 80.0 {
            Self::High
        } else if score >= 60.0 {
            Self::Pass
        } else {
            Self::Fail
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Blue,
    Green,
    Red,
    Gray,
}

pub fn student_status_color(status: StudentStatus) -> BadgeColor {
    match status {
        StudentStatus::InProgress => BadgeColor::Blue,
        StudentStatus::Completed => BadgeColor::Green,
        StudentStatus::Failed => BadgeColor::Red,
        StudentStatus::Withdrawn => BadgeColor::Gray,
    }
}

pub fn exam_state_color(state: ExamState) -> BadgeColor {
    match state {
        ExamState::NotCreated => BadgeColor::Gray,
        ExamState::Created => BadgeColor::Blue,
        ExamState::Finalized => BadgeColor::Green,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_display() {
        assert_eq!(score_display(Some("85")), "85");
        assert_eq!(score_display(Some("  ")), "-");
        assert_eq!(score_display(None), "-");
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(GradeBand::classify(Some("80")), Some(GradeBand::High));
        assert_eq!(GradeBand::classify(Some("79.99")), Some(GradeBand::Pass));
        assert_eq!(GradeBand::classify(Some("60")), Some(GradeBand::Pass));
        assert_eq!(GradeBand::classify(Some("12")), Some(GradeBand::Fail));
        assert_eq!(GradeBand::classify(Some("")), None);
        assert_eq!(GradeBand::classify(Some("absent")), None);
        assert_eq!(GradeBand::classify(None), None);
    }

    #[test]
    fn test_badge_colors() {
        assert_eq!(student_status_color(StudentStatus::Withdrawn), BadgeColor::Gray);
        assert_eq!(exam_state_color(ExamState::Finalized), BadgeColor::Green);
    }
}
