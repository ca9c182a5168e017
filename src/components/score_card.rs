use gradebook_core::display::{score_display, GradeBand, BLANK};
use gradebook_core::types::common::parse_timestamp;
use gradebook_core::types::{Score, ScoreColumn, Student};

use super::status_badge::student_status_badge;
use super::table::display_width;

fn band_marker(value: Option<&str>) -> &'static str {
    match GradeBand::classify(value) {
        Some(GradeBand::High) => " ★",
        Some(GradeBand::Fail) => " !",
        Some(GradeBand::Pass) | None => "",
    }
}

/// One student's scores, one line per column including the total.
pub fn render(student: &Student, score: Option<&Score>, ansi: bool) -> String {
    let mut out = format!(
        "{} ({})  {}  {}\n",
        student.student_name,
        student.student_number,
        student.student_semester,
        student_status_badge(student.student_status, ansi)
    );

    let Some(score) = score else {
        out.push_str("No scores recorded yet");
        return out;
    };

    let label_width = ScoreColumn::ALL
        .iter()
        .map(|c| display_width(c.label()))
        .max()
        .unwrap_or(0);
    for column in ScoreColumn::ALL {
        let value = score.value(column);
        let label = column.label();
        out.push_str(&format!(
            "  {}{}{}{}\n",
            label,
            " ".repeat(label_width - display_width(label) + 2),
            score_display(value),
            band_marker(value)
        ));
    }

    let updated = parse_timestamp(&score.score_updated_at)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| BLANK.to_string());
    out.push_str(&format!("Last updated: {}", updated));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradebook_core::types::StudentStatus;

    fn student() -> Student {
        Student {
            student_uuid: "u-1".into(),
            student_name: "王小明".into(),
            student_number: "B11001001".into(),
            student_semester: "1141".into(),
            student_status: StudentStatus::InProgress,
            student_created_at: String::new(),
            student_updated_at: String::new(),
        }
    }

    #[test]
    fn test_card_without_score() {
        let card = render(&student(), None, false);
        assert!(card.starts_with("王小明 (B11001001)  1141  修業中"));
        assert!(card.ends_with("No scores recorded yet"));
    }

    #[test]
    fn test_card_marks_bands_and_blanks() {
        let score = Score {
            score_uuid: "s-1".into(),
            f_student_uuid: "u-1".into(),
            score_quiz1: Some("92".into()),
            score_midterm: Some("45".into()),
            score_quiz2: Some("".into()),
            score_finalexam: None,
            score_total: Some("70".into()),
            score_created_at: String::new(),
            score_updated_at: "2026-01-15T09:00:00".into(),
        };
        let card = render(&student(), Some(&score), false);
        assert!(card.contains("92 ★"));
        assert!(card.contains("45 !"));
        assert!(card.contains("總分"));
        assert_eq!(card.lines().filter(|l| l.trim_end().ends_with('-')).count(), 2);
        assert!(card.ends_with("Last updated: 2026-01-15 09:00"));

        // Values line up in one terminal column despite wide labels.
        let value_columns: Vec<usize> = card
            .lines()
            .skip(1)
            .take(ScoreColumn::ALL.len())
            .map(|line| {
                let rest = line.trim_start();
                let label = rest.split(' ').next().unwrap();
                let value = rest[label.len()..].trim_start();
                display_width(&line[..line.len() - value.len()])
            })
            .collect();
        assert_eq!(value_columns, vec![14; ScoreColumn::ALL.len()]);
    }
}
