use gradebook_core::display::{self, BadgeColor};
use gradebook_core::types::{ExamState, StudentStatus};

fn ansi_code(color: BadgeColor) -> &'static str {
    match color {
        BadgeColor::Blue => "34",
        BadgeColor::Green => "32",
        BadgeColor::Red => "31",
        BadgeColor::Gray => "90",
    }
}

/// `label`, wrapped in an ANSI color when `ansi` is set.
pub fn badge(label: &str, color: BadgeColor, ansi: bool) -> String {
    if ansi {
        format!("\x1b[{}m{}\x1b[0m", ansi_code(color), label)
    } else {
        label.to_string()
    }
}

pub fn student_status_badge(status: StudentStatus, ansi: bool) -> String {
    badge(status.label(), display::student_status_color(status), ansi)
}

pub fn exam_state_badge(state: ExamState, ansi: bool) -> String {
    badge(state.label(), display::exam_state_color(state), ansi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_colored() {
        assert_eq!(student_status_badge(StudentStatus::Failed, false), "被當");
        assert_eq!(
            exam_state_badge(ExamState::Finalized, true),
            "\x1b[32m考卷成績結算\x1b[0m"
        );
    }
}
