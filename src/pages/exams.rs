use std::collections::BTreeMap;

use anyhow::{bail, Result};
use clap::{Subcommand, ValueEnum};

use gradebook_core::client::{ApiClient, Transport};
use gradebook_core::display::BLANK;
use gradebook_core::listing::{paginate, sort_rows, SortState, SortValue};
use gradebook_core::services::exam;
use gradebook_core::types::{
    CreateExamRequest, Exam, ExamFilters, ExamState, SetWeightsRequest, UpdateExamRequest,
    UpdateExamStateRequest,
};

use super::{use_color, ListArgs};
use crate::commands::{call, confirm};
use crate::components::status_badge::exam_state_badge;
use crate::components::table::{page_footer, Table};

#[derive(Subcommand, Debug)]
pub enum ExamsCommand {
    List {
        #[arg(long)]
        semester: Option<String>,
        #[arg(long, value_enum)]
        sort: Option<ExamSortKey>,
        #[command(flatten)]
        list: ListArgs,
    },
    Show { test_uuid: String },
    Create {
        /// Exam name; 第一次小考, 期中考, 第二次小考 and 期末考 map to score fields
        #[arg(long)]
        name: String,
        #[arg(long)]
        date: String,
        /// Material covered
        #[arg(long)]
        range: String,
        #[arg(long)]
        semester: String,
        #[arg(long)]
        weight: Option<String>,
    },
    Update {
        test_uuid: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        range: Option<String>,
        #[arg(long)]
        weight: Option<String>,
    },
    Delete {
        test_uuid: String,
        #[arg(long)]
        yes: bool,
    },
    /// Move an exam to another workflow state
    Status {
        test_uuid: String,
        /// not-created, created or finalized (or the Chinese label)
        state: ExamState,
    },
    /// Set every exam weight of a semester at once; weights must sum to 1
    Weights {
        semester: String,
        /// `exam name=weight`, one per exam
        #[arg(required = true, value_parser = parse_weight_pair)]
        weights: Vec<(String, String)>,
    },
    /// Semesters that have at least one exam, newest first
    Semesters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExamSortKey {
    Name,
    Date,
    Semester,
    Weight,
    State,
}

pub async fn run<T: Transport>(api: &ApiClient<T>, cmd: ExamsCommand) -> Result<()> {
    match cmd {
        ExamsCommand::List {
            semester,
            sort,
            list,
        } => {
            let filters = semester
                .as_deref()
                .map(ExamFilters::by_semester)
                .unwrap_or_default();
            let mut exams = call("List tests", exam::list(api, &filters)).await?;
            if let Some(key) = sort {
                sort_rows(&mut exams, &SortState::new(key, list.direction()), sort_value);
            }
            let page = paginate(&exams, list.page, list.page_size);
            println!("{}", exam_table(page.items, use_color()).render());
            println!("{}", page_footer(&page));
        }
        ExamsCommand::Show { test_uuid } => {
            let found = call("Load test", exam::get(api, &test_uuid)).await?;
            println!("{}", exam_detail(&found, use_color()));
        }
        ExamsCommand::Create {
            name,
            date,
            range,
            semester,
            weight,
        } => {
            let request = CreateExamRequest {
                test_name: name,
                test_date: date,
                test_range: range,
                test_semester: semester,
                test_weight: weight,
            };
            request.validate()?;
            let created = call("Create test", exam::create(api, &request)).await?;
            println!("Created {} ({})", created.test_name, created.test_uuid);
        }
        ExamsCommand::Update {
            test_uuid,
            name,
            date,
            range,
            weight,
        } => {
            let request = UpdateExamRequest {
                test_uuid,
                test_name: name,
                test_date: date,
                test_range: range,
                test_weight: weight,
            };
            request.validate()?;
            let updated = call("Update test", exam::update(api, &request)).await?;
            println!("Updated {} ({})", updated.test_name, updated.test_uuid);
        }
        ExamsCommand::Delete { test_uuid, yes } => {
            if !confirm(&format!("Delete test {}?", test_uuid), yes)? {
                println!("Cancelled");
                return Ok(());
            }
            call("Delete test", exam::delete(api, &test_uuid)).await?;
            println!("Deleted {}", test_uuid);
        }
        ExamsCommand::Status { test_uuid, state } => {
            let request = UpdateExamStateRequest {
                test_uuid,
                test_states: state,
            };
            let updated = call("Update test state", exam::update_state(api, &request)).await?;
            println!(
                "{} is now {}",
                updated.test_name,
                exam_state_badge(updated.test_states, use_color())
            );
        }
        ExamsCommand::Weights { semester, weights } => {
            let request = SetWeightsRequest {
                test_semester: semester,
                weights: collect_weights(weights)?,
            };
            let total = request.validate()?;
            let result = call("Set weights", exam::set_weights(api, &request)).await?;
            println!(
                "Updated {} weights for {} (total {:.2})",
                result.updated_count, request.test_semester, total
            );
        }
        ExamsCommand::Semesters => {
            let semesters = call("List semesters", exam::semesters(api)).await?;
            if semesters.is_empty() {
                println!("No tests yet");
            }
            for semester in semesters {
                println!("{}", semester);
            }
        }
    }
    Ok(())
}

fn parse_weight_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, weight)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), weight.trim().to_string()))
        }
        _ => Err(format!("expected `exam name=weight`, got '{}'", raw)),
    }
}

fn collect_weights(pairs: Vec<(String, String)>) -> Result<BTreeMap<String, String>> {
    let mut weights = BTreeMap::new();
    for (name, weight) in pairs {
        if weights.insert(name.clone(), weight).is_some() {
            bail!("Weight for '{}' given twice", name);
        }
    }
    Ok(weights)
}

fn sort_value(exam: &Exam, key: ExamSortKey) -> SortValue {
    match key {
        ExamSortKey::Name => SortValue::Text(exam.test_name.clone()),
        ExamSortKey::Date => SortValue::Text(exam.test_date.clone()),
        ExamSortKey::Semester => SortValue::Text(exam.test_semester.clone()),
        ExamSortKey::Weight => SortValue::of(exam.test_weight.as_deref()),
        ExamSortKey::State => SortValue::Text(exam.test_states.key().to_string()),
    }
}

fn weight_display(exam: &Exam) -> String {
    match exam.weight() {
        Some(weight) => format!("{:.0}%", weight * 100.0),
        None => BLANK.to_string(),
    }
}

fn exam_table(exams: &[Exam], ansi: bool) -> Table {
    let mut table = Table::new(["Name", "Date", "Semester", "Weight", "State", "UUID"]);
    for e in exams {
        table.push([
            e.test_name.clone(),
            e.test_date.clone(),
            e.test_semester.clone(),
            weight_display(e),
            exam_state_badge(e.test_states, ansi),
            e.test_uuid.clone(),
        ]);
    }
    table
}

fn exam_detail(exam: &Exam, ansi: bool) -> String {
    let field = exam
        .score_field()
        .map(|f| f.as_str().to_string())
        .unwrap_or_else(|| BLANK.to_string());
    let rows = [
        ("Name", exam.test_name.clone()),
        ("Date", exam.test_date.clone()),
        ("Range", exam.test_range.clone()),
        ("Semester", exam.test_semester.clone()),
        ("Weight", weight_display(exam)),
        ("State", exam_state_badge(exam.test_states, ansi)),
        ("Field", field),
        ("UUID", exam.test_uuid.clone()),
    ];
    rows.iter()
        .map(|(label, value)| format!("{:<10}{}", label, value))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exam(name: &str, weight: Option<&str>) -> Exam {
        Exam {
            test_uuid: "t-1".into(),
            test_name: name.into(),
            test_date: "2025-04-20".into(),
            test_range: "Ch1-Ch5".into(),
            test_semester: "1141".into(),
            test_weight: weight.map(str::to_string),
            test_states: ExamState::Created,
            pt_opt_score_uuid: None,
            test_created_at: String::new(),
            test_updated_at: String::new(),
        }
    }

    #[test]
    fn test_parse_weight_pair() {
        assert_eq!(
            parse_weight_pair("期中考 = 0.35"),
            Ok(("期中考".to_string(), "0.35".to_string()))
        );
        assert_eq!(parse_weight_pair("期末考="), Ok(("期末考".to_string(), String::new())));
        assert!(parse_weight_pair("0.35").is_err());
        assert!(parse_weight_pair("=0.35").is_err());
    }

    #[test]
    fn test_collect_weights_rejects_duplicates() {
        let pairs = vec![
            ("期中考".to_string(), "0.5".to_string()),
            ("期中考".to_string(), "0.5".to_string()),
        ];
        assert!(collect_weights(pairs).is_err());
    }

    #[test]
    fn test_weight_display() {
        assert_eq!(weight_display(&exam("期中考", Some("0.35"))), "35%");
        assert_eq!(weight_display(&exam("期中考", None)), "-");
    }

    #[test]
    fn test_exam_detail_maps_score_field() {
        let detail = exam_detail(&exam("期末考", Some("0.4")), false);
        assert!(detail.contains("Field     score_finalexam"));
        assert!(detail.contains("State     考卷完成"));

        let other = exam_detail(&exam("期末報告", None), false);
        assert!(other.contains("Field     -"));
    }

    #[test]
    fn test_sort_by_weight_puts_blank_first() {
        let mut rows = vec![exam("b", Some("0.4")), exam("a", None), exam("c", Some("0.1"))];
        sort_rows(
            &mut rows,
            &SortState::new(ExamSortKey::Weight, gradebook_core::listing::SortDirection::Asc),
            sort_value,
        );
        let names: Vec<&str> = rows.iter().map(|e| e.test_name.as_str()).collect();
        assert_eq!(names, ["a", "c", "b"]);
    }
}
