use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Subcommand, ValueEnum};

use gradebook_core::client::{ApiClient, Transport};
use gradebook_core::display::score_display;
use gradebook_core::export;
use gradebook_core::listing::{paginate, sort_rows, FilterSet, SortState, SortValue};
use gradebook_core::services::score;
use gradebook_core::types::{
    CalculateFinalScoresRequest, DiagramBins, DiagramFormat, GenerateScoreDiagramRequest, Score,
    ScoreColumn, ScoreField, ScoreValue, ScoreWithStudent, TestStatisticsRequest,
};
use gradebook_core::validation;
use gradebook_core::workflows::{self, BatchOutcome, ScoreUpdate};

use super::ListArgs;
use crate::commands::{call, confirm, save_blob};
use crate::components::table::{page_footer, Table};

#[derive(Subcommand, Debug)]
pub enum ScoresCommand {
    /// Scores joined with student identity
    List {
        #[arg(long)]
        semester: Option<String>,
        /// Keep rows whose name or number contains this text
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        sort: Option<ScoreSortKey>,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show the score record of one student
    Show { student_number: String },
    /// Set one field for one student
    Set {
        student_number: String,
        /// quiz1, midterm, quiz2 or finalexam
        field: ScoreField,
        value: String,
    },
    /// Set one field for many students from a file (`-` reads stdin)
    ///
    /// Lines are `student_number,score`; a blank score leaves that student
    /// unchanged. A JSON list of {student_number, score_value} is also accepted.
    Batch {
        field: ScoreField,
        input: PathBuf,
        #[arg(long)]
        yes: bool,
    },
    /// Recompute weighted totals for a semester on the backend
    Calculate {
        semester: String,
        #[arg(long, default_value = "60")]
        passing_score: String,
    },
    /// Count, average and median of one column
    Stats {
        semester: String,
        /// quiz1, midterm, quiz2, finalexam or total
        column: ScoreColumn,
        #[arg(long)]
        exclude_empty: bool,
    },
    /// Render the score distribution of one exam to an image
    Diagram {
        semester: String,
        field: ScoreField,
        #[arg(long)]
        bin_width: Option<f64>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, default_value = "png")]
        format: DiagramFormat,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    Delete {
        score_uuid: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScoreSortKey {
    Number,
    Name,
    Quiz1,
    Midterm,
    Quiz2,
    Finalexam,
    Total,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct SearchKey;

pub async fn run<T: Transport>(api: &ApiClient<T>, cmd: ScoresCommand) -> Result<()> {
    match cmd {
        ScoresCommand::List {
            semester,
            search,
            sort,
            list,
        } => {
            let mut rows = call(
                "List scores",
                workflows::scores_with_students(api, semester.as_deref()),
            )
            .await?;

            if let Some(key) = sort {
                sort_rows(&mut rows, &SortState::new(key, list.direction()), sort_value);
            }
            let mut filters = FilterSet::default();
            if let Some(search) = search {
                filters.set(SearchKey, search);
            }
            let kept: Vec<ScoreWithStudent> = filters
                .apply(&rows, |row, _, needle| {
                    let needle = needle.to_lowercase();
                    row.student_name.to_lowercase().contains(&needle)
                        || row.student_number.to_lowercase().contains(&needle)
                })
                .into_iter()
                .cloned()
                .collect();

            let page = paginate(&kept, list.page, list.page_size);
            println!("{}", score_table(page.items).render());
            println!("{}", page_footer(&page));
        }
        ScoresCommand::Show { student_number } => {
            validation::validate_student_number(&student_number)?;
            let found = call(
                "Find score",
                workflows::score_by_student_number(api, &student_number),
            )
            .await?;
            println!("{}", column_table(&found).render());
        }
        ScoresCommand::Set {
            student_number,
            field,
            value,
        } => {
            validation::validate_student_number(&student_number)?;
            validation::validate_score(&value)?;
            let saved = call(
                "Set score",
                workflows::update_score_by_student_number(
                    api,
                    &student_number,
                    field,
                    ScoreValue::from(value),
                ),
            )
            .await?;
            println!(
                "{} {} = {}",
                student_number,
                field.label(),
                score_display(saved.value(field.column()))
            );
        }
        ScoresCommand::Batch { field, input, yes } => {
            let text = read_input(&input)?;
            let updates = parse_batch(&text)?;
            check_batch(&updates)?;
            if !confirm(
                &format!("Update {} for {} students?", field.label(), updates.len()),
                yes,
            )? {
                println!("Cancelled");
                return Ok(());
            }
            let outcome = workflows::batch_update_scores(api, &updates, field).await;
            println!("{}", batch_summary(&outcome));
            if outcome.failed > 0 {
                bail!("{} of {} updates failed", outcome.failed, outcome.total);
            }
        }
        ScoresCommand::Calculate {
            semester,
            passing_score,
        } => {
            let request = CalculateFinalScoresRequest {
                test_semester: semester,
                passing_score: validation::validate_passing_score(&passing_score)?,
            };
            request.validate()?;
            let result = call("Calculate final scores", score::calculate_final(api, &request)).await?;
            println!(
                "Recomputed totals for {} students in {}",
                result.updated_count, request.test_semester
            );
        }
        ScoresCommand::Stats {
            semester,
            column,
            exclude_empty,
        } => {
            validation::validate_semester(&semester)?;
            let request = TestStatisticsRequest {
                score_semester: semester,
                score_field: column,
                exclude_empty: exclude_empty.then_some(true),
            };
            let stats = call("Score statistics", score::test_statistics(api, &request)).await?;
            let mut table = Table::new(["Semester", "Column", "Count", "Average", "Median"]);
            table.push([
                stats.semester,
                column.label().to_string(),
                stats.total_count.to_string(),
                format!("{:.2}", stats.average),
                format!("{:.2}", stats.median),
            ]);
            println!("{}", table.render());
        }
        ScoresCommand::Diagram {
            semester,
            field,
            bin_width,
            title,
            format,
            output,
        } => {
            let request = GenerateScoreDiagramRequest {
                test_semester: semester,
                score_field: field,
                bins: bin_width.map(|width| DiagramBins::FixedWidth { width }),
                title,
                format: Some(format),
            };
            request.validate()?;
            let bytes = call("Generate diagram", score::step_diagram(api, &request)).await?;
            let default_name = export::diagram_file_name(&request.test_semester, field, format);
            save_blob(&bytes, output, &default_name)?;
        }
        ScoresCommand::Delete { score_uuid, yes } => {
            if !confirm(&format!("Delete score record {}?", score_uuid), yes)? {
                println!("Cancelled");
                return Ok(());
            }
            call("Delete score", score::delete(api, &score_uuid)).await?;
            println!("Deleted {}", score_uuid);
        }
    }
    Ok(())
}

fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {:?}", input))
    }
}

/// Parse batch input. Rows with an empty score are skipped, as is a
/// `student_number` header line.
fn parse_batch(text: &str) -> Result<Vec<ScoreUpdate>> {
    if text.trim_start().starts_with('[') {
        let updates: Vec<ScoreUpdate> =
            serde_json::from_str(text).context("Invalid JSON batch input")?;
        return Ok(updates
            .into_iter()
            .filter(|u| !matches!(&u.score_value, ScoreValue::Text(v) if v.trim().is_empty()))
            .collect());
    }

    let mut updates = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut cells = line.split([',', '\t']).map(str::trim);
        let number = cells.next().unwrap_or_default();
        if number.eq_ignore_ascii_case("student_number") {
            continue;
        }
        if number.is_empty() {
            bail!("Line {}: missing student number", index + 1);
        }
        match cells.next() {
            Some(value) if !value.is_empty() => updates.push(ScoreUpdate::new(number, value)),
            _ => {}
        }
    }
    Ok(updates)
}

/// Reject the whole batch before sending anything when a student number is
/// malformed or a value is out of range.
fn check_batch(updates: &[ScoreUpdate]) -> Result<()> {
    if updates.is_empty() {
        bail!("Enter a score for at least one student");
    }
    for update in updates {
        validation::validate_student_number(&update.student_number)?;
        update
            .score_value
            .validate()
            .with_context(|| format!("Student {}", update.student_number))?;
    }
    Ok(())
}

fn batch_summary(outcome: &BatchOutcome) -> String {
    let mut text = format!(
        "Updated {} of {} students ({} failed)",
        outcome.success, outcome.total, outcome.failed
    );
    if outcome.failed > 0 {
        let mut table = Table::new(["Number", "Code", "Error"]);
        for entry in outcome.failures() {
            table.push([
                entry.student_number.clone(),
                entry.code.map(|c| c.to_string()).unwrap_or_default(),
                entry.error.clone().unwrap_or_default(),
            ]);
        }
        text.push('\n');
        text.push_str(&table.render());
    }
    text
}

fn sort_value(row: &ScoreWithStudent, key: ScoreSortKey) -> SortValue {
    let column = match key {
        ScoreSortKey::Number => return SortValue::Text(row.student_number.clone()),
        ScoreSortKey::Name => return SortValue::Text(row.student_name.clone()),
        ScoreSortKey::Quiz1 => ScoreColumn::Quiz1,
        ScoreSortKey::Midterm => ScoreColumn::Midterm,
        ScoreSortKey::Quiz2 => ScoreColumn::Quiz2,
        ScoreSortKey::Finalexam => ScoreColumn::FinalExam,
        ScoreSortKey::Total => ScoreColumn::Total,
    };
    SortValue::of(row.score.value(column))
}

fn score_table(rows: &[ScoreWithStudent]) -> Table {
    let mut headers = vec!["Number".to_string(), "Name".to_string()];
    headers.extend(ScoreColumn::ALL.iter().map(|c| c.label().to_string()));
    let mut table = Table::new(headers);
    for row in rows {
        let mut cells = vec![row.student_number.clone(), row.student_name.clone()];
        cells.extend(
            ScoreColumn::ALL
                .iter()
                .map(|c| score_display(row.score.value(*c)).to_string()),
        );
        table.push(cells);
    }
    table
}

fn column_table(score: &Score) -> Table {
    let mut table = Table::new(["Exam", "Score"]);
    for column in ScoreColumn::ALL {
        table.push([column.label(), score_display(score.value(column))]);
    }
    table
}
