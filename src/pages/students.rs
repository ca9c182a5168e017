use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Subcommand, ValueEnum};
use tracing::warn;

use gradebook_core::client::{ApiClient, Transport};
use gradebook_core::export;
use gradebook_core::listing::{paginate, sort_rows, FilterSet, SortState, SortValue};
use gradebook_core::services::{score, student};
use gradebook_core::types::{
    CreateStudentRequest, ExportStudentsExcelRequest, Student, StudentFilters, StudentStatus,
    UpdateStudentRequest, UpdateStudentStatusRequest,
};
use gradebook_core::validation;

use super::{use_color, ListArgs};
use crate::commands::{call, confirm, read_upload, save_blob};
use crate::components::score_card;
use crate::components::status_badge::student_status_badge;
use crate::components::table::{page_footer, Table};

#[derive(Subcommand, Debug)]
pub enum StudentsCommand {
    /// List students, optionally for one semester
    List {
        #[arg(long)]
        semester: Option<String>,
        /// in-progress, completed, failed, withdrawn (or the Chinese label)
        #[arg(long)]
        status: Option<StudentStatus>,
        /// Keep rows whose name or number contains this text
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        sort: Option<StudentSortKey>,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one student and their scores
    Show { student_number: String },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        number: String,
        #[arg(long)]
        semester: String,
        #[arg(long)]
        status: Option<StudentStatus>,
    },
    Update {
        student_uuid: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        number: Option<String>,
        #[arg(long)]
        semester: Option<String>,
    },
    /// Delete a student together with their score record
    Delete {
        student_uuid: String,
        #[arg(long)]
        yes: bool,
    },
    /// Change enrollment status
    Status {
        student_uuid: String,
        status: StudentStatus,
        #[arg(long)]
        yes: bool,
    },
    /// Head count per status for a semester
    Stats { semester: String },
    /// Import a roster from an Excel sheet (.xlsx or .xls)
    Import { file: PathBuf },
    /// Export a semester's score sheet to Excel
    Export {
        semester: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Write a sample roster sheet to start an import from
    Template {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StudentSortKey {
    Number,
    Name,
    Semester,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum StudentFilterKey {
    Status,
    Search,
}

pub async fn run<T: Transport>(api: &ApiClient<T>, cmd: StudentsCommand) -> Result<()> {
    match cmd {
        StudentsCommand::List {
            semester,
            status,
            search,
            sort,
            list,
        } => {
            let filters = semester
                .as_deref()
                .map(StudentFilters::by_semester)
                .unwrap_or_default();
            let mut students = call("List students", student::list(api, &filters)).await?;

            let mut active = FilterSet::default();
            if let Some(status) = status {
                active.set(StudentFilterKey::Status, status.label());
            }
            if let Some(search) = search {
                active.set(StudentFilterKey::Search, search);
            }
            if let Some(key) = sort {
                sort_rows(&mut students, &SortState::new(key, list.direction()), sort_value);
            }

            let kept: Vec<Student> = active
                .apply(&students, matches_filter)
                .into_iter()
                .cloned()
                .collect();
            let page = paginate(&kept, list.page, list.page_size);
            println!("{}", student_table(page.items).render());
            println!("{}", page_footer(&page));
        }
        StudentsCommand::Show { student_number } => {
            validation::validate_student_number(&student_number)?;
            let found = call("Find student", student::get_by_number(api, &student_number)).await?;
            let score = match score::get_by_student(api, &found.student_uuid).await {
                Ok(score) => Some(score),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(e.into()),
            };
            println!("{}", score_card::render(&found, score.as_ref(), use_color()));
        }
        StudentsCommand::Create {
            name,
            number,
            semester,
            status,
        } => {
            let request = CreateStudentRequest {
                student_name: name,
                student_number: number,
                student_semester: semester,
                student_status: status,
            };
            request.validate()?;
            let created = call("Create student", student::create(api, &request)).await?;
            println!("Created {} ({})", created.student_number, created.student_uuid);
        }
        StudentsCommand::Update {
            student_uuid,
            name,
            number,
            semester,
        } => {
            let request = UpdateStudentRequest {
                student_uuid,
                student_name: name,
                student_number: number,
                student_semester: semester,
                student_status: None,
            };
            request.validate()?;
            let updated = call("Update student", student::update(api, &request)).await?;
            println!("Updated {} ({})", updated.student_number, updated.student_name);
        }
        StudentsCommand::Delete { student_uuid, yes } => {
            if !confirm(
                &format!("Delete student {} and all of their scores?", student_uuid),
                yes,
            )? {
                println!("Cancelled");
                return Ok(());
            }
            call("Delete student", student::delete(api, &student_uuid)).await?;
            println!("Deleted {}", student_uuid);
        }
        StudentsCommand::Status {
            student_uuid,
            status,
            yes,
        } => {
            if status.clears_scores() {
                warn!("Status {} clears the student's scores", status);
                if !confirm(
                    &format!("Set {} to {}? Their scores will be cleared.", student_uuid, status),
                    yes,
                )? {
                    println!("Cancelled");
                    return Ok(());
                }
            }
            let request = UpdateStudentStatusRequest {
                student_uuid,
                student_status: status,
            };
            let updated = call("Update status", student::update_status(api, &request)).await?;
            println!(
                "{} is now {}",
                updated.student_number,
                student_status_badge(updated.student_status, use_color())
            );
        }
        StudentsCommand::Stats { semester } => {
            let stats = call("Status statistics", student::status_stats(api, &semester)).await?;
            let mut table = Table::new(["Status", "Students"]);
            for status in StudentStatus::ALL {
                table.push([status.label().to_string(), stats.count(status).to_string()]);
            }
            table.push(["Total".to_string(), stats.total().to_string()]);
            println!("{}", table.render());
        }
        StudentsCommand::Import { file } => {
            let is_excel = file
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("xlsx") || e.eq_ignore_ascii_case("xls"));
            if !is_excel {
                bail!("Expected an Excel file (.xlsx or .xls), got {:?}", file);
            }
            let upload = read_upload(&file)?;
            let result = call("Import students", student::upload_excel(api, upload)).await?;
            println!(
                "Created {} students, {} rows rejected",
                result.created_count, result.error_count
            );
            for error in &result.errors {
                println!("  {}", error);
            }
        }
        StudentsCommand::Export { semester, output } => {
            validation::validate_semester(&semester)?;
            let request = ExportStudentsExcelRequest {
                student_semester: semester,
            };
            let bytes = call("Export scores", student::export_excel(api, &request)).await?;
            save_blob(&bytes, output, &export::excel_file_name(&request.student_semester))?;
        }
        StudentsCommand::Template { output } => {
            save_blob(&export::import_template(), output, export::TEMPLATE_FILE_NAME)?;
        }
    }
    Ok(())
}

fn sort_value(student: &Student, key: StudentSortKey) -> SortValue {
    let raw = match key {
        StudentSortKey::Number => student.student_number.as_str(),
        StudentSortKey::Name => student.student_name.as_str(),
        StudentSortKey::Semester => student.student_semester.as_str(),
        StudentSortKey::Status => student.student_status.label(),
    };
    SortValue::Text(raw.to_string())
}

fn matches_filter(student: &Student, key: StudentFilterKey, value: &str) -> bool {
    match key {
        StudentFilterKey::Status => student.student_status.label() == value,
        StudentFilterKey::Search => {
            let needle = value.to_lowercase();
            student.student_name.to_lowercase().contains(&needle)
                || student.student_number.to_lowercase().contains(&needle)
        }
    }
}

fn student_table(students: &[Student]) -> Table {
    let mut table = Table::new(["Number", "Name", "Semester", "Status", "UUID"]);
    for s in students {
        table.push([
            s.student_number.clone(),
            s.student_name.clone(),
            s.student_semester.clone(),
            student_status_badge(s.student_status, false),
            s.student_uuid.clone(),
        ]);
    }
    table
}
