use std::fmt;

use clap::Parser;
use lms_core::Clock;
use lms_core::model::{Lesson, LessonStatus, Roster, Student};
use lms_core::schedule::{DayStatusChange, completed_ordinal};
use lms_core::sheet::{FileKind, LessonSlot};
use services::{AppServices, CallParty, SaveOutcome, StudentSummary};
use tracing_subscriber::EnvFilter;

mod cli;
mod seed;

use cli::{Cli, Command, FileArg, PartyArg};

#[derive(Debug)]
enum ArgsError {
    InvalidDbUrl { raw: String },
    InvalidRow { raw: usize },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidRow { raw } => write!(f, "rows are numbered from 1, got {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn row_index(row: usize) -> Result<usize, ArgsError> {
    row.checked_sub(1).ok_or(ArgsError::InvalidRow { raw: row })
}

fn print_sheet(slots: &[LessonSlot]) {
    let stored: Vec<Lesson> = slots
        .iter()
        .filter(|s| !s.is_placeholder())
        .map(|s| s.lesson().clone())
        .collect();
    for slot in slots {
        let lesson = slot.lesson();
        let id = if slot.is_placeholder() {
            "-".to_string()
        } else {
            lesson.id.to_string()
        };
        let status = match completed_ordinal(&stored, lesson) {
            Some(n) => format!("{} #{n}", lesson.status.as_str()),
            None => lesson.status.as_str().to_string(),
        };
        println!(
            "{:>3}  {:<12} {:<14} {:<36} plan={} report={}",
            slot.index() + 1,
            lesson.date.as_deref().unwrap_or("-"),
            status,
            id,
            lesson.plan_file.as_deref().unwrap_or("-"),
            lesson.report_file.as_deref().unwrap_or("-"),
        );
    }
}

fn print_summary(summary: &StudentSummary) {
    println!("{}", summary.student_id);
    println!("  period            {}", summary.period);
    println!("  remaining months  {}", summary.remaining_months);
    println!(
        "  lessons           {} of {} done, {} remaining",
        summary.lessons_completed, summary.total_lessons, summary.remaining_lessons
    );
}

fn print_roster(roster: &Roster, app: &AppServices) {
    let today = app.clock().today();
    let line = |student: &Student| {
        let summary = StudentSummary::build(student, roster.lessons_of(&student.id), today);
        println!(
            "    {:<36} {:<16} {:<14} months={} lessons={}",
            student.id.as_str(),
            student.name,
            summary.period.to_string(),
            summary.remaining_months,
            summary.remaining_lessons
        );
    };

    let ordered = roster.by_renewal_month();
    for teacher in roster.teachers() {
        let first = roster
            .first_lesson_of(&teacher.id)
            .and_then(|l| l.date.as_deref())
            .unwrap_or("-");
        println!("{} ({}) first lesson {first}", teacher.name, teacher.id);
        for student in ordered
            .iter()
            .filter(|s| s.teacher_id.as_ref() == Some(&teacher.id))
        {
            line(student);
        }
    }
    println!("unassigned");
    for student in ordered.iter().filter(|s| !s.is_assigned()) {
        line(student);
    }
}

fn print_saved(outcome: &SaveOutcome) {
    match outcome {
        SaveOutcome::Saved(id) => println!("saved {id}"),
        SaveOutcome::Skipped => println!("nothing to save"),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let db_url = normalize_sqlite_url(&cli.db_url);
    let clock = cli.today.map_or_else(Clock::default_clock, Clock::fixed_on);

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&db_url)?;
    let app = AppServices::new_sqlite(&db_url, clock).await?;
    tracing::debug!(%db_url, fixed_clock = clock.is_fixed(), "storage ready");

    match cli.command {
        Command::Seed => seed::seed_demo(&app).await?,
        Command::List => {
            let roster = app.roster().load_roster().await?;
            print_roster(&roster, &app);
        }
        Command::Sheet { student } => {
            let slots = app.lesson_sheet().load_sheet(&student).await?;
            print_sheet(&slots);
        }
        Command::Edit {
            student,
            row,
            field,
            value,
        } => {
            let (_, outcome) = app
                .lesson_sheet()
                .edit_slot_at(&student, row_index(row)?, &field, &value)
                .await?;
            print_saved(&outcome);
        }
        Command::Attach {
            student,
            row,
            kind,
            file,
        } => {
            let kind = match kind {
                FileArg::Plan => FileKind::Plan,
                FileArg::Report => FileKind::Report,
            };
            let (_, outcome) = app
                .lesson_sheet()
                .attach_file_at(&student, row_index(row)?, kind, file)
                .await?;
            print_saved(&outcome);
        }
        Command::Mark {
            student,
            day,
            status,
        } => {
            let status: LessonStatus = status.parse()?;
            match app.schedule().set_day_status(&student, day, status).await? {
                DayStatusChange::Created(lesson) => println!("created {}", lesson.id),
                DayStatusChange::Updated(lesson) => {
                    println!("updated {} to {}", lesson.id, lesson.status.as_str());
                }
                DayStatusChange::Deleted(id) => println!("deleted {id}"),
                DayStatusChange::Unchanged => println!("no lesson on {day}"),
            }
        }
        Command::Summary { student } => {
            let summary = app.summaries().summary(&student).await?;
            print_summary(&summary);
        }
        Command::Assign { student, teacher } => {
            let record = app
                .roster()
                .assign_student(&student, teacher.as_ref())
                .await?;
            match &record.teacher_id {
                Some(teacher) => println!("{} assigned to {teacher}", record.name),
                None => println!("{} unassigned", record.name),
            }
        }
        Command::CallLog {
            student,
            party,
            note,
        } => {
            let party = match party {
                PartyArg::Student => CallParty::Student,
                PartyArg::Parent => CallParty::Parent,
            };
            let record = app.roster().record_call(&student, party, &note).await?;
            let log = match party {
                CallParty::Student => record.student_call_log,
                CallParty::Parent => record.parent_call_log,
            };
            println!("{}", log.unwrap_or_default());
        }
        Command::AddTeacher { name, major, phone } => {
            let teacher = app
                .roster()
                .create_teacher(&name, &major, phone.as_deref())
                .await?;
            println!("{}", teacher.id);
        }
        Command::AddStudent {
            name,
            teacher,
            total_lessons,
            renewal,
        } => {
            let roster = app.roster();
            let mut student = roster.create_student(&name, teacher).await?;
            if total_lessons.is_some() || renewal.is_some() {
                if let Some(total) = total_lessons {
                    student.total_lessons = total;
                }
                student.re_registration_month = renewal;
                roster.update_student(&student).await?;
            }
            println!("{}", student.id);
        }
        Command::RemoveTeacher { teacher } => {
            let unassigned = app.roster().delete_teacher(&teacher).await?;
            println!("deleted {teacher}, {unassigned} student(s) unassigned");
        }
        Command::RemoveStudent { student } => {
            let removed = app.roster().delete_student(&student).await?;
            println!("deleted {student} and {removed} lesson(s)");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_urls_are_made_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/lms.db"),
            "sqlite:///tmp/lms.db"
        );
        assert_eq!(normalize_sqlite_url("/tmp/lms.db"), "sqlite:///tmp/lms.db");
        let relative = normalize_sqlite_url("sqlite:data/lms.db");
        assert!(relative.starts_with("sqlite:///"));
        assert!(relative.ends_with("data/lms.db"));
    }

    #[test]
    fn rows_are_one_based() {
        assert_eq!(row_index(1).unwrap(), 0);
        assert!(row_index(0).is_err());
    }

    #[test]
    fn prepare_rejects_non_sqlite_urls() {
        assert!(prepare_sqlite_file("postgres://x").is_err());
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
    }
}
