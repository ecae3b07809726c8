use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use lms_core::model::{StudentId, TeacherId};

#[derive(Parser, Debug)]
#[command(name = "lms", version, about = "Tutoring roster, lesson sheets and registration periods")]
pub struct Cli {
    /// SQLite database URL or file path.
    #[arg(long = "db", env = "LMS_DB_URL", default_value = "sqlite://lms.sqlite3", global = true)]
    pub db_url: String,

    /// Treat this date (YYYY-MM-DD) as today.
    #[arg(long, env = "LMS_TODAY", global = true)]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Insert a small demo roster
    Seed,
    /// Teachers with their students, then unassigned students
    List,
    /// Lesson sheet of a student
    Sheet { student: StudentId },
    /// Set one field of a sheet row; an empty value clears it
    Edit {
        student: StudentId,
        /// Row number as shown by `sheet` (starting at 1)
        row: usize,
        field: String,
        #[arg(default_value = "")]
        value: String,
    },
    /// Attach a plan or report file to a sheet row, or clear it
    Attach {
        student: StudentId,
        /// Row number as shown by `sheet` (starting at 1)
        row: usize,
        #[arg(value_enum)]
        kind: FileArg,
        /// File name; omit to clear
        file: Option<String>,
    },
    /// Set the lesson status for a day; `none` deletes that day's lesson
    Mark {
        student: StudentId,
        day: NaiveDate,
        status: String,
    },
    /// Registration period and remaining months/lessons of a student
    Summary { student: StudentId },
    /// Assign a student to a teacher, or unassign with no teacher
    Assign {
        student: StudentId,
        teacher: Option<TeacherId>,
    },
    /// Prepend a dated note to a call log
    CallLog {
        student: StudentId,
        #[arg(value_enum)]
        party: PartyArg,
        note: String,
    },
    /// Create a teacher
    AddTeacher {
        name: String,
        #[arg(long, default_value = "")]
        major: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Create a student
    AddStudent {
        name: String,
        #[arg(long)]
        teacher: Option<TeacherId>,
        #[arg(long)]
        total_lessons: Option<u32>,
        /// Renewal month (YYYY-MM)
        #[arg(long)]
        renewal: Option<String>,
    },
    /// Delete a teacher; its students become unassigned
    RemoveTeacher { teacher: TeacherId },
    /// Delete a student and its lessons
    RemoveStudent { student: StudentId },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FileArg {
    Plan,
    Report,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum PartyArg {
    Student,
    Parent,
}
