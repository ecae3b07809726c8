use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs the versioned migrations that have not been applied yet.
///
/// Version 1 creates teachers, students and lessons. Row order within each
/// table follows the `seq` column.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS teachers (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    id TEXT NOT NULL UNIQUE,
                    name TEXT NOT NULL,
                    major TEXT NOT NULL DEFAULT '',
                    contract_end_month TEXT,
                    contract_termination_date TEXT,
                    class_start_date TEXT,
                    phone TEXT,
                    police_check_date TEXT,
                    contract_date TEXT,
                    date_of_birth TEXT,
                    address TEXT,
                    email TEXT,
                    bank_account TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS students (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    id TEXT NOT NULL UNIQUE,
                    name TEXT NOT NULL,
                    school TEXT,
                    grade TEXT,
                    career_path TEXT,
                    initial_registration_date TEXT,
                    previous_registration_month TEXT,
                    registration_status TEXT,
                    phone_student TEXT,
                    phone_parent TEXT,
                    class_type TEXT,
                    email TEXT,
                    address TEXT,
                    contract_end_month TEXT,
                    re_registration_month TEXT,
                    total_lessons INTEGER NOT NULL CHECK (total_lessons >= 0),
                    teacher_id TEXT REFERENCES teachers(id) ON DELETE SET NULL,
                    characteristics TEXT,
                    characteristics_written TEXT,
                    grades TEXT,
                    grades_updated TEXT,
                    desired_major TEXT,
                    desired_major_updated TEXT,
                    student_call_log TEXT,
                    student_call_log_written TEXT,
                    parent_call_log TEXT,
                    parent_call_log_written TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS lessons (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    id TEXT NOT NULL UNIQUE,
                    student_id TEXT NOT NULL REFERENCES students(id) ON DELETE CASCADE,
                    date TEXT,
                    status TEXT NOT NULL CHECK (status <> 'NONE'),
                    index_usage TEXT,
                    plan_upload_date TEXT,
                    plan_file TEXT,
                    plan_review_status TEXT,
                    lesson_content TEXT,
                    report_deadline TEXT,
                    report_file TEXT,
                    school_submission_date TEXT,
                    school_submission_status TEXT,
                    first_reminder_sent INTEGER NOT NULL DEFAULT 0,
                    second_reminder_sent INTEGER NOT NULL DEFAULT 0,
                    third_reminder_sent INTEGER NOT NULL DEFAULT 0,
                    non_submission_reason TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_lessons_student ON lessons(student_id, seq);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_students_teacher ON students(teacher_id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)")
            .bind(1_i64)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
    }

    Ok(())
}
