use lms_core::model::{Lesson, LessonId, StudentId};

use super::SqliteRepository;
use super::mapping::{LESSON_COLUMNS, db, map_lesson_row};
use crate::repository::{LessonRepository, StorageError, ensure_storable};

#[async_trait::async_trait]
impl LessonRepository for SqliteRepository {
    async fn upsert_lesson(
        &self,
        student: &StudentId,
        lesson: &Lesson,
    ) -> Result<(), StorageError> {
        ensure_storable(lesson)?;

        // The WHERE clause turns a cross-student id collision into a no-op.
        let res = sqlx::query(
            r"
            INSERT INTO lessons (id, student_id, date, status, index_usage, plan_upload_date,
                plan_file, plan_review_status, lesson_content, report_deadline, report_file,
                school_submission_date, school_submission_status, first_reminder_sent,
                second_reminder_sent, third_reminder_sent, non_submission_reason)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            ON CONFLICT(id) DO UPDATE SET
                date = excluded.date,
                status = excluded.status,
                index_usage = excluded.index_usage,
                plan_upload_date = excluded.plan_upload_date,
                plan_file = excluded.plan_file,
                plan_review_status = excluded.plan_review_status,
                lesson_content = excluded.lesson_content,
                report_deadline = excluded.report_deadline,
                report_file = excluded.report_file,
                school_submission_date = excluded.school_submission_date,
                school_submission_status = excluded.school_submission_status,
                first_reminder_sent = excluded.first_reminder_sent,
                second_reminder_sent = excluded.second_reminder_sent,
                third_reminder_sent = excluded.third_reminder_sent,
                non_submission_reason = excluded.non_submission_reason
            WHERE lessons.student_id = excluded.student_id
            ",
        )
        .bind(lesson.id.as_str())
        .bind(student.as_str())
        .bind(&lesson.date)
        .bind(lesson.status.as_str())
        .bind(lesson.index_usage.map(|v| v.as_str()))
        .bind(lesson.plan_upload_date)
        .bind(&lesson.plan_file)
        .bind(lesson.plan_review_status.map(|v| v.as_str()))
        .bind(&lesson.lesson_content)
        .bind(lesson.report_deadline)
        .bind(&lesson.report_file)
        .bind(lesson.school_submission_date)
        .bind(lesson.school_submission_status.map(|v| v.as_str()))
        .bind(lesson.first_reminder_sent)
        .bind(lesson.second_reminder_sent)
        .bind(lesson.third_reminder_sent)
        .bind(&lesson.non_submission_reason)
        .execute(&self.pool)
        .await;

        match res {
            Ok(done) if done.rows_affected() == 0 => Err(StorageError::Conflict),
            Ok(_) => Ok(()),
            Err(e)
                if e.as_database_error()
                    .is_some_and(|d| d.is_foreign_key_violation()) =>
            {
                Err(StorageError::NotFound)
            }
            Err(e) => Err(db(e)),
        }
    }

    async fn delete_lesson(&self, student: &StudentId, id: &LessonId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM lessons WHERE id = ?1 AND student_id = ?2")
            .bind(id.as_str())
            .bind(student.as_str())
            .execute(&self.pool)
            .await
            .map_err(db)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn list_lessons(&self, student: &StudentId) -> Result<Vec<Lesson>, StorageError> {
        let sql =
            format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE student_id = ?1 ORDER BY seq ASC");
        let rows = sqlx::query(&sql)
            .bind(student.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(db)?;

        rows.iter()
            .map(|row| map_lesson_row(row).map(|(_, lesson)| lesson))
            .collect()
    }

    async fn list_all_lessons(&self) -> Result<Vec<(StudentId, Lesson)>, StorageError> {
        let sql = format!("SELECT {LESSON_COLUMNS} FROM lessons ORDER BY seq ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db)?;

        rows.iter().map(map_lesson_row).collect()
    }

    async fn delete_lessons_of(&self, student: &StudentId) -> Result<u64, StorageError> {
        let res = sqlx::query("DELETE FROM lessons WHERE student_id = ?1")
            .bind(student.as_str())
            .execute(&self.pool)
            .await
            .map_err(db)?;

        Ok(res.rows_affected())
    }
}
