use lms_core::model::{Student, StudentId};

use super::SqliteRepository;
use super::mapping::{STUDENT_COLUMNS, db, map_student_row};
use crate::repository::{StorageError, StudentRepository};

#[async_trait::async_trait]
impl StudentRepository for SqliteRepository {
    async fn upsert_student(&self, student: &Student) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO students (id, name, school, grade, career_path,
                initial_registration_date, previous_registration_month, registration_status,
                phone_student, phone_parent, class_type, email, address, contract_end_month,
                re_registration_month, total_lessons, teacher_id, characteristics,
                characteristics_written, grades, grades_updated, desired_major,
                desired_major_updated, student_call_log, student_call_log_written,
                parent_call_log, parent_call_log_written)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                school = excluded.school,
                grade = excluded.grade,
                career_path = excluded.career_path,
                initial_registration_date = excluded.initial_registration_date,
                previous_registration_month = excluded.previous_registration_month,
                registration_status = excluded.registration_status,
                phone_student = excluded.phone_student,
                phone_parent = excluded.phone_parent,
                class_type = excluded.class_type,
                email = excluded.email,
                address = excluded.address,
                contract_end_month = excluded.contract_end_month,
                re_registration_month = excluded.re_registration_month,
                total_lessons = excluded.total_lessons,
                teacher_id = excluded.teacher_id,
                characteristics = excluded.characteristics,
                characteristics_written = excluded.characteristics_written,
                grades = excluded.grades,
                grades_updated = excluded.grades_updated,
                desired_major = excluded.desired_major,
                desired_major_updated = excluded.desired_major_updated,
                student_call_log = excluded.student_call_log,
                student_call_log_written = excluded.student_call_log_written,
                parent_call_log = excluded.parent_call_log,
                parent_call_log_written = excluded.parent_call_log_written
            ",
        )
        .bind(student.id.as_str())
        .bind(&student.name)
        .bind(&student.school)
        .bind(&student.grade)
        .bind(&student.career_path)
        .bind(student.initial_registration_date)
        .bind(&student.previous_registration_month)
        .bind(student.registration_status.map(|s| s.as_str()))
        .bind(&student.phone_student)
        .bind(&student.phone_parent)
        .bind(&student.class_type)
        .bind(&student.email)
        .bind(&student.address)
        .bind(&student.contract_end_month)
        .bind(&student.re_registration_month)
        .bind(i64::from(student.total_lessons))
        .bind(student.teacher_id.as_ref().map(|t| t.as_str()))
        .bind(&student.characteristics)
        .bind(student.characteristics_written)
        .bind(&student.grades)
        .bind(student.grades_updated)
        .bind(&student.desired_major)
        .bind(student.desired_major_updated)
        .bind(&student.student_call_log)
        .bind(student.student_call_log_written)
        .bind(&student.parent_call_log)
        .bind(student.parent_call_log_written)
        .execute(&self.pool)
        .await;

        match res {
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

    async fn get_student(&self, id: &StudentId) -> Result<Option<Student>, StorageError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db)?;

        row.as_ref().map(map_student_row).transpose()
    }

    async fn list_students(&self) -> Result<Vec<Student>, StorageError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students ORDER BY seq ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db)?;

        rows.iter().map(map_student_row).collect()
    }

    async fn delete_student(&self, id: &StudentId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM students WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(db)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
