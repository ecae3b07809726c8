use std::str::FromStr;

use lms_core::model::{Lesson, LessonId, Student, StudentId, Teacher, TeacherId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn db(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Reads an optional text column holding an enum token.
fn token<T>(row: &SqliteRow, column: &str) -> Result<Option<T>, StorageError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    row.try_get::<Option<String>, _>(column)
        .map_err(ser)?
        .map(|raw| raw.parse::<T>().map_err(ser))
        .transpose()
}

fn flag(row: &SqliteRow, column: &str) -> Result<bool, StorageError> {
    Ok(row.try_get::<i64, _>(column).map_err(ser)? != 0)
}

pub(crate) const TEACHER_COLUMNS: &str = "id, name, major, contract_end_month, \
    contract_termination_date, class_start_date, phone, police_check_date, contract_date, \
    date_of_birth, address, email, bank_account";

pub(crate) fn map_teacher_row(row: &SqliteRow) -> Result<Teacher, StorageError> {
    let id = TeacherId::new(row.try_get::<String, _>("id").map_err(ser)?).map_err(ser)?;
    Ok(Teacher {
        id,
        name: row.try_get("name").map_err(ser)?,
        major: row.try_get("major").map_err(ser)?,
        contract_end_month: row.try_get("contract_end_month").map_err(ser)?,
        contract_termination_date: row.try_get("contract_termination_date").map_err(ser)?,
        class_start_date: row.try_get("class_start_date").map_err(ser)?,
        phone: row.try_get("phone").map_err(ser)?,
        police_check_date: row.try_get("police_check_date").map_err(ser)?,
        contract_date: row.try_get("contract_date").map_err(ser)?,
        date_of_birth: row.try_get("date_of_birth").map_err(ser)?,
        address: row.try_get("address").map_err(ser)?,
        email: row.try_get("email").map_err(ser)?,
        bank_account: row.try_get("bank_account").map_err(ser)?,
    })
}

pub(crate) const STUDENT_COLUMNS: &str = "id, name, school, grade, career_path, \
    initial_registration_date, previous_registration_month, registration_status, \
    phone_student, phone_parent, class_type, email, address, contract_end_month, \
    re_registration_month, total_lessons, teacher_id, characteristics, \
    characteristics_written, grades, grades_updated, desired_major, desired_major_updated, \
    student_call_log, student_call_log_written, parent_call_log, parent_call_log_written";

pub(crate) fn map_student_row(row: &SqliteRow) -> Result<Student, StorageError> {
    let id = StudentId::new(row.try_get::<String, _>("id").map_err(ser)?).map_err(ser)?;
    let total_i64: i64 = row.try_get("total_lessons").map_err(ser)?;
    let total_lessons = u32::try_from(total_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid total_lessons: {total_i64}")))?;
    let teacher_id = row
        .try_get::<Option<String>, _>("teacher_id")
        .map_err(ser)?
        .map(TeacherId::new)
        .transpose()
        .map_err(ser)?;

    Ok(Student {
        id,
        name: row.try_get("name").map_err(ser)?,
        school: row.try_get("school").map_err(ser)?,
        grade: row.try_get("grade").map_err(ser)?,
        career_path: row.try_get("career_path").map_err(ser)?,
        initial_registration_date: row.try_get("initial_registration_date").map_err(ser)?,
        previous_registration_month: row.try_get("previous_registration_month").map_err(ser)?,
        registration_status: token(row, "registration_status")?,
        phone_student: row.try_get("phone_student").map_err(ser)?,
        phone_parent: row.try_get("phone_parent").map_err(ser)?,
        class_type: row.try_get("class_type").map_err(ser)?,
        email: row.try_get("email").map_err(ser)?,
        address: row.try_get("address").map_err(ser)?,
        contract_end_month: row.try_get("contract_end_month").map_err(ser)?,
        re_registration_month: row.try_get("re_registration_month").map_err(ser)?,
        total_lessons,
        teacher_id,
        characteristics: row.try_get("characteristics").map_err(ser)?,
        characteristics_written: row.try_get("characteristics_written").map_err(ser)?,
        grades: row.try_get("grades").map_err(ser)?,
        grades_updated: row.try_get("grades_updated").map_err(ser)?,
        desired_major: row.try_get("desired_major").map_err(ser)?,
        desired_major_updated: row.try_get("desired_major_updated").map_err(ser)?,
        student_call_log: row.try_get("student_call_log").map_err(ser)?,
        student_call_log_written: row.try_get("student_call_log_written").map_err(ser)?,
        parent_call_log: row.try_get("parent_call_log").map_err(ser)?,
        parent_call_log_written: row.try_get("parent_call_log_written").map_err(ser)?,
    })
}

pub(crate) const LESSON_COLUMNS: &str = "id, student_id, date, status, index_usage, \
    plan_upload_date, plan_file, plan_review_status, lesson_content, report_deadline, \
    report_file, school_submission_date, school_submission_status, first_reminder_sent, \
    second_reminder_sent, third_reminder_sent, non_submission_reason";

pub(crate) fn map_lesson_row(row: &SqliteRow) -> Result<(StudentId, Lesson), StorageError> {
    let id = LessonId::new(row.try_get::<String, _>("id").map_err(ser)?).map_err(ser)?;
    let owner =
        StudentId::new(row.try_get::<String, _>("student_id").map_err(ser)?).map_err(ser)?;
    let status = token(row, "status")?
        .ok_or_else(|| StorageError::Serialization("missing status".into()))?;

    let lesson = Lesson {
        id,
        date: row.try_get("date").map_err(ser)?,
        status,
        index_usage: token(row, "index_usage")?,
        plan_upload_date: row.try_get("plan_upload_date").map_err(ser)?,
        plan_file: row.try_get("plan_file").map_err(ser)?,
        plan_review_status: token(row, "plan_review_status")?,
        lesson_content: row.try_get("lesson_content").map_err(ser)?,
        report_deadline: row.try_get("report_deadline").map_err(ser)?,
        report_file: row.try_get("report_file").map_err(ser)?,
        school_submission_date: row.try_get("school_submission_date").map_err(ser)?,
        school_submission_status: token(row, "school_submission_status")?,
        first_reminder_sent: flag(row, "first_reminder_sent")?,
        second_reminder_sent: flag(row, "second_reminder_sent")?,
        third_reminder_sent: flag(row, "third_reminder_sent")?,
        non_submission_reason: row.try_get("non_submission_reason").map_err(ser)?,
    };
    Ok((owner, lesson))
}
