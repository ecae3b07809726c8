use std::sync::Arc;

use chrono::NaiveDate;
use lms_core::Clock;
use lms_core::model::{Lesson, Student, StudentId};
use lms_core::registration::{
    RegistrationPeriod, RegistrationValue, compute_period, compute_remaining_lessons,
    compute_remaining_months,
};
use lms_core::schedule::lessons_completed;
use storage::repository::{LessonRepository, StudentRepository};

use crate::error::SummaryError;

/// The figures shown on a student's summary card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentSummary {
    pub student_id: StudentId,
    pub period: RegistrationValue<RegistrationPeriod>,
    pub remaining_months: RegistrationValue<u32>,
    pub total_lessons: u32,
    pub lessons_completed: u32,
    pub remaining_lessons: i64,
}

impl StudentSummary {
    #[must_use]
    pub fn build(student: &Student, lessons: &[Lesson], today: NaiveDate) -> Self {
        let month = student.re_registration_month.as_deref();
        let completed = lessons_completed(lessons);
        Self {
            student_id: student.id.clone(),
            period: compute_period(month),
            remaining_months: compute_remaining_months(month, today),
            total_lessons: student.total_lessons,
            lessons_completed: completed,
            remaining_lessons: compute_remaining_lessons(student.total_lessons, completed),
        }
    }
}

#[derive(Clone)]
pub struct StudentSummaryService {
    clock: Clock,
    students: Arc<dyn StudentRepository>,
    lessons: Arc<dyn LessonRepository>,
}

impl StudentSummaryService {
    #[must_use]
    pub fn new(
        clock: Clock,
        students: Arc<dyn StudentRepository>,
        lessons: Arc<dyn LessonRepository>,
    ) -> Self {
        Self {
            clock,
            students,
            lessons,
        }
    }

    /// Summary card of one student as of the service clock's today.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError::StudentNotFound` if the student does not exist.
    /// Returns `SummaryError::Storage` if repository access fails.
    pub async fn summary(&self, student: &StudentId) -> Result<StudentSummary, SummaryError> {
        let record = self
            .students
            .get_student(student)
            .await?
            .ok_or_else(|| SummaryError::StudentNotFound(student.clone()))?;
        let lessons = self.lessons.list_lessons(student).await?;
        Ok(StudentSummary::build(&record, &lessons, self.clock.today()))
    }
}
