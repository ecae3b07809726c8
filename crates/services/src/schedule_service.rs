use std::sync::Arc;

use chrono::NaiveDate;
use lms_core::model::{Lesson, LessonId, LessonStatus, StudentId};
use lms_core::registration::YearMonth;
use lms_core::schedule::{DayStatusChange, history, lessons_in_month, plan_day_status};
use storage::repository::LessonRepository;

use crate::error::ScheduleError;

/// Day-level lesson scheduling against storage, as used by the grid and calendar.
#[derive(Clone)]
pub struct ScheduleService {
    lessons: Arc<dyn LessonRepository>,
}

impl ScheduleService {
    #[must_use]
    pub fn new(lessons: Arc<dyn LessonRepository>) -> Self {
        Self { lessons }
    }

    /// Set the lesson status of a student on a given day.
    ///
    /// `LessonStatus::None` deletes the lesson on that day, if any.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::Storage` if repository access fails.
    pub async fn set_day_status(
        &self,
        student: &StudentId,
        day: NaiveDate,
        status: LessonStatus,
    ) -> Result<DayStatusChange, ScheduleError> {
        let lessons = self.lessons.list_lessons(student).await?;
        let change = plan_day_status(&lessons, day, status, LessonId::generate);

        match &change {
            DayStatusChange::Created(lesson) | DayStatusChange::Updated(lesson) => {
                self.lessons.upsert_lesson(student, lesson).await?;
                tracing::info!(
                    student_id = %student,
                    lesson_id = %lesson.id,
                    %day,
                    status = status.as_str(),
                    "day status set"
                );
            }
            DayStatusChange::Deleted(id) => {
                self.lessons.delete_lesson(student, id).await?;
                tracing::info!(student_id = %student, lesson_id = %id, %day, "lesson deleted");
            }
            DayStatusChange::Unchanged => {
                tracing::debug!(student_id = %student, %day, "no lesson on day");
            }
        }
        Ok(change)
    }

    /// Lessons of a student falling in `month`, ordered by date.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::Storage` if repository access fails.
    pub async fn month_view(
        &self,
        student: &StudentId,
        month: YearMonth,
    ) -> Result<Vec<Lesson>, ScheduleError> {
        let lessons = self.lessons.list_lessons(student).await?;
        Ok(lessons_in_month(&lessons, month).into_iter().cloned().collect())
    }

    /// Lessons of a student, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::Storage` if repository access fails.
    pub async fn history(&self, student: &StudentId) -> Result<Vec<Lesson>, ScheduleError> {
        let lessons = self.lessons.list_lessons(student).await?;
        Ok(history(&lessons).into_iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lms_core::model::Student;
    use storage::repository::{InMemoryRepository, StudentRepository};

    fn day(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    async fn setup() -> (ScheduleService, InMemoryRepository, StudentId) {
        let repo = InMemoryRepository::new();
        let student = Student::new(StudentId::new("s1").unwrap(), "Lee").unwrap();
        repo.upsert_student(&student).await.unwrap();
        (ScheduleService::new(Arc::new(repo.clone())), repo, student.id)
    }

    #[tokio::test]
    async fn marking_an_empty_day_creates_a_lesson() {
        let (service, repo, student) = setup().await;

        let change = service
            .set_day_status(&student, day("2025-03-04"), LessonStatus::Scheduled)
            .await
            .unwrap();
        let DayStatusChange::Created(created) = change else {
            panic!("expected a created lesson");
        };
        assert!(!created.id.is_placeholder());
        assert_eq!(created.day(), Some(day("2025-03-04")));
        assert_eq!(repo.list_lessons(&student).await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn marking_an_existing_day_updates_then_none_deletes() {
        let (service, repo, student) = setup().await;
        service
            .set_day_status(&student, day("2025-03-04"), LessonStatus::Scheduled)
            .await
            .unwrap();

        let change = service
            .set_day_status(&student, day("2025-03-04"), LessonStatus::Completed)
            .await
            .unwrap();
        assert!(matches!(change, DayStatusChange::Updated(ref l) if l.is_completed()));
        assert_eq!(repo.list_lessons(&student).await.unwrap().len(), 1);

        let change = service
            .set_day_status(&student, day("2025-03-04"), LessonStatus::None)
            .await
            .unwrap();
        assert!(matches!(change, DayStatusChange::Deleted(_)));
        assert!(repo.list_lessons(&student).await.unwrap().is_empty());

        let change = service
            .set_day_status(&student, day("2025-03-04"), LessonStatus::None)
            .await
            .unwrap();
        assert_eq!(change, DayStatusChange::Unchanged);
    }

    #[tokio::test]
    async fn month_view_and_history_order_lessons() {
        let (service, _repo, student) = setup().await;
        for raw in ["2025-03-20", "2025-02-10", "2025-03-02"] {
            service
                .set_day_status(&student, day(raw), LessonStatus::Scheduled)
                .await
                .unwrap();
        }

        let march = service
            .month_view(&student, YearMonth::new(2025, 3).unwrap())
            .await
            .unwrap();
        let days: Vec<_> = march.iter().filter_map(Lesson::day).collect();
        assert_eq!(days, vec![day("2025-03-02"), day("2025-03-20")]);

        let newest_first: Vec<_> = service
            .history(&student)
            .await
            .unwrap()
            .iter()
            .filter_map(Lesson::day)
            .collect();
        assert_eq!(
            newest_first,
            vec![day("2025-03-20"), day("2025-03-02"), day("2025-02-10")]
        );
    }
}
