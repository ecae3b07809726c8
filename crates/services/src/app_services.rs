use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::lesson_sheet_service::LessonSheetService;
use crate::roster_service::RosterService;
use crate::schedule_service::ScheduleService;
use crate::summary_service::StudentSummaryService;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    roster: Arc<RosterService>,
    lesson_sheet: Arc<LessonSheetService>,
    schedule: Arc<ScheduleService>,
    summaries: Arc<StudentSummaryService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services over in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let roster = Arc::new(RosterService::new(
            clock,
            Arc::clone(&storage.teachers),
            Arc::clone(&storage.students),
            Arc::clone(&storage.lessons),
        ));
        let lesson_sheet = Arc::new(LessonSheetService::new(
            Arc::clone(&storage.students),
            Arc::clone(&storage.lessons),
        ));
        let schedule = Arc::new(ScheduleService::new(Arc::clone(&storage.lessons)));
        let summaries = Arc::new(StudentSummaryService::new(
            clock,
            Arc::clone(&storage.students),
            Arc::clone(&storage.lessons),
        ));

        Self {
            clock,
            roster,
            lesson_sheet,
            schedule,
            summaries,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn roster(&self) -> Arc<RosterService> {
        Arc::clone(&self.roster)
    }

    #[must_use]
    pub fn lesson_sheet(&self) -> Arc<LessonSheetService> {
        Arc::clone(&self.lesson_sheet)
    }

    #[must_use]
    pub fn schedule(&self) -> Arc<ScheduleService> {
        Arc::clone(&self.schedule)
    }

    #[must_use]
    pub fn summaries(&self) -> Arc<StudentSummaryService> {
        Arc::clone(&self.summaries)
    }
}
