//! Shared error types for the services crate.

use thiserror::Error;

use lms_core::model::{IdError, StudentError, StudentId, TeacherError};
use lms_core::sheet::EditError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `LessonSheetService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonSheetError {
    #[error("student not found: {0}")]
    StudentNotFound(StudentId),
    #[error("sheet row {index} is out of range (sheet has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ScheduleService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScheduleError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `RosterService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RosterError {
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    Teacher(#[from] TeacherError),
    #[error(transparent)]
    Student(#[from] StudentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StudentSummaryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("student not found: {0}")]
    StudentNotFound(StudentId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
