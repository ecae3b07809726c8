use std::sync::Arc;

use lms_core::model::{LessonId, StudentId};
use lms_core::sheet::{
    FileKind, LessonEdit, LessonSlot, build_slots, commit_slot_edit, select_file, to_persistable,
};
use storage::repository::{LessonRepository, StudentRepository};

use crate::error::LessonSheetError;

/// Result of trying to persist a sheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(LessonId),
    /// The row is still a placeholder; nothing was written.
    Skipped,
}

/// Loads lesson sheets and writes edited rows back to storage.
#[derive(Clone)]
pub struct LessonSheetService {
    students: Arc<dyn StudentRepository>,
    lessons: Arc<dyn LessonRepository>,
}

impl LessonSheetService {
    #[must_use]
    pub fn new(students: Arc<dyn StudentRepository>, lessons: Arc<dyn LessonRepository>) -> Self {
        Self { students, lessons }
    }

    /// Build the sheet rows for a student from its stored lessons.
    ///
    /// # Errors
    ///
    /// Returns `LessonSheetError::StudentNotFound` if the student does not exist.
    /// Returns `LessonSheetError::Storage` if repository access fails.
    pub async fn load_sheet(&self, student: &StudentId) -> Result<Vec<LessonSlot>, LessonSheetError> {
        let record = self
            .students
            .get_student(student)
            .await?
            .ok_or_else(|| LessonSheetError::StudentNotFound(student.clone()))?;
        let lessons = self.lessons.list_lessons(student).await?;
        Ok(build_slots(&record.id, record.total_lessons, &lessons))
    }

    /// Persist a row unless it is still a placeholder.
    ///
    /// # Errors
    ///
    /// Returns `LessonSheetError::Storage` if the write fails.
    pub async fn save_slot(
        &self,
        student: &StudentId,
        slot: &LessonSlot,
    ) -> Result<SaveOutcome, LessonSheetError> {
        let Some(lesson) = to_persistable(slot) else {
            tracing::debug!(student_id = %student, index = slot.index(), "placeholder row not saved");
            return Ok(SaveOutcome::Skipped);
        };
        self.lessons.upsert_lesson(student, &lesson).await?;
        tracing::info!(
            student_id = %student,
            lesson_id = %lesson.id,
            status = lesson.status.as_str(),
            "lesson saved"
        );
        Ok(SaveOutcome::Saved(lesson.id))
    }

    /// Commit an edit to a row and save it.
    ///
    /// A placeholder row becomes a real lesson on its first edit.
    ///
    /// # Errors
    ///
    /// Returns `LessonSheetError::Storage` if the write fails.
    pub async fn edit_slot(
        &self,
        student: &StudentId,
        slot: LessonSlot,
        edit: LessonEdit,
    ) -> Result<(LessonSlot, SaveOutcome), LessonSheetError> {
        let slot = commit_slot_edit(slot, edit);
        let outcome = self.save_slot(student, &slot).await?;
        Ok((slot, outcome))
    }

    /// Parse `field`/`raw` and apply it to the sheet row at `index`.
    ///
    /// # Errors
    ///
    /// Returns `LessonSheetError::RowOutOfRange` for an index past the sheet,
    /// `LessonSheetError::Edit` if the field or value is invalid, and storage
    /// errors from loading or saving.
    pub async fn edit_slot_at(
        &self,
        student: &StudentId,
        index: usize,
        field: &str,
        raw: &str,
    ) -> Result<(LessonSlot, SaveOutcome), LessonSheetError> {
        let edit = LessonEdit::parse(field, raw)?;
        let slot = self.slot_at(student, index).await?;
        self.edit_slot(student, slot, edit).await
    }

    /// Attach or clear the plan/report file of a row, saving it when it is real.
    ///
    /// # Errors
    ///
    /// Returns `LessonSheetError::Storage` if the write fails.
    pub async fn attach_file(
        &self,
        student: &StudentId,
        slot: LessonSlot,
        kind: FileKind,
        file_name: Option<String>,
    ) -> Result<(LessonSlot, SaveOutcome), LessonSheetError> {
        let slot = select_file(slot, kind, file_name);
        let outcome = self.save_slot(student, &slot).await?;
        Ok((slot, outcome))
    }

    /// Same as [`Self::attach_file`] for the sheet row at `index`.
    ///
    /// # Errors
    ///
    /// Returns `LessonSheetError::RowOutOfRange` for an index past the sheet,
    /// and storage errors from loading or saving.
    pub async fn attach_file_at(
        &self,
        student: &StudentId,
        index: usize,
        kind: FileKind,
        file_name: Option<String>,
    ) -> Result<(LessonSlot, SaveOutcome), LessonSheetError> {
        let slot = self.slot_at(student, index).await?;
        self.attach_file(student, slot, kind, file_name).await
    }

    /// Delete one stored lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonSheetError::Storage` with `StorageError::NotFound` if the
    /// student has no such lesson.
    pub async fn delete_lesson(
        &self,
        student: &StudentId,
        lesson: &LessonId,
    ) -> Result<(), LessonSheetError> {
        self.lessons.delete_lesson(student, lesson).await?;
        tracing::info!(student_id = %student, lesson_id = %lesson, "lesson deleted");
        Ok(())
    }

    async fn slot_at(&self, student: &StudentId, index: usize) -> Result<LessonSlot, LessonSheetError> {
        let mut slots = self.load_sheet(student).await?;
        let len = slots.len();
        if index >= len {
            return Err(LessonSheetError::RowOutOfRange { index, len });
        }
        Ok(slots.swap_remove(index))
    }
}
