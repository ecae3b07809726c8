use async_trait::async_trait;
use lms_core::model::{Lesson, LessonId, Student, StudentId, Teacher, TeacherId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Rejects lessons that must never reach the store.
pub(crate) fn ensure_storable(lesson: &Lesson) -> Result<(), StorageError> {
    if lesson.status.is_persistable() && !lesson.id.is_placeholder() {
        return Ok(());
    }
    Err(StorageError::Serialization(format!(
        "lesson {} is not storable (status {})",
        lesson.id,
        lesson.status.as_str()
    )))
}

/// Repository contract for teachers.
#[async_trait]
pub trait TeacherRepository: Send + Sync {
    /// Create or replace a teacher by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the teacher cannot be stored.
    async fn upsert_teacher(&self, teacher: &Teacher) -> Result<(), StorageError>;

    /// Fetch a teacher by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn get_teacher(&self, id: &TeacherId) -> Result<Option<Teacher>, StorageError>;

    /// All teachers in creation order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_teachers(&self) -> Result<Vec<Teacher>, StorageError>;

    /// Delete a teacher. Students assigned to it become unassigned.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn delete_teacher(&self, id: &TeacherId) -> Result<(), StorageError>;
}

/// Repository contract for students.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Create or replace a student by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the assigned teacher does not exist,
    /// or other storage errors.
    async fn upsert_student(&self, student: &Student) -> Result<(), StorageError>;

    /// Fetch a student by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn get_student(&self, id: &StudentId) -> Result<Option<Student>, StorageError>;

    /// All students in creation order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_students(&self) -> Result<Vec<Student>, StorageError>;

    /// Delete a student together with its lessons.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn delete_student(&self, id: &StudentId) -> Result<(), StorageError>;
}

/// Repository contract for lessons, keyed by student.
///
/// Lesson ids are unique across all students.
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Create the lesson if its id is unseen, replace it otherwise.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the student does not exist,
    /// `StorageError::Conflict` if the id belongs to another student's lesson,
    /// and `StorageError::Serialization` for placeholder rows or `NONE` status.
    async fn upsert_lesson(&self, student: &StudentId, lesson: &Lesson)
    -> Result<(), StorageError>;

    /// Delete one lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the student has no such lesson.
    async fn delete_lesson(&self, student: &StudentId, id: &LessonId) -> Result<(), StorageError>;

    /// A student's lessons in the order they were first stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_lessons(&self, student: &StudentId) -> Result<Vec<Lesson>, StorageError>;

    /// Every lesson with its owner, in the order they were first stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_all_lessons(&self) -> Result<Vec<(StudentId, Lesson)>, StorageError>;

    /// Delete all of a student's lessons, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn delete_lessons_of(&self, student: &StudentId) -> Result<u64, StorageError>;
}

#[derive(Default)]
struct Tables {
    teachers: Vec<Teacher>,
    students: Vec<Student>,
    lessons: Vec<(StudentId, Lesson)>,
    lesson_index: HashMap<LessonId, usize>,
}

impl Tables {
    fn reindex(&mut self) {
        self.lesson_index = self
            .lessons
            .iter()
            .enumerate()
            .map(|(i, (_, lesson))| (lesson.id.clone(), i))
            .collect();
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl TeacherRepository for InMemoryRepository {
    async fn upsert_teacher(&self, teacher: &Teacher) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        match guard.teachers.iter_mut().find(|t| t.id == teacher.id) {
            Some(existing) => *existing = teacher.clone(),
            None => guard.teachers.push(teacher.clone()),
        }
        Ok(())
    }

    async fn get_teacher(&self, id: &TeacherId) -> Result<Option<Teacher>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.teachers.iter().find(|t| &t.id == id).cloned())
    }

    async fn list_teachers(&self) -> Result<Vec<Teacher>, StorageError> {
        Ok(self.lock()?.teachers.clone())
    }

    async fn delete_teacher(&self, id: &TeacherId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let before = guard.teachers.len();
        guard.teachers.retain(|t| &t.id != id);
        if guard.teachers.len() == before {
            return Err(StorageError::NotFound);
        }
        for student in &mut guard.students {
            if student.teacher_id.as_ref() == Some(id) {
                student.teacher_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StudentRepository for InMemoryRepository {
    async fn upsert_student(&self, student: &Student) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if let Some(teacher) = &student.teacher_id {
            if !guard.teachers.iter().any(|t| &t.id == teacher) {
                return Err(StorageError::NotFound);
            }
        }
        match guard.students.iter_mut().find(|s| s.id == student.id) {
            Some(existing) => *existing = student.clone(),
            None => guard.students.push(student.clone()),
        }
        Ok(())
    }

    async fn get_student(&self, id: &StudentId) -> Result<Option<Student>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.students.iter().find(|s| &s.id == id).cloned())
    }

    async fn list_students(&self) -> Result<Vec<Student>, StorageError> {
        Ok(self.lock()?.students.clone())
    }

    async fn delete_student(&self, id: &StudentId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let before = guard.students.len();
        guard.students.retain(|s| &s.id != id);
        if guard.students.len() == before {
            return Err(StorageError::NotFound);
        }
        guard.lessons.retain(|(owner, _)| owner != id);
        guard.reindex();
        Ok(())
    }
}

#[async_trait]
impl LessonRepository for InMemoryRepository {
    async fn upsert_lesson(
        &self,
        student: &StudentId,
        lesson: &Lesson,
    ) -> Result<(), StorageError> {
        ensure_storable(lesson)?;
        let mut guard = self.lock()?;
        if !guard.students.iter().any(|s| &s.id == student) {
            return Err(StorageError::NotFound);
        }
        match guard.lesson_index.get(&lesson.id).copied() {
            Some(at) if &guard.lessons[at].0 != student => Err(StorageError::Conflict),
            Some(at) => {
                guard.lessons[at].1 = lesson.clone();
                Ok(())
            }
            None => {
                let at = guard.lessons.len();
                guard.lessons.push((student.clone(), lesson.clone()));
                guard.lesson_index.insert(lesson.id.clone(), at);
                Ok(())
            }
        }
    }

    async fn delete_lesson(&self, student: &StudentId, id: &LessonId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        match guard.lesson_index.get(id).copied() {
            Some(at) if &guard.lessons[at].0 == student => {
                guard.lessons.remove(at);
                guard.reindex();
                Ok(())
            }
            _ => Err(StorageError::NotFound),
        }
    }

    async fn list_lessons(&self, student: &StudentId) -> Result<Vec<Lesson>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .lessons
            .iter()
            .filter(|(owner, _)| owner == student)
            .map(|(_, lesson)| lesson.clone())
            .collect())
    }

    async fn list_all_lessons(&self) -> Result<Vec<(StudentId, Lesson)>, StorageError> {
        Ok(self.lock()?.lessons.clone())
    }

    async fn delete_lessons_of(&self, student: &StudentId) -> Result<u64, StorageError> {
        let mut guard = self.lock()?;
        let before = guard.lessons.len();
        guard.lessons.retain(|(owner, _)| owner != student);
        let removed = before - guard.lessons.len();
        guard.reindex();
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub teachers: Arc<dyn TeacherRepository>,
    pub students: Arc<dyn StudentRepository>,
    pub lessons: Arc<dyn LessonRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let teachers: Arc<dyn TeacherRepository> = Arc::new(repo.clone());
        let students: Arc<dyn StudentRepository> = Arc::new(repo.clone());
        let lessons: Arc<dyn LessonRepository> = Arc::new(repo);
        Self {
            teachers,
            students,
            lessons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::model::LessonStatus;

    fn student(id: &str) -> Student {
        Student::new(StudentId::new(id).unwrap(), format!("Student {id}")).unwrap()
    }

    fn lesson(id: &str, date: &str) -> Lesson {
        Lesson::new(
            LessonId::new(id).unwrap(),
            Some(date.into()),
            LessonStatus::Scheduled,
        )
    }

    async fn repo_with(students: &[&str]) -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        for id in students {
            repo.upsert_student(&student(id)).await.unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn upsert_creates_then_replaces_in_place() {
        let repo = repo_with(&["s1"]).await;
        let s1 = StudentId::new("s1").unwrap();

        repo.upsert_lesson(&s1, &lesson("a", "2025-01-01")).await.unwrap();
        repo.upsert_lesson(&s1, &lesson("b", "2025-01-02")).await.unwrap();
        let mut changed = lesson("a", "2025-01-01");
        changed.status = LessonStatus::Completed;
        repo.upsert_lesson(&s1, &changed).await.unwrap();

        let lessons = repo.list_lessons(&s1).await.unwrap();
        assert_eq!(lessons.len(), 2);
        assert_eq!(lessons[0].id.as_str(), "a");
        assert_eq!(lessons[0].status, LessonStatus::Completed);
    }

    #[tokio::test]
    async fn upsert_rejects_none_status_and_unknown_student() {
        let repo = repo_with(&["s1"]).await;
        let s1 = StudentId::new("s1").unwrap();

        let mut gone = lesson("a", "2025-01-01");
        gone.status = LessonStatus::None;
        assert!(matches!(
            repo.upsert_lesson(&s1, &gone).await,
            Err(StorageError::Serialization(_))
        ));

        let ghost = StudentId::new("ghost").unwrap();
        assert!(matches!(
            repo.upsert_lesson(&ghost, &lesson("b", "2025-01-01")).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn lesson_ids_are_unique_across_students() {
        let repo = repo_with(&["s1", "s2"]).await;
        let s1 = StudentId::new("s1").unwrap();
        let s2 = StudentId::new("s2").unwrap();

        repo.upsert_lesson(&s1, &lesson("a", "2025-01-01")).await.unwrap();
        assert!(matches!(
            repo.upsert_lesson(&s2, &lesson("a", "2025-01-01")).await,
            Err(StorageError::Conflict)
        ));
        assert!(matches!(
            repo.delete_lesson(&s2, &LessonId::new("a").unwrap()).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn deleting_owners_cascades() {
        let repo = repo_with(&["s1", "s2"]).await;
        let s1 = StudentId::new("s1").unwrap();
        let s2 = StudentId::new("s2").unwrap();
        repo.upsert_lesson(&s1, &lesson("a", "2025-01-01")).await.unwrap();
        repo.upsert_lesson(&s2, &lesson("b", "2025-01-01")).await.unwrap();

        let t1 = Teacher::new(TeacherId::new("t1").unwrap(), "T", "").unwrap();
        repo.upsert_teacher(&t1).await.unwrap();
        let mut assigned = student("s2");
        assigned.teacher_id = Some(t1.id.clone());
        repo.upsert_student(&assigned).await.unwrap();

        repo.delete_student(&s1).await.unwrap();
        let all = repo.list_all_lessons().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0, s2);
        repo.delete_lesson(&s2, &LessonId::new("b").unwrap())
            .await
            .unwrap();

        repo.delete_teacher(&t1.id).await.unwrap();
        let s2_after = repo.get_student(&s2).await.unwrap().unwrap();
        assert!(s2_after.teacher_id.is_none());
        assert!(matches!(
            repo.delete_teacher(&t1.id).await,
            Err(StorageError::NotFound)
        ));
    }
}
