use std::sync::Arc;

use lms_core::Clock;
use lms_core::model::{Roster, Student, StudentId, Teacher, TeacherId};
use storage::repository::{
    LessonRepository, StorageError, StudentRepository, TeacherRepository,
};

use crate::error::RosterError;

/// Who a call-log note was taken with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallParty {
    Student,
    Parent,
}

/// Maintains teachers, students and their assignments.
#[derive(Clone)]
pub struct RosterService {
    clock: Clock,
    teachers: Arc<dyn TeacherRepository>,
    students: Arc<dyn StudentRepository>,
    lessons: Arc<dyn LessonRepository>,
}

impl RosterService {
    #[must_use]
    pub fn new(
        clock: Clock,
        teachers: Arc<dyn TeacherRepository>,
        students: Arc<dyn StudentRepository>,
        lessons: Arc<dyn LessonRepository>,
    ) -> Self {
        Self {
            clock,
            teachers,
            students,
            lessons,
        }
    }

    /// Snapshot of every teacher, student and lesson.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Storage` if repository access fails.
    pub async fn load_roster(&self) -> Result<Roster, RosterError> {
        let teachers = self.teachers.list_teachers().await?;
        let students = self.students.list_students().await?;
        let lessons = self.lessons.list_all_lessons().await?;
        Ok(Roster::new(teachers, students, lessons))
    }

    /// Create a teacher with a freshly minted id.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Teacher` for an empty name.
    /// Returns `RosterError::Storage` if persistence fails.
    pub async fn create_teacher(
        &self,
        name: &str,
        major: &str,
        phone: Option<&str>,
    ) -> Result<Teacher, RosterError> {
        let mut teacher = Teacher::new(TeacherId::generate(), name, major)?;
        teacher.set_phone(phone);
        self.teachers.upsert_teacher(&teacher).await?;
        tracing::info!(teacher_id = %teacher.id, "teacher created");
        Ok(teacher)
    }

    /// Replace an existing teacher.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Storage` with `StorageError::NotFound` if the
    /// teacher does not exist.
    pub async fn update_teacher(&self, teacher: &Teacher) -> Result<(), RosterError> {
        if self.teachers.get_teacher(&teacher.id).await?.is_none() {
            return Err(StorageError::NotFound.into());
        }
        self.teachers.upsert_teacher(teacher).await?;
        Ok(())
    }

    /// Delete a teacher and unassign its students. Returns how many students
    /// were unassigned.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Storage` with `StorageError::NotFound` if the
    /// teacher does not exist.
    pub async fn delete_teacher(&self, id: &TeacherId) -> Result<usize, RosterError> {
        if self.teachers.get_teacher(id).await?.is_none() {
            return Err(StorageError::NotFound.into());
        }
        let mut unassigned = 0;
        for mut student in self.students.list_students().await? {
            if student.teacher_id.as_ref() == Some(id) {
                student.teacher_id = None;
                self.students.upsert_student(&student).await?;
                unassigned += 1;
            }
        }
        self.teachers.delete_teacher(id).await?;
        tracing::info!(teacher_id = %id, unassigned, "teacher deleted");
        Ok(unassigned)
    }

    /// Create a student with the default lesson count, optionally assigned.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Student` for an empty name, and
    /// `RosterError::Storage` with `StorageError::NotFound` for an unknown teacher.
    pub async fn create_student(
        &self,
        name: &str,
        teacher: Option<TeacherId>,
    ) -> Result<Student, RosterError> {
        let mut student = Student::new(StudentId::generate(), name)?;
        student.teacher_id = teacher;
        self.students.upsert_student(&student).await?;
        tracing::info!(student_id = %student.id, "student created");
        Ok(student)
    }

    /// Replace an existing student.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Storage` with `StorageError::NotFound` if the
    /// student or its teacher does not exist.
    pub async fn update_student(&self, student: &Student) -> Result<(), RosterError> {
        if self.students.get_student(&student.id).await?.is_none() {
            return Err(StorageError::NotFound.into());
        }
        self.students.upsert_student(student).await?;
        Ok(())
    }

    /// Delete a student and all of its lessons. Returns how many lessons
    /// were removed.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Storage` with `StorageError::NotFound` if the
    /// student does not exist.
    pub async fn delete_student(&self, id: &StudentId) -> Result<u64, RosterError> {
        if self.students.get_student(id).await?.is_none() {
            return Err(StorageError::NotFound.into());
        }
        let removed = self.lessons.delete_lessons_of(id).await?;
        self.students.delete_student(id).await?;
        tracing::info!(student_id = %id, lessons_removed = removed, "student deleted");
        Ok(removed)
    }

    /// Assign a student to a teacher, or unassign it with `None`.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Storage` with `StorageError::NotFound` if the
    /// student or the teacher does not exist.
    pub async fn assign_student(
        &self,
        student: &StudentId,
        teacher: Option<&TeacherId>,
    ) -> Result<Student, RosterError> {
        let mut record = self.require_student(student).await?;
        if let Some(teacher) = teacher {
            if self.teachers.get_teacher(teacher).await?.is_none() {
                return Err(StorageError::NotFound.into());
            }
        }
        record.teacher_id = teacher.cloned();
        self.students.upsert_student(&record).await?;
        tracing::info!(
            student_id = %student,
            teacher_id = teacher.map(TeacherId::as_str),
            "student assigned"
        );
        Ok(record)
    }

    /// Prepend a dated note to the student's or parent's call log.
    ///
    /// Blank notes leave the log untouched; the returned student reflects
    /// what is stored either way.
    ///
    /// # Errors
    ///
    /// Returns `RosterError::Storage` with `StorageError::NotFound` if the
    /// student does not exist.
    pub async fn record_call(
        &self,
        student: &StudentId,
        party: CallParty,
        note: &str,
    ) -> Result<Student, RosterError> {
        let mut record = self.require_student(student).await?;
        let today = self.clock.today();
        let recorded = match party {
            CallParty::Student => record.record_student_call(note, today),
            CallParty::Parent => record.record_parent_call(note, today),
        };
        if recorded {
            self.students.upsert_student(&record).await?;
            tracing::info!(student_id = %student, ?party, "call logged");
        }
        Ok(record)
    }

    async fn require_student(&self, id: &StudentId) -> Result<Student, RosterError> {
        self.students
            .get_student(id)
            .await?
            .ok_or_else(|| StorageError::NotFound.into())
    }
}
