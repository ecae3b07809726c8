use thiserror::Error;

use crate::model::{IdError, LessonError, StudentError, TeacherError};
use crate::sheet::EditError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Student(#[from] StudentError),
    #[error(transparent)]
    Teacher(#[from] TeacherError),
}
