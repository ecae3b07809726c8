mod ids;
mod lesson;
mod roster;
mod student;
mod teacher;

pub use ids::{IdError, LessonId, PLACEHOLDER_PREFIX, StudentId, TeacherId};
pub use lesson::{
    IndexUsage, Lesson, LessonError, LessonStatus, PlanReviewStatus, SchoolSubmissionStatus,
    parse_lesson_date,
};
pub use roster::Roster;
pub use student::{DEFAULT_TOTAL_LESSONS, RegistrationStatus, Student, StudentError};
pub use teacher::{Teacher, TeacherError, normalize_phone};
