use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Prefix reserved for placeholder lesson ids. No persisted lesson may use it.
pub const PLACEHOLDER_PREFIX: &str = "placeholder-";

/// Error type for building or parsing an id.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdError {
    #[error("{kind} cannot be empty")]
    Empty { kind: &'static str },

    #[error("{kind} cannot use the reserved `placeholder-` prefix: {raw}")]
    ReservedPrefix { kind: &'static str, raw: String },
}

fn checked(kind: &'static str, raw: String) -> Result<String, IdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdError::Empty { kind });
    }
    Ok(trimmed.to_owned())
}

/// Unique identifier for a Teacher
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TeacherId(String);

impl TeacherId {
    /// Creates a new `TeacherId`
    ///
    /// # Errors
    ///
    /// Returns `IdError::Empty` for blank input.
    pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
        checked("TeacherId", id.into()).map(Self)
    }

    /// Mints a fresh, globally unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(mint())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a Student
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudentId(String);

impl StudentId {
    /// Creates a new `StudentId`
    ///
    /// # Errors
    ///
    /// Returns `IdError::Empty` for blank input.
    pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
        checked("StudentId", id.into()).map(Self)
    }

    /// Mints a fresh, globally unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(mint())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a Lesson.
///
/// Real ids never start with [`PLACEHOLDER_PREFIX`]; the only way to get a
/// prefixed id is [`LessonId::placeholder`], which the lesson sheet uses for
/// rows that have not been filled in yet.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LessonId(String);

impl LessonId {
    /// Creates a `LessonId` for a persisted lesson.
    ///
    /// # Errors
    ///
    /// Returns `IdError::Empty` for blank input and `IdError::ReservedPrefix`
    /// if the id starts with the placeholder prefix.
    pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
        let id = checked("LessonId", id.into())?;
        if id.starts_with(PLACEHOLDER_PREFIX) {
            return Err(IdError::ReservedPrefix {
                kind: "LessonId",
                raw: id,
            });
        }
        Ok(Self(id))
    }

    /// Mints a fresh, globally unique lesson id.
    #[must_use]
    pub fn generate() -> Self {
        Self(mint())
    }

    /// Deterministic id for the placeholder row at `index` of a student's sheet.
    ///
    /// Unique within one student's sheet only.
    #[must_use]
    pub fn placeholder(student: &StudentId, index: usize) -> Self {
        Self(format!("{PLACEHOLDER_PREFIX}{}-{index}", student.as_str()))
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with(PLACEHOLDER_PREFIX)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn mint() -> String {
    format!("id_{}", uuid::Uuid::new_v4().simple())
}

// ─── Conversions ───────────────────────────────────────────────────────────────

macro_rules! string_id_impls {
    ($($ty:ident),+) => {$(
        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($ty), "({})"), self.0)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $ty {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$ty> for String {
            fn from(id: $ty) -> Self {
                id.0
            }
        }
    )+};
}

string_id_impls!(TeacherId, StudentId, LessonId);

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_id_rejects_reserved_prefix() {
        let err = LessonId::new("placeholder-s1-0").unwrap_err();
        assert!(matches!(err, IdError::ReservedPrefix { .. }));
    }

    #[test]
    fn lesson_id_rejects_blank() {
        assert_eq!(
            LessonId::new("   ").unwrap_err(),
            IdError::Empty { kind: "LessonId" }
        );
    }

    #[test]
    fn ids_are_trimmed() {
        let id: StudentId = "  s1 ".parse().unwrap();
        assert_eq!(id.as_str(), "s1");
    }

    #[test]
    fn placeholder_id_embeds_student_and_index() {
        let student = StudentId::new("s7").unwrap();
        let id = LessonId::placeholder(&student, 3);
        assert_eq!(id.as_str(), "placeholder-s7-3");
        assert!(id.is_placeholder());
    }

    #[test]
    fn generated_ids_are_distinct_and_real() {
        let a = LessonId::generate();
        let b = LessonId::generate();
        assert_ne!(a, b);
        assert!(!a.is_placeholder());
        assert!(a.as_str().starts_with("id_"));
    }

    #[test]
    fn deserialize_rejects_placeholder_lesson_id() {
        let result: Result<LessonId, _> = serde_json::from_str("\"placeholder-s1-0\"");
        assert!(result.is_err());
        let ok: LessonId = serde_json::from_str("\"l-42\"").unwrap();
        assert_eq!(ok.to_string(), "l-42");
    }

    #[test]
    fn debug_names_the_kind() {
        let id = TeacherId::new("t1").unwrap();
        assert_eq!(format!("{id:?}"), "TeacherId(t1)");
    }
}
