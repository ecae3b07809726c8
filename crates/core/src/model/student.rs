use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{StudentId, TeacherId};

/// Contracted lesson count given to a newly registered student.
pub const DEFAULT_TOTAL_LESSONS: u32 = 12;

const CALL_LOG_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StudentError {
    #[error("student name cannot be empty")]
    EmptyName,

    #[error("unknown registration status: {0}")]
    UnknownRegistrationStatus(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Registered,
    Unregistered,
    Consulting,
}

impl RegistrationStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Unregistered => "unregistered",
            Self::Consulting => "consulting",
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = StudentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "registered" => Ok(Self::Registered),
            "unregistered" => Ok(Self::Unregistered),
            "consulting" => Ok(Self::Consulting),
            other => Err(StudentError::UnknownRegistrationStatus(other.to_owned())),
        }
    }
}

/// A tutored student.
///
/// `re_registration_month` stays raw text (`YYYY-MM`) so a malformed value
/// reaches the registration calculator and can be reported as such.
/// The number of completed lessons is derived from the lesson records and is
/// not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub career_path: Option<String>,
    #[serde(default)]
    pub initial_registration_date: Option<NaiveDate>,
    #[serde(default)]
    pub previous_registration_month: Option<String>,
    #[serde(default)]
    pub registration_status: Option<RegistrationStatus>,
    #[serde(default)]
    pub phone_student: Option<String>,
    #[serde(default)]
    pub phone_parent: Option<String>,
    #[serde(default)]
    pub class_type: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contract_end_month: Option<String>,
    #[serde(default)]
    pub re_registration_month: Option<String>,
    #[serde(default)]
    pub total_lessons: u32,
    #[serde(default)]
    pub teacher_id: Option<TeacherId>,
    #[serde(default)]
    pub characteristics: Option<String>,
    #[serde(default)]
    pub characteristics_written: Option<NaiveDate>,
    #[serde(default)]
    pub grades: Option<String>,
    #[serde(default)]
    pub grades_updated: Option<NaiveDate>,
    #[serde(default)]
    pub desired_major: Option<String>,
    #[serde(default)]
    pub desired_major_updated: Option<NaiveDate>,
    #[serde(default)]
    pub student_call_log: Option<String>,
    #[serde(default)]
    pub student_call_log_written: Option<NaiveDate>,
    #[serde(default)]
    pub parent_call_log: Option<String>,
    #[serde(default)]
    pub parent_call_log_written: Option<NaiveDate>,
}

impl Student {
    /// Creates a student with the default contracted lesson count.
    ///
    /// # Errors
    ///
    /// Returns `StudentError::EmptyName` if name is empty or whitespace-only.
    pub fn new(id: StudentId, name: impl Into<String>) -> Result<Self, StudentError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StudentError::EmptyName);
        }
        Ok(Self {
            id,
            name: name.trim().to_owned(),
            school: None,
            grade: None,
            career_path: None,
            initial_registration_date: None,
            previous_registration_month: None,
            registration_status: None,
            phone_student: None,
            phone_parent: None,
            class_type: None,
            email: None,
            address: None,
            contract_end_month: None,
            re_registration_month: None,
            total_lessons: DEFAULT_TOTAL_LESSONS,
            teacher_id: None,
            characteristics: None,
            characteristics_written: None,
            grades: None,
            grades_updated: None,
            desired_major: None,
            desired_major_updated: None,
            student_call_log: None,
            student_call_log_written: None,
            parent_call_log: None,
            parent_call_log_written: None,
        })
    }

    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.teacher_id.is_some()
    }

    /// Prepends a dated note to the student call log.
    ///
    /// Returns false (and changes nothing) when the note is blank.
    pub fn record_student_call(&mut self, note: &str, today: NaiveDate) -> bool {
        if !prepend_log(&mut self.student_call_log, note, today) {
            return false;
        }
        self.student_call_log_written = Some(today);
        true
    }

    /// Prepends a dated note to the parent call log.
    ///
    /// Returns false (and changes nothing) when the note is blank.
    pub fn record_parent_call(&mut self, note: &str, today: NaiveDate) -> bool {
        if !prepend_log(&mut self.parent_call_log, note, today) {
            return false;
        }
        self.parent_call_log_written = Some(today);
        true
    }
}

fn prepend_log(log: &mut Option<String>, note: &str, today: NaiveDate) -> bool {
    let note = note.trim();
    if note.is_empty() {
        return false;
    }
    let entry = format!("[{}]\n{note}", today.format("%Y-%m-%d"));
    *log = Some(match log.take().filter(|existing| !existing.is_empty()) {
        Some(existing) => format!("{entry}{CALL_LOG_SEPARATOR}{existing}"),
        None => entry,
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Student {
        Student::new(StudentId::new("s1").unwrap(), "  Kim  ").unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    #[test]
    fn new_student_gets_default_lessons_and_trimmed_name() {
        let s = student();
        assert_eq!(s.name, "Kim");
        assert_eq!(s.total_lessons, DEFAULT_TOTAL_LESSONS);
        assert!(!s.is_assigned());
    }

    #[test]
    fn rejects_blank_name() {
        let err = Student::new(StudentId::new("s1").unwrap(), " ").unwrap_err();
        assert_eq!(err, StudentError::EmptyName);
    }

    #[test]
    fn call_log_prepends_newest_entry() {
        let mut s = student();
        assert!(s.record_student_call("first call", day(1)));
        assert!(s.record_student_call("  second call ", day(3)));

        assert_eq!(
            s.student_call_log.as_deref(),
            Some("[2025-04-03]\nsecond call\n\n---\n\n[2025-04-01]\nfirst call")
        );
        assert_eq!(s.student_call_log_written, Some(day(3)));
        assert!(s.parent_call_log.is_none());
    }

    #[test]
    fn blank_call_note_is_ignored() {
        let mut s = student();
        assert!(!s.record_parent_call("   ", day(2)));
        assert!(s.parent_call_log.is_none());
        assert!(s.parent_call_log_written.is_none());
    }

    #[test]
    fn registration_status_tokens() {
        assert_eq!(
            "consulting".parse::<RegistrationStatus>().unwrap(),
            RegistrationStatus::Consulting
        );
        assert!("maybe".parse::<RegistrationStatus>().is_err());
    }
}
