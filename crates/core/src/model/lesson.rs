use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::LessonId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("unknown {field} value: {raw}")]
    UnknownToken { field: &'static str, raw: String },
}

fn unknown(field: &'static str, raw: &str) -> LessonError {
    LessonError::UnknownToken {
        field,
        raw: raw.to_owned(),
    }
}

//
// ─── STATUS & ENUMERATED FIELDS ────────────────────────────────────────────────
//

/// Lifecycle state of a lesson.
///
/// `None` is a request, not a state: setting it on a day that already has a
/// lesson deletes that lesson. It is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonStatus {
    #[default]
    Pending,
    Scheduled,
    Completed,
    Cancelled,
    None,
}

impl LessonStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Scheduled => "SCHEDULED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::None => "NONE",
        }
    }

    /// True for every status a stored lesson may carry.
    #[must_use]
    pub fn is_persistable(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl FromStr for LessonStatus {
    type Err = LessonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "SCHEDULED" => Ok(Self::Scheduled),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            "NONE" => Ok(Self::None),
            _ => Err(unknown("status", s)),
        }
    }
}

/// Whether the lesson used the provided index material or a self-made one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexUsage {
    Provided,
    SelfMade,
}

impl IndexUsage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Provided => "provided",
            Self::SelfMade => "self_made",
        }
    }
}

impl FromStr for IndexUsage {
    type Err = LessonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "provided" => Ok(Self::Provided),
            "self_made" => Ok(Self::SelfMade),
            _ => Err(unknown("index usage", s)),
        }
    }
}

/// Review state of the uploaded lesson plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanReviewStatus {
    NotReviewed,
    Approved,
    RevisionRequested,
}

impl PlanReviewStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotReviewed => "not_reviewed",
            Self::Approved => "approved",
            Self::RevisionRequested => "revision_requested",
        }
    }
}

impl FromStr for PlanReviewStatus {
    type Err = LessonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "not_reviewed" => Ok(Self::NotReviewed),
            "approved" => Ok(Self::Approved),
            "revision_requested" => Ok(Self::RevisionRequested),
            _ => Err(unknown("plan review status", s)),
        }
    }
}

/// Whether the report was handed in to the student's school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolSubmissionStatus {
    NotSubmitted,
    Submitted,
}

impl SchoolSubmissionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotSubmitted => "not_submitted",
            Self::Submitted => "submitted",
        }
    }
}

impl FromStr for SchoolSubmissionStatus {
    type Err = LessonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "not_submitted" => Ok(Self::NotSubmitted),
            "submitted" => Ok(Self::Submitted),
            _ => Err(unknown("school submission status", s)),
        }
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// One lesson record of a student.
///
/// `date` keeps the raw ISO-8601 text as entered or stored, so that a value
/// which does not parse is still carried through rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: LessonId,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: LessonStatus,
    #[serde(default)]
    pub index_usage: Option<IndexUsage>,
    #[serde(default)]
    pub plan_upload_date: Option<NaiveDate>,
    #[serde(default)]
    pub plan_file: Option<String>,
    #[serde(default)]
    pub plan_review_status: Option<PlanReviewStatus>,
    #[serde(default)]
    pub lesson_content: Option<String>,
    #[serde(default)]
    pub report_deadline: Option<NaiveDate>,
    #[serde(default)]
    pub report_file: Option<String>,
    #[serde(default)]
    pub school_submission_date: Option<NaiveDate>,
    #[serde(default)]
    pub school_submission_status: Option<SchoolSubmissionStatus>,
    #[serde(default)]
    pub first_reminder_sent: bool,
    #[serde(default)]
    pub second_reminder_sent: bool,
    #[serde(default)]
    pub third_reminder_sent: bool,
    #[serde(default)]
    pub non_submission_reason: Option<String>,
}

impl Lesson {
    /// Creates a lesson with only identity, date and status set.
    #[must_use]
    pub fn new(id: LessonId, date: Option<String>, status: LessonStatus) -> Self {
        Self {
            id,
            date,
            status,
            index_usage: None,
            plan_upload_date: None,
            plan_file: None,
            plan_review_status: None,
            lesson_content: None,
            report_deadline: None,
            report_file: None,
            school_submission_date: None,
            school_submission_status: None,
            first_reminder_sent: false,
            second_reminder_sent: false,
            third_reminder_sent: false,
            non_submission_reason: None,
        }
    }

    /// Creates a lesson on the given calendar day.
    #[must_use]
    pub fn on_day(id: LessonId, day: NaiveDate, status: LessonStatus) -> Self {
        Self::new(id, Some(day.format("%Y-%m-%d").to_string()), status)
    }

    /// Parsed lesson timestamp, if `date` is present and readable.
    #[must_use]
    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        self.date.as_deref().and_then(parse_lesson_date)
    }

    /// Calendar day of the lesson, if `date` is present and readable.
    #[must_use]
    pub fn day(&self) -> Option<NaiveDate> {
        self.scheduled_at().map(|at| at.date())
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == LessonStatus::Completed
    }
}

/// Parses an ISO-8601 date or datetime.
///
/// Offsets are normalised to UTC; a bare date is read as midnight.
#[must_use]
pub fn parse_lesson_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.naive_utc());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(at);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|day| day.and_time(NaiveTime::MIN))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
