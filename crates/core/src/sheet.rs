//! Lesson sheet reconciliation.
//!
//! A student's sheet has one row per contracted lesson. Rows are filled from
//! the student's recorded lessons in date order; the remaining rows are
//! placeholders that only become real lessons once something is typed into
//! them.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::model::{
    IndexUsage, Lesson, LessonId, LessonStatus, PlanReviewStatus, SchoolSubmissionStatus,
    StudentId, parse_lesson_date,
};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditError {
    #[error("unknown lesson field: {0}")]
    UnknownField(String),

    #[error("invalid value for {field}: {raw:?}")]
    InvalidValue { field: &'static str, raw: String },
}

//
// ─── SLOTS ─────────────────────────────────────────────────────────────────────
//

/// One row of a lesson sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonSlot {
    index: usize,
    lesson: Lesson,
    placeholder: bool,
}

impl LessonSlot {
    fn real(index: usize, lesson: Lesson) -> Self {
        Self {
            index,
            lesson,
            placeholder: false,
        }
    }

    fn placeholder(student: &StudentId, index: usize) -> Self {
        Self {
            index,
            lesson: Lesson::new(
                LessonId::placeholder(student, index),
                None,
                LessonStatus::Pending,
            ),
            placeholder: true,
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.lesson.id
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Applies an edit in place, promoting a placeholder to a real lesson.
    ///
    /// Promotion is one-way: clearing every field afterwards leaves the slot real.
    /// A status of `None` is ignored; lessons are removed through the schedule.
    pub fn commit(&mut self, edit: LessonEdit) {
        if matches!(edit, LessonEdit::Status(LessonStatus::None)) {
            return;
        }
        edit.apply(&mut self.lesson);
        self.promote();
    }

    fn promote(&mut self) {
        if !self.placeholder {
            return;
        }
        self.placeholder = false;
        if self.lesson.id.is_placeholder() {
            self.lesson.id = LessonId::generate();
        }
    }
}

/// Lays a student's lessons out as sheet rows.
///
/// Lessons are ordered by date, earliest first. Lessons with a missing or
/// unreadable date go after all dated ones, and lessons that compare equal
/// keep their input order. The sheet has `max(total_lessons, lessons.len())`
/// rows so no recorded lesson is ever hidden; rows past the last lesson are
/// placeholders.
#[must_use]
pub fn build_slots(student: &StudentId, total_lessons: u32, lessons: &[Lesson]) -> Vec<LessonSlot> {
    let mut keyed: Vec<(Option<NaiveDateTime>, &Lesson)> = lessons
        .iter()
        .map(|lesson| (lesson.scheduled_at(), lesson))
        .collect();
    // `sort_by_key` is stable, which pins tie order to the input order.
    keyed.sort_by_key(|(at, _)| (at.is_none(), *at));

    let rows = usize::try_from(total_lessons)
        .unwrap_or(usize::MAX)
        .max(keyed.len());
    let mut sorted = keyed.into_iter().map(|(_, lesson)| lesson.clone());

    (0..rows)
        .map(|index| match sorted.next() {
            Some(lesson) => LessonSlot::real(index, lesson),
            None => LessonSlot::placeholder(student, index),
        })
        .collect()
}

/// Applies a field edit to a slot and returns the updated slot.
///
/// Does not persist anything.
#[must_use]
pub fn commit_slot_edit(mut slot: LessonSlot, edit: LessonEdit) -> LessonSlot {
    slot.commit(edit);
    slot
}

/// Which file reference of a lesson is being set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Plan,
    Report,
}

/// Sets or clears a file reference on a slot.
///
/// Attaching a file promotes a placeholder; clearing one on a placeholder
/// leaves it a placeholder.
#[must_use]
pub fn select_file(mut slot: LessonSlot, kind: FileKind, name: Option<String>) -> LessonSlot {
    let name = name.filter(|n| !n.trim().is_empty());
    let attached = name.is_some();
    let edit = match kind {
        FileKind::Plan => LessonEdit::PlanFile(name),
        FileKind::Report => LessonEdit::ReportFile(name),
    };
    edit.apply(&mut slot.lesson);
    if attached {
        slot.promote();
    }
    slot
}

/// Returns the lesson to store for a slot, or `None` while it is a placeholder.
#[must_use]
pub fn to_persistable(slot: &LessonSlot) -> Option<Lesson> {
    if slot.placeholder {
        return None;
    }
    Some(slot.lesson.clone())
}

//
// ─── EDITS ─────────────────────────────────────────────────────────────────────
//

/// A change to a single lesson field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonEdit {
    Date(Option<String>),
    Status(LessonStatus),
    IndexUsage(Option<IndexUsage>),
    PlanUploadDate(Option<NaiveDate>),
    PlanFile(Option<String>),
    PlanReviewStatus(Option<PlanReviewStatus>),
    LessonContent(Option<String>),
    ReportDeadline(Option<NaiveDate>),
    ReportFile(Option<String>),
    SchoolSubmissionDate(Option<NaiveDate>),
    SchoolSubmissionStatus(Option<SchoolSubmissionStatus>),
    FirstReminderSent(bool),
    SecondReminderSent(bool),
    ThirdReminderSent(bool),
    NonSubmissionReason(Option<String>),
}

impl LessonEdit {
    /// Builds an edit from a field name and its raw text.
    ///
    /// Empty text clears optional fields. Field names are `snake_case`;
    /// dashes are accepted in place of underscores.
    ///
    /// # Errors
    ///
    /// Returns `EditError::UnknownField` for an unrecognized field and
    /// `EditError::InvalidValue` when the text does not fit the field.
    pub fn parse(field: &str, raw: &str) -> Result<Self, EditError> {
        let field = field.trim().replace('-', "_");
        let text = raw.trim();
        let edit = match field.as_str() {
            "date" => Self::Date(opt_date_text("date", text)?),
            "status" => Self::Status(sheet_status(text)?),
            "index_usage" => Self::IndexUsage(opt_token("index_usage", text)?),
            "plan_upload_date" => Self::PlanUploadDate(opt_day("plan_upload_date", text)?),
            "plan_file" => Self::PlanFile(opt_text(text)),
            "plan_review_status" => {
                Self::PlanReviewStatus(opt_token("plan_review_status", text)?)
            }
            "lesson_content" => Self::LessonContent(opt_text(text)),
            "report_deadline" => Self::ReportDeadline(opt_day("report_deadline", text)?),
            "report_file" => Self::ReportFile(opt_text(text)),
            "school_submission_date" => {
                Self::SchoolSubmissionDate(opt_day("school_submission_date", text)?)
            }
            "school_submission_status" => {
                Self::SchoolSubmissionStatus(opt_token("school_submission_status", text)?)
            }
            "first_reminder_sent" => Self::FirstReminderSent(flag("first_reminder_sent", text)?),
            "second_reminder_sent" => {
                Self::SecondReminderSent(flag("second_reminder_sent", text)?)
            }
            "third_reminder_sent" => Self::ThirdReminderSent(flag("third_reminder_sent", text)?),
            "non_submission_reason" => Self::NonSubmissionReason(opt_text(text)),
            _ => return Err(EditError::UnknownField(field)),
        };
        Ok(edit)
    }

    #[must_use]
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Date(_) => "date",
            Self::Status(_) => "status",
            Self::IndexUsage(_) => "index_usage",
            Self::PlanUploadDate(_) => "plan_upload_date",
            Self::PlanFile(_) => "plan_file",
            Self::PlanReviewStatus(_) => "plan_review_status",
            Self::LessonContent(_) => "lesson_content",
            Self::ReportDeadline(_) => "report_deadline",
            Self::ReportFile(_) => "report_file",
            Self::SchoolSubmissionDate(_) => "school_submission_date",
            Self::SchoolSubmissionStatus(_) => "school_submission_status",
            Self::FirstReminderSent(_) => "first_reminder_sent",
            Self::SecondReminderSent(_) => "second_reminder_sent",
            Self::ThirdReminderSent(_) => "third_reminder_sent",
            Self::NonSubmissionReason(_) => "non_submission_reason",
        }
    }

    /// Writes the edit into a lesson.
    pub fn apply(self, lesson: &mut Lesson) {
        match self {
            Self::Date(v) => lesson.date = v,
            Self::Status(v) => lesson.status = v,
            Self::IndexUsage(v) => lesson.index_usage = v,
            Self::PlanUploadDate(v) => lesson.plan_upload_date = v,
            Self::PlanFile(v) => lesson.plan_file = v,
            Self::PlanReviewStatus(v) => lesson.plan_review_status = v,
            Self::LessonContent(v) => lesson.lesson_content = v,
            Self::ReportDeadline(v) => lesson.report_deadline = v,
            Self::ReportFile(v) => lesson.report_file = v,
            Self::SchoolSubmissionDate(v) => lesson.school_submission_date = v,
            Self::SchoolSubmissionStatus(v) => lesson.school_submission_status = v,
            Self::FirstReminderSent(v) => lesson.first_reminder_sent = v,
            Self::SecondReminderSent(v) => lesson.second_reminder_sent = v,
            Self::ThirdReminderSent(v) => lesson.third_reminder_sent = v,
            Self::NonSubmissionReason(v) => lesson.non_submission_reason = v,
        }
    }
}

fn invalid(field: &'static str, raw: &str) -> EditError {
    EditError::InvalidValue {
        field,
        raw: raw.to_owned(),
    }
}

fn opt_text(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_owned())
}

fn opt_date_text(field: &'static str, text: &str) -> Result<Option<String>, EditError> {
    if text.is_empty() {
        return Ok(None);
    }
    parse_lesson_date(text)
        .map(|_| Some(text.to_owned()))
        .ok_or_else(|| invalid(field, text))
}

fn opt_day(field: &'static str, text: &str) -> Result<Option<NaiveDate>, EditError> {
    if text.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| invalid(field, text))
}

fn opt_token<T: std::str::FromStr>(field: &'static str, text: &str) -> Result<Option<T>, EditError> {
    if text.is_empty() {
        return Ok(None);
    }
    text.parse().map(Some).map_err(|_| invalid(field, text))
}

// The sheet offers the four real states; deletion goes through the schedule.
fn sheet_status(text: &str) -> Result<LessonStatus, EditError> {
    match text.parse::<LessonStatus>() {
        Ok(status) if status.is_persistable() => Ok(status),
        _ => Err(invalid("status", text)),
    }
}

fn flag(field: &'static str, text: &str) -> Result<bool, EditError> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" | "" => Ok(false),
        _ => Err(invalid(field, text)),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> StudentId {
        StudentId::new("s1").unwrap()
    }

    fn lesson(id: &str, date: Option<&str>) -> Lesson {
        Lesson::new(
            LessonId::new(id).unwrap(),
            date.map(str::to_owned),
            LessonStatus::Scheduled,
        )
    }

    fn ids(slots: &[LessonSlot]) -> Vec<&str> {
        slots.iter().map(|s| s.id().as_str()).collect()
    }

    #[test]
    fn fills_earliest_lessons_first_then_placeholders() {
        let lessons = vec![
            lesson("c", Some("2025-03-01")),
            lesson("a", Some("2025-01-10")),
            lesson("b", Some("2025-02-05T10:00:00Z")),
        ];

        let slots = build_slots(&student(), 5, &lessons);

        assert_eq!(slots.len(), 5);
        assert_eq!(
            ids(&slots),
            vec!["a", "b", "c", "placeholder-s1-3", "placeholder-s1-4"]
        );
        for (i, slot) in slots.iter().enumerate() {
            assert_eq!(slot.index(), i);
            assert_eq!(slot.is_placeholder(), i >= 3);
        }
        let tail = &slots[4];
        assert_eq!(tail.lesson().status, LessonStatus::Pending);
        assert!(tail.lesson().date.is_none());
    }

    #[test]
    fn zero_total_with_no_lessons_is_empty() {
        assert!(build_slots(&student(), 0, &[]).is_empty());
    }

    #[test]
    fn grows_to_show_every_recorded_lesson() {
        let lessons = vec![
            lesson("a", Some("2025-01-01")),
            lesson("b", Some("2025-01-02")),
            lesson("c", Some("2025-01-03")),
        ];

        let slots = build_slots(&student(), 2, &lessons);

        assert_eq!(slots.len(), 3);
        assert!(slots.iter().all(|s| !s.is_placeholder()));
    }

    #[test]
    fn undated_lessons_follow_dated_ones_in_input_order() {
        let lessons = vec![
            lesson("x", None),
            lesson("late", Some("2025-06-01")),
            lesson("junk", Some("sometime")),
            lesson("early", Some("2025-01-01")),
            lesson("y", Some("")),
        ];

        let slots = build_slots(&student(), 5, &lessons);

        assert_eq!(ids(&slots), vec!["early", "late", "x", "junk", "y"]);
    }

    #[test]
    fn same_date_ties_keep_input_order() {
        let forward = vec![
            lesson("first", Some("2025-02-01")),
            lesson("second", Some("2025-02-01")),
            lesson("before", Some("2025-01-15")),
        ];
        let slots = build_slots(&student(), 3, &forward);
        assert_eq!(ids(&slots), vec!["before", "first", "second"]);

        let reversed = vec![
            lesson("second", Some("2025-02-01")),
            lesson("first", Some("2025-02-01")),
            lesson("before", Some("2025-01-15")),
        ];
        let slots = build_slots(&student(), 3, &reversed);
        assert_eq!(ids(&slots), vec!["before", "second", "first"]);
    }

    #[test]
    fn placeholder_ids_are_deterministic_per_student() {
        let a = build_slots(&student(), 2, &[]);
        let b = build_slots(&student(), 2, &[]);
        assert_eq!(a, b);

        let other = build_slots(&StudentId::new("s2").unwrap(), 2, &[]);
        assert_eq!(other[0].id().as_str(), "placeholder-s2-0");
    }

    #[test]
    fn commit_promotes_placeholder_with_fresh_id() {
        let slot = build_slots(&student(), 1, &[]).remove(0);
        assert!(slot.is_placeholder());

        let slot = commit_slot_edit(slot, LessonEdit::LessonContent(Some("intro".into())));

        assert!(!slot.is_placeholder());
        assert!(!slot.id().is_placeholder());
        assert_eq!(slot.lesson().lesson_content.as_deref(), Some("intro"));
        assert_eq!(slot.index(), 0);
    }

    #[test]
    fn promotion_never_reverts() {
        let slot = build_slots(&student(), 1, &[]).remove(0);
        let slot = commit_slot_edit(slot, LessonEdit::Date(Some("2025-04-01".into())));
        let promoted_id = slot.id().clone();

        let slot = commit_slot_edit(slot, LessonEdit::Date(None));

        assert!(!slot.is_placeholder());
        assert_eq!(slot.id(), &promoted_id);
        assert!(to_persistable(&slot).is_some());
    }

    #[test]
    fn commit_on_real_lesson_keeps_its_id() {
        let lessons = vec![lesson("keep-me", Some("2025-01-01"))];
        let slot = build_slots(&student(), 1, &lessons).remove(0);

        let slot = commit_slot_edit(slot, LessonEdit::Status(LessonStatus::Completed));

        assert_eq!(slot.id().as_str(), "keep-me");
        assert_eq!(slot.lesson().status, LessonStatus::Completed);
    }

    #[test]
    fn commit_ignores_status_none() {
        let slot = build_slots(&student(), 1, &[]).remove(0);
        let slot = commit_slot_edit(slot, LessonEdit::Status(LessonStatus::None));
        assert!(slot.is_placeholder());
        assert_eq!(slot.lesson().status, LessonStatus::Pending);
        assert!(to_persistable(&slot).is_none());

        let lessons = vec![lesson("keep-me", Some("2025-01-01"))];
        let slot = build_slots(&student(), 1, &lessons).remove(0);
        let slot = commit_slot_edit(slot, LessonEdit::Status(LessonStatus::None));
        let stored = to_persistable(&slot).unwrap();
        assert_eq!(stored.status, LessonStatus::Scheduled);
    }

    #[test]
    fn to_persistable_is_none_only_for_placeholders() {
        let lessons = vec![lesson("a", Some("2025-01-01"))];
        let slots = build_slots(&student(), 2, &lessons);

        let stored = to_persistable(&slots[0]).unwrap();
        assert_eq!(stored, lessons[0]);
        assert!(to_persistable(&slots[1]).is_none());
    }

    #[test]
    fn clearing_a_file_on_placeholder_does_not_promote() {
        let slot = build_slots(&student(), 1, &[]).remove(0);

        let slot = select_file(slot, FileKind::Plan, None);
        assert!(slot.is_placeholder());

        let slot = select_file(slot, FileKind::Report, Some("report.pdf".into()));
        assert!(!slot.is_placeholder());
        assert_eq!(slot.lesson().report_file.as_deref(), Some("report.pdf"));
    }

    #[test]
    fn parse_maps_fields_and_clears_on_empty() {
        assert_eq!(
            LessonEdit::parse("plan-review-status", "approved").unwrap(),
            LessonEdit::PlanReviewStatus(Some(PlanReviewStatus::Approved))
        );
        assert_eq!(
            LessonEdit::parse("report_deadline", "").unwrap(),
            LessonEdit::ReportDeadline(None)
        );
        assert_eq!(
            LessonEdit::parse("second_reminder_sent", "yes").unwrap(),
            LessonEdit::SecondReminderSent(true)
        );
        assert_eq!(
            LessonEdit::parse("date", "2025-05-02").unwrap(),
            LessonEdit::Date(Some("2025-05-02".into()))
        );
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(
            LessonEdit::parse("colour", "red").unwrap_err(),
            EditError::UnknownField("colour".into())
        );
        assert!(matches!(
            LessonEdit::parse("status", "NONE").unwrap_err(),
            EditError::InvalidValue { field: "status", .. }
        ));
        assert!(matches!(
            LessonEdit::parse("date", "soon").unwrap_err(),
            EditError::InvalidValue { field: "date", .. }
        ));
        assert!(LessonEdit::parse("first_reminder_sent", "maybe").is_err());
    }
}
