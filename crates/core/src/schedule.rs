//! Day-level lesson scheduling, as driven from the monthly grid and calendar.

use chrono::NaiveDate;

use crate::model::{Lesson, LessonId, LessonStatus};
use crate::registration::YearMonth;

/// What setting a status on a calendar day does to a student's lessons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayStatusChange {
    Created(Lesson),
    Updated(Lesson),
    Deleted(LessonId),
    Unchanged,
}

/// Works out the change for setting `status` on `day`.
///
/// The first lesson falling on `day` is the one affected. `LessonStatus::None`
/// deletes it outright; any other status replaces its status. With no lesson on
/// that day, a real status creates one (with an id from `new_id`), and `None`
/// does nothing.
pub fn plan_day_status(
    lessons: &[Lesson],
    day: NaiveDate,
    status: LessonStatus,
    new_id: impl FnOnce() -> LessonId,
) -> DayStatusChange {
    match lessons.iter().find(|lesson| lesson.day() == Some(day)) {
        Some(existing) if status == LessonStatus::None => {
            DayStatusChange::Deleted(existing.id.clone())
        }
        Some(existing) => {
            let mut updated = existing.clone();
            updated.status = status;
            DayStatusChange::Updated(updated)
        }
        None if status == LessonStatus::None => DayStatusChange::Unchanged,
        None => DayStatusChange::Created(Lesson::on_day(new_id(), day, status)),
    }
}

/// Applies a planned change to an in-memory lesson list.
pub fn apply_day_status(lessons: &mut Vec<Lesson>, change: &DayStatusChange) {
    match change {
        DayStatusChange::Created(lesson) => lessons.push(lesson.clone()),
        DayStatusChange::Updated(lesson) => {
            if let Some(slot) = lessons.iter_mut().find(|l| l.id == lesson.id) {
                *slot = lesson.clone();
            }
        }
        DayStatusChange::Deleted(id) => lessons.retain(|l| &l.id != id),
        DayStatusChange::Unchanged => {}
    }
}

/// Number of completed lessons.
#[must_use]
pub fn lessons_completed(lessons: &[Lesson]) -> u32 {
    let count = lessons.iter().filter(|l| l.is_completed()).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Running number of a completed lesson: how many completed lessons fall on
/// or before it. `None` if the lesson is not completed or has no readable date.
#[must_use]
pub fn completed_ordinal(lessons: &[Lesson], lesson: &Lesson) -> Option<usize> {
    if !lesson.is_completed() {
        return None;
    }
    let at = lesson.scheduled_at()?;
    Some(
        lessons
            .iter()
            .filter(|l| l.is_completed())
            .filter(|l| l.scheduled_at().is_some_and(|other| other <= at))
            .count(),
    )
}

/// Lessons that fall in `month`, earliest first.
#[must_use]
pub fn lessons_in_month(lessons: &[Lesson], month: YearMonth) -> Vec<&Lesson> {
    let mut found: Vec<&Lesson> = lessons
        .iter()
        .filter(|l| l.day().is_some_and(|d| month.contains(d)))
        .collect();
    found.sort_by_key(|l| l.scheduled_at());
    found
}

/// All lessons, newest first; undated lessons last.
#[must_use]
pub fn history(lessons: &[Lesson]) -> Vec<&Lesson> {
    let mut ordered: Vec<&Lesson> = lessons.iter().collect();
    ordered.sort_by_key(|l| {
        let at = l.scheduled_at();
        (at.is_none(), std::cmp::Reverse(at))
    });
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn lesson(id: &str, date: &str, status: LessonStatus) -> Lesson {
        Lesson::new(LessonId::new(id).unwrap(), Some(date.into()), status)
    }

    fn fixed_id() -> LessonId {
        LessonId::new("new").unwrap()
    }

    #[test]
    fn none_on_existing_day_deletes_the_lesson() {
        let mut lessons = vec![
            lesson("a", "2025-03-03", LessonStatus::Scheduled),
            lesson("b", "2025-03-04T09:00:00Z", LessonStatus::Scheduled),
        ];

        let change = plan_day_status(&lessons, day(3, 4), LessonStatus::None, fixed_id);
        assert_eq!(change, DayStatusChange::Deleted(LessonId::new("b").unwrap()));

        apply_day_status(&mut lessons, &change);
        assert_eq!(lessons.len(), 1);
        assert_eq!(lessons[0].id.as_str(), "a");
    }

    #[test]
    fn status_on_existing_day_updates_first_match_only() {
        let mut lessons = vec![
            lesson("a", "2025-03-03", LessonStatus::Scheduled),
            lesson("b", "2025-03-03", LessonStatus::Scheduled),
        ];

        let change = plan_day_status(&lessons, day(3, 3), LessonStatus::Completed, fixed_id);
        apply_day_status(&mut lessons, &change);

        assert_eq!(lessons[0].status, LessonStatus::Completed);
        assert_eq!(lessons[1].status, LessonStatus::Scheduled);
    }

    #[test]
    fn status_on_free_day_creates_a_lesson() {
        let mut lessons = vec![];
        let change = plan_day_status(&lessons, day(5, 9), LessonStatus::Scheduled, fixed_id);

        let DayStatusChange::Created(created) = &change else {
            panic!("expected creation, got {change:?}");
        };
        assert_eq!(created.id.as_str(), "new");
        assert_eq!(created.day(), Some(day(5, 9)));

        apply_day_status(&mut lessons, &change);
        assert_eq!(lessons.len(), 1);
    }

    #[test]
    fn none_on_free_day_is_a_no_op() {
        let change = plan_day_status(&[], day(5, 9), LessonStatus::None, || {
            panic!("no id should be minted")
        });
        assert_eq!(change, DayStatusChange::Unchanged);
    }

    #[test]
    fn completed_ordinal_counts_up_to_the_lesson() {
        let lessons = vec![
            lesson("c", "2025-03-20", LessonStatus::Completed),
            lesson("a", "2025-03-01", LessonStatus::Completed),
            lesson("x", "2025-03-10", LessonStatus::Cancelled),
            lesson("b", "2025-03-12", LessonStatus::Completed),
        ];

        assert_eq!(completed_ordinal(&lessons, &lessons[1]), Some(1));
        assert_eq!(completed_ordinal(&lessons, &lessons[3]), Some(2));
        assert_eq!(completed_ordinal(&lessons, &lessons[0]), Some(3));
        assert_eq!(completed_ordinal(&lessons, &lessons[2]), None);
        assert_eq!(lessons_completed(&lessons), 3);
    }

    #[test]
    fn month_and_history_views() {
        let lessons = vec![
            lesson("apr", "2025-04-02", LessonStatus::Scheduled),
            lesson("mar-late", "2025-03-28", LessonStatus::Scheduled),
            lesson("mar-early", "2025-03-02", LessonStatus::Completed),
            Lesson::new(LessonId::new("undated").unwrap(), None, LessonStatus::Pending),
        ];

        let march: Vec<&str> = lessons_in_month(&lessons, YearMonth::new(2025, 3).unwrap())
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(march, vec!["mar-early", "mar-late"]);

        let newest_first: Vec<&str> = history(&lessons).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(newest_first, vec!["apr", "mar-late", "mar-early", "undated"]);
    }
}
