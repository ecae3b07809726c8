use chrono::NaiveDate;
use lms_core::model::LessonStatus;
use lms_core::registration::RegistrationValue;
use lms_core::sheet::FileKind;
use lms_core::time::fixed_clock;
use services::{AppServices, CallParty, SaveOutcome};

#[tokio::test]
async fn sheet_schedule_and_summary_share_one_store() {
    let app = AppServices::new_sqlite(
        "sqlite:file:memdb_sheet_flow?mode=memory&cache=shared",
        fixed_clock(),
    )
    .await
    .expect("open sqlite");
    let roster = app.roster();
    let sheet = app.lesson_sheet();
    let schedule = app.schedule();

    let teacher = roster
        .create_teacher("Jung", "Biology", None)
        .await
        .expect("teacher");
    let mut student = roster
        .create_student("Yoon", Some(teacher.id.clone()))
        .await
        .expect("student");
    student.total_lessons = 4;
    student.re_registration_month = Some("2025-01".into());
    roster.update_student(&student).await.expect("update");

    // Two lessons marked on the calendar, out of order.
    for (day, status) in [
        (NaiveDate::from_ymd_opt(2025, 2, 11).unwrap(), LessonStatus::Completed),
        (NaiveDate::from_ymd_opt(2025, 1, 21).unwrap(), LessonStatus::Completed),
    ] {
        schedule
            .set_day_status(&student.id, day, status)
            .await
            .expect("mark day");
    }

    let slots = sheet.load_sheet(&student.id).await.expect("sheet");
    assert_eq!(slots.len(), 4);
    assert_eq!(slots[0].lesson().date.as_deref(), Some("2025-01-21"));
    assert_eq!(slots[1].lesson().date.as_deref(), Some("2025-02-11"));
    assert!(slots[2].is_placeholder() && slots[3].is_placeholder());

    // Nothing is written for an untouched placeholder.
    assert_eq!(
        sheet.save_slot(&student.id, &slots[2]).await.expect("save"),
        SaveOutcome::Skipped
    );

    // Attaching a plan to a placeholder turns it into a stored lesson.
    let (promoted, outcome) = sheet
        .attach_file_at(&student.id, 3, FileKind::Plan, Some("week3.pdf".into()))
        .await
        .expect("attach");
    assert!(!promoted.is_placeholder());
    assert_eq!(outcome, SaveOutcome::Saved(promoted.id().clone()));

    let slots = sheet.load_sheet(&student.id).await.expect("reload");
    assert_eq!(slots.iter().filter(|s| !s.is_placeholder()).count(), 3);
    // Undated lessons sort after dated ones.
    assert_eq!(slots[2].id(), promoted.id());

    let summary = app
        .summaries()
        .summary(&student.id)
        .await
        .expect("summary");
    assert_eq!(summary.period.to_string(), "25.01 ~ 06");
    assert_eq!(summary.remaining_months, RegistrationValue::Known(4));
    assert_eq!(summary.lessons_completed, 2);
    assert_eq!(summary.remaining_lessons, 2);

    roster
        .record_call(&student.id, CallParty::Student, "prefers mornings")
        .await
        .expect("call log");

    // Removing the teacher keeps the student, removing the student drops lessons.
    assert_eq!(roster.delete_teacher(&teacher.id).await.expect("del teacher"), 1);
    let snapshot = roster.load_roster().await.expect("roster");
    assert_eq!(snapshot.unassigned_students().len(), 1);
    assert_eq!(
        snapshot.student(&student.id).unwrap().student_call_log.as_deref(),
        Some("[2025-03-15]\nprefers mornings")
    );

    assert_eq!(roster.delete_student(&student.id).await.expect("del student"), 3);
    assert!(roster.load_roster().await.expect("roster").students().is_empty());
}
