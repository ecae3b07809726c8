use chrono::{Days, NaiveDate};
use lms_core::model::{LessonStatus, RegistrationStatus};
use services::AppServices;

/// Inserts two teachers, three students and a few weeks of lessons.
pub async fn seed_demo(app: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let roster = app.roster();
    let schedule = app.schedule();
    let today = app.clock().today();

    let kim = roster
        .create_teacher("Kim Minji", "Mathematics", Some("010-2345-6789"))
        .await?;
    let lee = roster.create_teacher("Lee Jun", "English", None).await?;

    let plan = [
        ("Park Seo", Some(&kim), Some("2025-01"), 4_u64),
        ("Choi Ha", Some(&lee), Some("2024-11"), 2),
        ("Jung Woo", None, None, 0),
    ];
    for (name, teacher, renewal, weeks) in plan {
        let mut student = roster
            .create_student(name, teacher.map(|t| t.id.clone()))
            .await?;
        student.re_registration_month = renewal.map(str::to_owned);
        student.registration_status = Some(if teacher.is_some() {
            RegistrationStatus::Registered
        } else {
            RegistrationStatus::Consulting
        });
        roster.update_student(&student).await?;

        for week in 0..weeks {
            let Some(day) = weeks_before(today, weeks - week) else {
                continue;
            };
            schedule
                .set_day_status(&student.id, day, LessonStatus::Completed)
                .await?;
        }
        let next = today.checked_add_days(Days::new(7)).filter(|_| weeks > 0);
        if let Some(next) = next {
            schedule
                .set_day_status(&student.id, next, LessonStatus::Scheduled)
                .await?;
        }
        println!("{}\t{}", student.id, student.name);
    }
    Ok(())
}

fn weeks_before(today: NaiveDate, weeks: u64) -> Option<NaiveDate> {
    today.checked_sub_days(Days::new(weeks * 7))
}
