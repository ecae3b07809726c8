use std::collections::BTreeMap;

use crate::model::{Lesson, Student, StudentId, Teacher, TeacherId};
use crate::registration::parse_renewal_month;
use crate::schedule::lessons_completed;

/// Snapshot of teachers, students and each student's lessons.
///
/// Lessons are grouped per student in the order they were supplied, which is
/// the order the sheet uses to break date ties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    teachers: Vec<Teacher>,
    students: Vec<Student>,
    lessons: BTreeMap<StudentId, Vec<Lesson>>,
}

impl Roster {
    #[must_use]
    pub fn new(
        teachers: Vec<Teacher>,
        students: Vec<Student>,
        lessons: impl IntoIterator<Item = (StudentId, Lesson)>,
    ) -> Self {
        let mut grouped: BTreeMap<StudentId, Vec<Lesson>> = BTreeMap::new();
        for (student_id, lesson) in lessons {
            grouped.entry(student_id).or_default().push(lesson);
        }
        Self {
            teachers,
            students,
            lessons: grouped,
        }
    }

    #[must_use]
    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    #[must_use]
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    #[must_use]
    pub fn teacher(&self, id: &TeacherId) -> Option<&Teacher> {
        self.teachers.iter().find(|t| &t.id == id)
    }

    #[must_use]
    pub fn student(&self, id: &StudentId) -> Option<&Student> {
        self.students.iter().find(|s| &s.id == id)
    }

    #[must_use]
    pub fn lessons_of(&self, id: &StudentId) -> &[Lesson] {
        self.lessons.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    #[must_use]
    pub fn lessons_completed(&self, id: &StudentId) -> u32 {
        lessons_completed(self.lessons_of(id))
    }

    #[must_use]
    pub fn unassigned_students(&self) -> Vec<&Student> {
        self.students.iter().filter(|s| !s.is_assigned()).collect()
    }

    #[must_use]
    pub fn students_of(&self, teacher: &TeacherId) -> Vec<&Student> {
        self.students
            .iter()
            .filter(|s| s.teacher_id.as_ref() == Some(teacher))
            .collect()
    }

    /// Students with a readable renewal month first (soonest first), then
    /// blank, missing or malformed months in roster order.
    #[must_use]
    pub fn by_renewal_month(&self) -> Vec<&Student> {
        let mut ordered: Vec<&Student> = self.students.iter().collect();
        ordered.sort_by_key(|s| {
            let month = parse_renewal_month(s.re_registration_month.as_deref()).into_known();
            (month.is_none(), month)
        });
        ordered
    }

    /// Earliest dated lesson across all of a teacher's students.
    #[must_use]
    pub fn first_lesson_of(&self, teacher: &TeacherId) -> Option<&Lesson> {
        self.students_of(teacher)
            .into_iter()
            .flat_map(|s| self.lessons_of(&s.id))
            .filter(|l| l.scheduled_at().is_some())
            .min_by_key(|l| l.scheduled_at())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LessonId, LessonStatus};

    fn teacher(id: &str) -> Teacher {
        Teacher::new(TeacherId::new(id).unwrap(), format!("Teacher {id}"), "").unwrap()
    }

    fn student(id: &str, teacher: Option<&str>, renewal: Option<&str>) -> Student {
        let mut s = Student::new(StudentId::new(id).unwrap(), format!("Student {id}")).unwrap();
        s.teacher_id = teacher.map(|t| TeacherId::new(t).unwrap());
        s.re_registration_month = renewal.map(str::to_owned);
        s
    }

    fn lesson(student: &str, id: &str, date: &str, status: LessonStatus) -> (StudentId, Lesson) {
        (
            StudentId::new(student).unwrap(),
            Lesson::new(LessonId::new(id).unwrap(), Some(date.into()), status),
        )
    }

    fn roster() -> Roster {
        Roster::new(
            vec![teacher("t1"), teacher("t2")],
            vec![
                student("s1", Some("t1"), None),
                student("s2", Some("t1"), Some("2025-03")),
                student("s3", None, Some("2025-01")),
                student("s4", Some("t2"), None),
            ],
            vec![
                lesson("s1", "l2", "2025-02-01", LessonStatus::Completed),
                lesson("s2", "l3", "2025-01-15", LessonStatus::Scheduled),
                lesson("s1", "l1", "2025-01-20", LessonStatus::Completed),
                lesson("s1", "l4", "2025-02-10", LessonStatus::Cancelled),
            ],
        )
    }

    #[test]
    fn groups_lessons_in_supplied_order() {
        let r = roster();
        let ids: Vec<&str> = r
            .lessons_of(&StudentId::new("s1").unwrap())
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(ids, vec!["l2", "l1", "l4"]);
        assert!(r.lessons_of(&StudentId::new("s4").unwrap()).is_empty());
        assert_eq!(r.lessons_completed(&StudentId::new("s1").unwrap()), 2);
    }

    #[test]
    fn assignment_views() {
        let r = roster();
        let unassigned: Vec<&str> = r
            .unassigned_students()
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(unassigned, vec!["s3"]);
        assert_eq!(r.students_of(&TeacherId::new("t1").unwrap()).len(), 2);
    }

    #[test]
    fn renewal_order_puts_unset_last() {
        let r = roster();
        let order: Vec<&str> = r.by_renewal_month().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["s3", "s2", "s1", "s4"]);
    }

    #[test]
    fn renewal_order_reads_months_not_text() {
        let r = Roster::new(
            vec![],
            vec![
                student("blank", None, Some("")),
                student("oct", None, Some("2025-10")),
                student("bad", None, Some("2025/01")),
                student("mar", None, Some("2025-3")),
                student("none", None, None),
            ],
            vec![],
        );
        let order: Vec<&str> = r.by_renewal_month().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["mar", "oct", "blank", "bad", "none"]);
    }

    #[test]
    fn first_lesson_spans_all_students_of_teacher() {
        let r = roster();
        let first = r.first_lesson_of(&TeacherId::new("t1").unwrap()).unwrap();
        assert_eq!(first.id.as_str(), "l3");
        assert!(r.first_lesson_of(&TeacherId::new("t2").unwrap()).is_none());
    }
}
