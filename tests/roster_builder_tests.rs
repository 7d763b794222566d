use chrono::{NaiveDate, NaiveTime};
use roster_tool::{
    LessonDraft, LessonPatch, LessonStatus, Roster, RosterError, SchoolDay,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(h: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, min, 0).unwrap()
}

fn draft(teacher: &str, room: &str, start: NaiveTime, end: NaiveTime, days: &[SchoolDay]) -> LessonDraft {
    LessonDraft {
        teacher: teacher.to_string(),
        room: room.to_string(),
        starts_at: Some(start),
        ends_at: Some(end),
        days: days.to_vec(),
        ..LessonDraft::default()
    }
}

#[test]
fn add_lesson_assigns_sequential_ids_and_defaults() {
    let mut roster = Roster::new();
    let first = roster
        .add_lesson(draft("t-1", "R1", t(9, 0), t(10, 0), &[SchoolDay::Monday]))
        .expect("first lesson");
    let second = roster
        .add_lesson(draft("t-2", "R2", t(10, 0), t(11, 0), &[]))
        .expect("second lesson");

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(first.status, LessonStatus::Scheduled);
    assert_eq!(first.group, None);
    assert!(second.days.is_empty());
    assert_eq!(roster.lessons().len(), 2);
}

#[test]
fn add_lesson_normalizes_the_day_set() {
    let mut roster = Roster::new();
    let lesson = roster
        .add_lesson(draft(
            "t-1",
            "R1",
            t(9, 0),
            t(10, 0),
            &[SchoolDay::Wednesday, SchoolDay::Monday, SchoolDay::Wednesday],
        ))
        .expect("lesson");
    assert_eq!(lesson.days, vec![SchoolDay::Monday, SchoolDay::Wednesday]);
}

#[test]
fn add_lesson_requires_teacher_room_and_window() {
    let mut roster = Roster::new();

    let missing_teacher = roster.add_lesson(draft("  ", "R1", t(9, 0), t(10, 0), &[]));
    assert_eq!(missing_teacher, Err(RosterError::MissingField("teacher")));

    let missing_room = roster.add_lesson(draft("t-1", "", t(9, 0), t(10, 0), &[]));
    assert_eq!(missing_room, Err(RosterError::MissingField("room")));

    let mut no_start = draft("t-1", "R1", t(9, 0), t(10, 0), &[]);
    no_start.starts_at = None;
    assert_eq!(
        roster.add_lesson(no_start),
        Err(RosterError::MissingField("starts_at"))
    );

    assert!(roster.lessons().is_empty());
}

#[test]
fn inverted_window_is_rejected_and_nothing_persisted() {
    let mut roster = Roster::new();
    let result = roster.add_lesson(draft("t-1", "R1", t(11, 0), t(10, 0), &[]));
    assert!(matches!(
        result,
        Err(RosterError::InvalidTimeWindow { .. })
    ));
    // Equal bounds are an empty window, rejected the same way.
    let result = roster.add_lesson(draft("t-1", "R1", t(10, 0), t(10, 0), &[]));
    assert!(matches!(
        result,
        Err(RosterError::InvalidTimeWindow { .. })
    ));
    assert!(roster.lessons().is_empty());
}

#[test]
fn update_merges_partial_fields() {
    let mut roster = Roster::new();
    let lesson = roster
        .add_lesson(draft("t-1", "R1", t(9, 0), t(10, 0), &[SchoolDay::Monday]))
        .expect("lesson");

    let patch = LessonPatch {
        room: Some("R9".to_string()),
        ..LessonPatch::default()
    };
    let updated = roster.update_lesson(lesson.id, patch).expect("update");

    assert_eq!(updated.room, "R9");
    assert_eq!(updated.teacher, "t-1");
    assert_eq!(updated.days, vec![SchoolDay::Monday]);
    assert_eq!(updated.starts_at, t(9, 0));
    assert_eq!(updated.status, LessonStatus::Scheduled);
}

#[test]
fn update_unknown_lesson_fails() {
    let mut roster = Roster::new();
    let result = roster.update_lesson(42, LessonPatch::default());
    assert_eq!(result, Err(RosterError::LessonNotFound(42)));
}

#[test]
fn update_revalidates_the_window() {
    let mut roster = Roster::new();
    let lesson = roster
        .add_lesson(draft("t-1", "R1", t(9, 0), t(10, 0), &[]))
        .expect("lesson");

    let patch = LessonPatch {
        ends_at: Some(t(8, 0)),
        ..LessonPatch::default()
    };
    let result = roster.update_lesson(lesson.id, patch);
    assert!(matches!(
        result,
        Err(RosterError::InvalidTimeWindow { .. })
    ));

    // Rejected patch must leave the stored lesson untouched.
    let stored = roster.find_lesson(lesson.id).expect("still present");
    assert_eq!(stored.ends_at, t(10, 0));
}

#[test]
fn update_cannot_blank_the_teacher() {
    let mut roster = Roster::new();
    let lesson = roster
        .add_lesson(draft("t-1", "R1", t(9, 0), t(10, 0), &[]))
        .expect("lesson");
    let patch = LessonPatch {
        teacher: Some("  ".to_string()),
        ..LessonPatch::default()
    };
    assert_eq!(
        roster.update_lesson(lesson.id, patch),
        Err(RosterError::MissingField("teacher"))
    );
}

#[test]
fn lessons_on_matches_recurring_days_only() {
    let mut roster = Roster::new();
    let lesson = roster
        .add_lesson(draft(
            "t-1",
            "R1",
            t(9, 0),
            t(10, 0),
            &[SchoolDay::Monday, SchoolDay::Wednesday],
        ))
        .expect("lesson");

    let monday = roster.lessons_on(d(2024, 3, 4));
    let wednesday = roster.lessons_on(d(2024, 3, 6));
    let tuesday = roster.lessons_on(d(2024, 3, 5));

    assert_eq!(monday.len(), 1);
    assert_eq!(monday[0].id, lesson.id);
    assert_eq!(wednesday.len(), 1);
    assert!(tuesday.is_empty());
}

#[test]
fn empty_day_set_matches_no_date() {
    let mut roster = Roster::new();
    roster
        .add_lesson(draft("t-1", "R1", t(9, 0), t(10, 0), &[]))
        .expect("lesson");
    // A full week, Sunday included.
    for day in 3..=9 {
        assert!(roster.lessons_on(d(2024, 3, day)).is_empty());
    }
}

#[test]
fn lessons_on_excludes_completed_and_cancelled_templates() {
    let mut roster = Roster::new();
    let active = roster
        .add_lesson(draft("t-1", "R1", t(9, 0), t(10, 0), &[SchoolDay::Monday]))
        .expect("active");
    let done = roster
        .add_lesson(draft("t-2", "R2", t(10, 0), t(11, 0), &[SchoolDay::Monday]))
        .expect("done");
    let dropped = roster
        .add_lesson(draft("t-3", "R3", t(11, 0), t(12, 0), &[SchoolDay::Monday]))
        .expect("dropped");

    roster
        .update_lesson(
            done.id,
            LessonPatch {
                status: Some(LessonStatus::Completed),
                ..LessonPatch::default()
            },
        )
        .expect("complete");
    roster
        .update_lesson(
            dropped.id,
            LessonPatch {
                status: Some(LessonStatus::Cancelled),
                ..LessonPatch::default()
            },
        )
        .expect("cancel");

    let monday = roster.lessons_on(d(2024, 3, 4));
    assert_eq!(monday.len(), 1);
    assert_eq!(monday[0].id, active.id);
}

#[test]
fn lessons_on_orders_by_start_time_then_id() {
    let mut roster = Roster::new();
    let late = roster
        .add_lesson(draft("t-1", "R1", t(14, 0), t(15, 0), &[SchoolDay::Friday]))
        .expect("late");
    let early = roster
        .add_lesson(draft("t-2", "R2", t(9, 0), t(10, 0), &[SchoolDay::Friday]))
        .expect("early");
    let early_twin = roster
        .add_lesson(draft("t-3", "R3", t(9, 0), t(10, 0), &[SchoolDay::Friday]))
        .expect("early twin");

    let friday: Vec<i64> = roster
        .lessons_on(d(2024, 3, 8))
        .iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(friday, vec![early.id, early_twin.id, late.id]);
}

#[test]
fn sunday_query_returns_monday_lessons() {
    let mut roster = Roster::new();
    let monday_lesson = roster
        .add_lesson(draft("t-1", "R1", t(9, 0), t(10, 0), &[SchoolDay::Monday]))
        .expect("monday lesson");
    roster
        .add_lesson(draft("t-2", "R2", t(9, 0), t(10, 0), &[SchoolDay::Saturday]))
        .expect("saturday lesson");

    // 2024-03-03 is a Sunday; the query addresses Monday's schedule.
    let sunday = roster.lessons_on(d(2024, 3, 3));
    assert_eq!(sunday.len(), 1);
    assert_eq!(sunday[0].id, monday_lesson.id);
}

#[test]
fn remove_lesson_requires_an_existing_template() {
    let mut roster = Roster::new();
    assert_eq!(roster.remove_lesson(7), Err(RosterError::LessonNotFound(7)));
}
