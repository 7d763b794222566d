#![cfg(feature = "sqlite")]

use chrono::{NaiveDate, NaiveTime};
use roster_tool::{
    AttendanceRecord, LessonDraft, PersistenceError, Roster, RosterStore, SchoolDay,
    SqliteRosterStore, Subject,
};
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(h: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, min, 0).unwrap()
}

fn sample_roster() -> Roster {
    let mut roster = Roster::new();
    let first = roster
        .add_lesson(LessonDraft {
            teacher: "t-1".to_string(),
            room: "R1".to_string(),
            starts_at: Some(t(9, 0)),
            ends_at: Some(t(10, 0)),
            days: vec![SchoolDay::Monday],
            ..LessonDraft::default()
        })
        .expect("first lesson");
    roster
        .add_lesson(LessonDraft {
            teacher: "t-2".to_string(),
            room: "R2".to_string(),
            starts_at: Some(t(10, 0)),
            ends_at: Some(t(11, 0)),
            days: vec![SchoolDay::Tuesday],
            ..LessonDraft::default()
        })
        .expect("second lesson");
    roster
        .record_attendance(
            first.id,
            Subject::Student("s-1".to_string()),
            d(2024, 3, 4),
            None,
        )
        .expect("mark");
    roster
}

#[test]
fn sqlite_store_round_trips_the_roster() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteRosterStore::new(file.path()).unwrap();

    let roster = sample_roster();
    store.save_roster(&roster).expect("save roster");

    let mut loaded = store
        .load_roster()
        .expect("load roster")
        .expect("roster exists");

    assert_eq!(loaded.lessons(), roster.lessons());
    assert_eq!(loaded.attendance(), roster.attendance());

    // Id counters survive the round trip, so new rows never collide.
    let lesson = loaded
        .add_lesson(LessonDraft {
            teacher: "t-3".to_string(),
            room: "R3".to_string(),
            starts_at: Some(t(12, 0)),
            ends_at: Some(t(13, 0)),
            ..LessonDraft::default()
        })
        .expect("new lesson");
    assert_eq!(lesson.id, 3);
}

#[test]
fn empty_store_loads_nothing() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteRosterStore::new(file.path()).unwrap();
    assert!(store.load_roster().expect("load").is_none());
}

#[test]
fn append_attendance_rejects_a_duplicate_student_row() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteRosterStore::new(file.path()).unwrap();
    store.save_roster(&sample_roster()).expect("save roster");

    // Same (lesson, student, date) as the stored mark, fresh id.
    let duplicate = AttendanceRecord::new(
        7,
        1,
        Subject::Student("s-1".to_string()),
        d(2024, 3, 4),
        None,
    );
    let err = store.append_attendance(&duplicate).unwrap_err();
    assert!(matches!(err, PersistenceError::Duplicate(_)));

    // Exactly one row survives for that student and date.
    let loaded = store.load_roster().expect("load").expect("roster exists");
    let marks: Vec<_> = loaded
        .attendance()
        .into_iter()
        .filter(|r| r.subject == Subject::Student("s-1".to_string()) && r.date == d(2024, 3, 4))
        .collect();
    assert_eq!(marks.len(), 1);
}

#[test]
fn append_attendance_accepts_repeated_teacher_rows() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteRosterStore::new(file.path()).unwrap();
    store.save_roster(&sample_roster()).expect("save roster");

    let first = AttendanceRecord::new(
        10,
        1,
        Subject::Teacher("t-1".to_string()),
        d(2024, 3, 4),
        None,
    );
    let second = AttendanceRecord::new(
        11,
        1,
        Subject::Teacher("t-1".to_string()),
        d(2024, 3, 4),
        Some("Covered".to_string()),
    );
    store.append_attendance(&first).expect("first teacher row");
    store.append_attendance(&second).expect("second teacher row");
}

#[test]
fn remove_lesson_drops_dependent_attendance_in_one_step() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteRosterStore::new(file.path()).unwrap();
    store.save_roster(&sample_roster()).expect("save roster");

    assert!(store.remove_lesson(1).expect("remove"));
    assert!(!store.remove_lesson(1).expect("second remove is a no-op"));

    let loaded = store.load_roster().expect("load").expect("roster exists");
    assert!(loaded.find_lesson(1).is_none());
    assert!(loaded.find_lesson(2).is_some());
    assert!(
        loaded.attendance().iter().all(|r| r.lesson_id != 1),
        "attendance for the removed lesson must be gone"
    );
}
