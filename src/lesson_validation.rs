use crate::attendance::AttendanceRecord;
use crate::calendar::resolve_school_day;
use crate::lesson::LessonTemplate;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone)]
pub struct LessonValidationError {
    message: String,
}

impl LessonValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for LessonValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LessonValidationError {}

pub fn validate_lesson(lesson: &LessonTemplate) -> Result<(), LessonValidationError> {
    if lesson.teacher.trim().is_empty() {
        return Err(LessonValidationError::new(format!(
            "lesson {} requires a teacher reference",
            lesson.id
        )));
    }
    if lesson.room.trim().is_empty() {
        return Err(LessonValidationError::new(format!(
            "lesson {} requires a room",
            lesson.id
        )));
    }
    if lesson.starts_at >= lesson.ends_at {
        return Err(LessonValidationError::new(format!(
            "lesson {} start {} must precede end {}",
            lesson.id, lesson.starts_at, lesson.ends_at
        )));
    }
    let mut seen_days = HashSet::with_capacity(lesson.days.len());
    for day in &lesson.days {
        if !seen_days.insert(*day) {
            return Err(LessonValidationError::new(format!(
                "lesson {} lists {} more than once",
                lesson.id, day
            )));
        }
    }
    Ok(())
}

pub fn validate_lesson_collection(
    lessons: &[LessonTemplate],
) -> Result<(), LessonValidationError> {
    let mut seen_ids = HashSet::with_capacity(lessons.len());
    for lesson in lessons {
        if !seen_ids.insert(lesson.id) {
            return Err(LessonValidationError::new(format!(
                "duplicate lesson id {}",
                lesson.id
            )));
        }
        validate_lesson(lesson)?;
    }
    Ok(())
}

/// Referential checks for a full attendance set against its lessons:
/// every record's owner must exist, its date must fall on one of the
/// owner's recurring days, and no student may appear twice for the
/// same (lesson, date).
pub fn validate_attendance_collection(
    records: &[AttendanceRecord],
    lessons: &[LessonTemplate],
) -> Result<(), LessonValidationError> {
    let by_id: HashMap<i64, &LessonTemplate> = lessons.iter().map(|l| (l.id, l)).collect();
    let mut seen_ids = HashSet::with_capacity(records.len());
    let mut seen_marks: HashSet<(i64, &str, NaiveDate)> = HashSet::new();
    for record in records {
        if !seen_ids.insert(record.id) {
            return Err(LessonValidationError::new(format!(
                "duplicate attendance id {}",
                record.id
            )));
        }
        let Some(lesson) = by_id.get(&record.lesson_id) else {
            return Err(LessonValidationError::new(format!(
                "attendance {} references missing lesson {}",
                record.id, record.lesson_id
            )));
        };
        let day = resolve_school_day(record.date);
        if !lesson.recurs_on(day) {
            return Err(LessonValidationError::new(format!(
                "attendance {} dated {} falls on {}, not a recurring day of lesson {}",
                record.id, record.date, day, lesson.id
            )));
        }
        if let Some(student) = record.subject.student() {
            if !seen_marks.insert((record.lesson_id, student, record.date)) {
                return Err(LessonValidationError::new(format!(
                    "student '{}' is recorded twice for lesson {} on {}",
                    student, record.lesson_id, record.date
                )));
            }
        }
    }
    Ok(())
}
