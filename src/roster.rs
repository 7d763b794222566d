use crate::attendance::{AttendanceRecord, Subject};
use crate::calendar::{SchoolDay, normalize_days, resolve_school_day};
use crate::lesson::{LessonDraft, LessonPatch, LessonStatus, LessonTemplate};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RosterError {
    MissingField(&'static str),
    InvalidTimeWindow {
        start: NaiveTime,
        end: NaiveTime,
    },
    LessonNotFound(i64),
    AttendanceNotFound(i64),
    InvalidSubject,
    DayMismatch {
        lesson_id: i64,
        date: NaiveDate,
        day: SchoolDay,
    },
    DuplicateAttendance {
        lesson_id: i64,
        student: String,
        date: NaiveDate,
    },
    MismatchedLesson {
        lesson_id: i64,
        attendance_id: i64,
    },
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::MissingField(field) => {
                write!(f, "required field '{field}' is missing")
            }
            RosterError::InvalidTimeWindow { start, end } => {
                write!(f, "lesson start {start} must be strictly before end {end}")
            }
            RosterError::LessonNotFound(id) => write!(f, "lesson {id} not found"),
            RosterError::AttendanceNotFound(id) => {
                write!(f, "attendance record {id} not found")
            }
            RosterError::InvalidSubject => {
                write!(f, "attendance subject must name exactly one student or teacher")
            }
            RosterError::DayMismatch {
                lesson_id,
                date,
                day,
            } => write!(f, "lesson {lesson_id} does not recur on {day} ({date})"),
            RosterError::DuplicateAttendance {
                lesson_id,
                student,
                date,
            } => write!(
                f,
                "attendance for student '{student}' on {date} is already recorded for lesson {lesson_id}"
            ),
            RosterError::MismatchedLesson {
                lesson_id,
                attendance_id,
            } => write!(
                f,
                "attendance record {attendance_id} does not belong to lesson {lesson_id}"
            ),
        }
    }
}

impl std::error::Error for RosterError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSummary {
    pub lesson_count: usize,
    pub scheduled_count: usize,
    pub attendance_count: usize,
}

impl RosterSummary {
    pub fn to_cli_summary(&self) -> String {
        format!(
            "lessons={}, scheduled={}, attendance={}",
            self.lesson_count, self.scheduled_count, self.attendance_count
        )
    }
}

/// The in-memory roster: every lesson template and attendance record,
/// plus the id counters for both. All domain operations live here;
/// persistence layers snapshot and restore the whole structure.
#[derive(Debug, Clone)]
pub struct Roster {
    lessons: BTreeMap<i64, LessonTemplate>,
    records: BTreeMap<i64, AttendanceRecord>,
    next_lesson_id: i64,
    next_record_id: i64,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

impl Roster {
    pub fn new() -> Self {
        Self {
            lessons: BTreeMap::new(),
            records: BTreeMap::new(),
            next_lesson_id: 1,
            next_record_id: 1,
        }
    }

    pub(crate) fn from_parts(
        lessons: Vec<LessonTemplate>,
        records: Vec<AttendanceRecord>,
    ) -> Self {
        let next_lesson_id = lessons.iter().map(|l| l.id).max().unwrap_or(0) + 1;
        let next_record_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Self {
            lessons: lessons.into_iter().map(|l| (l.id, l)).collect(),
            records: records.into_iter().map(|r| (r.id, r)).collect(),
            next_lesson_id,
            next_record_id,
        }
    }

    /// Restore with explicit id counters (never below what the data
    /// itself requires), so reloaded rosters do not reuse ids.
    pub(crate) fn from_parts_with_ids(
        lessons: Vec<LessonTemplate>,
        records: Vec<AttendanceRecord>,
        next_lesson_id: i64,
        next_record_id: i64,
    ) -> Self {
        let mut roster = Self::from_parts(lessons, records);
        roster.next_lesson_id = roster.next_lesson_id.max(next_lesson_id);
        roster.next_record_id = roster.next_record_id.max(next_record_id);
        roster
    }

    pub(crate) fn next_ids(&self) -> (i64, i64) {
        (self.next_lesson_id, self.next_record_id)
    }

    pub fn lessons(&self) -> Vec<LessonTemplate> {
        self.lessons.values().cloned().collect()
    }

    pub fn find_lesson(&self, lesson_id: i64) -> Option<LessonTemplate> {
        self.lessons.get(&lesson_id).cloned()
    }

    pub fn attendance(&self) -> Vec<AttendanceRecord> {
        self.records.values().cloned().collect()
    }

    pub fn find_attendance(&self, attendance_id: i64) -> Option<AttendanceRecord> {
        self.records.get(&attendance_id).cloned()
    }

    pub fn summary(&self) -> RosterSummary {
        RosterSummary {
            lesson_count: self.lessons.len(),
            scheduled_count: self
                .lessons
                .values()
                .filter(|l| l.status == LessonStatus::Scheduled)
                .count(),
            attendance_count: self.records.len(),
        }
    }

    fn validate_window(start: NaiveTime, end: NaiveTime) -> Result<(), RosterError> {
        if start >= end {
            return Err(RosterError::InvalidTimeWindow { start, end });
        }
        Ok(())
    }

    pub fn add_lesson(&mut self, draft: LessonDraft) -> Result<LessonTemplate, RosterError> {
        if draft.teacher.trim().is_empty() {
            return Err(RosterError::MissingField("teacher"));
        }
        if draft.room.trim().is_empty() {
            return Err(RosterError::MissingField("room"));
        }
        let starts_at = draft.starts_at.ok_or(RosterError::MissingField("starts_at"))?;
        let ends_at = draft.ends_at.ok_or(RosterError::MissingField("ends_at"))?;
        Self::validate_window(starts_at, ends_at)?;

        let id = self.next_lesson_id;
        let mut lesson = LessonTemplate::new(id, draft.teacher, starts_at, ends_at, draft.room);
        lesson.group = draft.group.filter(|g| !g.trim().is_empty());
        lesson.days = normalize_days(draft.days);
        lesson.description = draft.description;
        self.next_lesson_id += 1;
        self.lessons.insert(id, lesson.clone());
        Ok(lesson)
    }

    /// Merge-applies `patch`; fields it leaves unset keep their current
    /// values. The time-window invariant is checked on the merged
    /// result, so moving either bound past the other is rejected.
    pub fn update_lesson(
        &mut self,
        lesson_id: i64,
        patch: LessonPatch,
    ) -> Result<LessonTemplate, RosterError> {
        let Some(existing) = self.lessons.get(&lesson_id) else {
            return Err(RosterError::LessonNotFound(lesson_id));
        };
        let mut updated = existing.clone();
        if let Some(teacher) = patch.teacher {
            if teacher.trim().is_empty() {
                return Err(RosterError::MissingField("teacher"));
            }
            updated.teacher = teacher;
        }
        if let Some(group) = patch.group {
            updated.group = Some(group);
        }
        if let Some(days) = patch.days {
            updated.days = normalize_days(days);
        }
        if let Some(starts_at) = patch.starts_at {
            updated.starts_at = starts_at;
        }
        if let Some(ends_at) = patch.ends_at {
            updated.ends_at = ends_at;
        }
        if let Some(room) = patch.room {
            if room.trim().is_empty() {
                return Err(RosterError::MissingField("room"));
            }
            updated.room = room;
        }
        if let Some(description) = patch.description {
            updated.description = description;
        }
        if let Some(status) = patch.status {
            updated.status = status;
        }
        Self::validate_window(updated.starts_at, updated.ends_at)?;
        self.lessons.insert(lesson_id, updated.clone());
        Ok(updated)
    }

    /// Scheduled templates recurring on the resolved weekday of `date`,
    /// ordered by start time, then id for determinism.
    pub fn lessons_on(&self, date: NaiveDate) -> Vec<LessonTemplate> {
        let day = resolve_school_day(date);
        let mut matches: Vec<LessonTemplate> = self
            .lessons
            .values()
            .filter(|l| l.status == LessonStatus::Scheduled && l.recurs_on(day))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then(a.id.cmp(&b.id)));
        matches
    }

    /// Removes a template and everything recorded against it. The
    /// dependent attendance goes first; the template row is only
    /// dropped once no record references it. Returns the purge count.
    pub fn remove_lesson(&mut self, lesson_id: i64) -> Result<usize, RosterError> {
        if !self.lessons.contains_key(&lesson_id) {
            return Err(RosterError::LessonNotFound(lesson_id));
        }
        let purged = self.purge_for_lesson(lesson_id);
        self.lessons.remove(&lesson_id);
        Ok(purged)
    }

    pub fn record_attendance(
        &mut self,
        lesson_id: i64,
        subject: Subject,
        date: NaiveDate,
        description: Option<String>,
    ) -> Result<AttendanceRecord, RosterError> {
        let Some(lesson) = self.lessons.get(&lesson_id) else {
            return Err(RosterError::LessonNotFound(lesson_id));
        };
        let day = resolve_school_day(date);
        if !lesson.recurs_on(day) {
            return Err(RosterError::DayMismatch {
                lesson_id,
                date,
                day,
            });
        }
        // Only student marks are unique per (lesson, date); a teacher
        // mark logs session delivery and may repeat.
        if let Some(student) = subject.student() {
            let duplicate = self.records.values().any(|r| {
                r.lesson_id == lesson_id && r.date == date && r.subject.student() == Some(student)
            });
            if duplicate {
                return Err(RosterError::DuplicateAttendance {
                    lesson_id,
                    student: student.to_string(),
                    date,
                });
            }
        }
        let id = self.next_record_id;
        self.next_record_id += 1;
        let record = AttendanceRecord::new(id, lesson_id, subject, date, description);
        self.records.insert(id, record.clone());
        Ok(record)
    }

    /// `lesson_id` must match the record's owner; a mismatch means the
    /// caller mixed up path and body identifiers and nothing is deleted.
    pub fn delete_attendance(
        &mut self,
        lesson_id: i64,
        attendance_id: i64,
    ) -> Result<(), RosterError> {
        let Some(record) = self.records.get(&attendance_id) else {
            return Err(RosterError::AttendanceNotFound(attendance_id));
        };
        if record.lesson_id != lesson_id {
            return Err(RosterError::MismatchedLesson {
                lesson_id,
                attendance_id,
            });
        }
        self.records.remove(&attendance_id);
        Ok(())
    }

    /// Drops every record owned by `lesson_id`. Idempotent: purging a
    /// lesson with no records succeeds with a count of zero.
    pub fn purge_for_lesson(&mut self, lesson_id: i64) -> usize {
        let before = self.records.len();
        self.records.retain(|_, r| r.lesson_id != lesson_id);
        before - self.records.len()
    }

    /// Records dated exactly `date`, newest first (recorded_at, then id
    /// descending so equal timestamps stay deterministic).
    pub fn attendance_on(&self, date: NaiveDate) -> Vec<AttendanceRecord> {
        let mut matches: Vec<AttendanceRecord> = self
            .records
            .values()
            .filter(|r| r.date == date)
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            b.recorded_at
                .cmp(&a.recorded_at)
                .then(b.id.cmp(&a.id))
        });
        matches
    }

    /// The description is the one mutable field of a stored record.
    pub fn set_attendance_description(
        &mut self,
        attendance_id: i64,
        description: impl Into<String>,
    ) -> Result<AttendanceRecord, RosterError> {
        let Some(record) = self.records.get_mut(&attendance_id) else {
            return Err(RosterError::AttendanceNotFound(attendance_id));
        };
        record.description = description.into();
        Ok(record.clone())
    }
}
