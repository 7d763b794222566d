use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who an attendance entry is about: exactly one student or exactly
/// one teacher. Teacher entries log delivery of the session rather
/// than a roster check, which is why they are exempt from the
/// once-per-date rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Student(String),
    Teacher(String),
}

impl Subject {
    /// Builds a subject from the optional pair used at the boundary.
    /// Returns `None` when both or neither side is present; callers
    /// surface that as an invalid-subject error.
    pub fn from_parts(student: Option<String>, teacher: Option<String>) -> Option<Subject> {
        let student = student.filter(|s| !s.trim().is_empty());
        let teacher = teacher.filter(|t| !t.trim().is_empty());
        match (student, teacher) {
            (Some(student), None) => Some(Subject::Student(student)),
            (None, Some(teacher)) => Some(Subject::Teacher(teacher)),
            _ => None,
        }
    }

    pub fn student(&self) -> Option<&str> {
        match self {
            Subject::Student(id) => Some(id),
            Subject::Teacher(_) => None,
        }
    }

    pub fn teacher(&self) -> Option<&str> {
        match self {
            Subject::Teacher(id) => Some(id),
            Subject::Student(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Subject::Student(_) => "student",
            Subject::Teacher(_) => "teacher",
        }
    }

    pub fn reference(&self) -> &str {
        match self {
            Subject::Student(id) | Subject::Teacher(id) => id,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.reference())
    }
}

/// One subject's presence outcome for one concrete dated occurrence of
/// a lesson. Immutable once created, except for the description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub lesson_id: i64,
    pub subject: Subject,
    pub date: NaiveDate,
    pub description: String,
    pub recorded_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub const DEFAULT_DESCRIPTION: &'static str = "Present";

    /// Stamps `recorded_at` with the invocation time.
    pub fn new(
        id: i64,
        lesson_id: i64,
        subject: Subject,
        date: NaiveDate,
        description: Option<String>,
    ) -> Self {
        Self {
            id,
            lesson_id,
            subject,
            date,
            description: description.unwrap_or_else(|| Self::DEFAULT_DESCRIPTION.to_string()),
            recorded_at: Utc::now(),
        }
    }
}
