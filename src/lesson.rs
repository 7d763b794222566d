use crate::calendar::SchoolDay;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl LessonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonStatus::Scheduled => "scheduled",
            LessonStatus::Completed => "completed",
            LessonStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(value: &str) -> Option<LessonStatus> {
        match value.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Some(LessonStatus::Scheduled),
            "completed" => Some(LessonStatus::Completed),
            "cancelled" => Some(LessonStatus::Cancelled),
            _ => None,
        }
    }

    pub fn variants() -> [&'static str; 3] {
        ["scheduled", "completed", "cancelled"]
    }
}

impl fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recurring class slot. The template recurs on its day set within
/// the start/end window; concrete dates are never materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonTemplate {
    pub id: i64,
    pub teacher: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub days: Vec<SchoolDay>,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub room: String,
    #[serde(default)]
    pub description: String,
    pub status: LessonStatus,
}

impl LessonTemplate {
    pub fn new(
        id: i64,
        teacher: impl Into<String>,
        starts_at: NaiveTime,
        ends_at: NaiveTime,
        room: impl Into<String>,
    ) -> Self {
        Self {
            id,
            teacher: teacher.into(),
            group: None,
            days: Vec::new(),
            starts_at,
            ends_at,
            room: room.into(),
            description: String::new(),
            status: LessonStatus::Scheduled,
        }
    }

    /// True when the template recurs on `day`. An empty day set
    /// matches no day at all.
    pub fn recurs_on(&self, day: SchoolDay) -> bool {
        self.days.contains(&day)
    }
}

/// Creation payload. Times are optional so that their absence at the
/// boundary reaches the domain as a missing-field error rather than a
/// deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonDraft {
    pub teacher: String,
    pub group: Option<String>,
    pub days: Vec<SchoolDay>,
    pub starts_at: Option<NaiveTime>,
    pub ends_at: Option<NaiveTime>,
    pub room: String,
    pub description: String,
}

/// Partial update payload; unset fields leave the template unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonPatch {
    pub teacher: Option<String>,
    pub group: Option<String>,
    pub days: Option<Vec<SchoolDay>>,
    pub starts_at: Option<NaiveTime>,
    pub ends_at: Option<NaiveTime>,
    pub room: Option<String>,
    pub description: Option<String>,
    pub status: Option<LessonStatus>,
}
