use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A weekday on which a lesson can recur. The centre runs no Sunday
/// sessions, so Sunday has no variant here; see [`resolve_school_day`]
/// for how Sunday dates are handled at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SchoolDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl SchoolDay {
    pub const ALL: [SchoolDay; 6] = [
        SchoolDay::Monday,
        SchoolDay::Tuesday,
        SchoolDay::Wednesday,
        SchoolDay::Thursday,
        SchoolDay::Friday,
        SchoolDay::Saturday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchoolDay::Monday => "Mon",
            SchoolDay::Tuesday => "Tue",
            SchoolDay::Wednesday => "Wed",
            SchoolDay::Thursday => "Thu",
            SchoolDay::Friday => "Fri",
            SchoolDay::Saturday => "Sat",
        }
    }

    pub fn from_str(value: &str) -> Option<SchoolDay> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mon" | "monday" => Some(SchoolDay::Monday),
            "tue" | "tuesday" => Some(SchoolDay::Tuesday),
            "wed" | "wednesday" => Some(SchoolDay::Wednesday),
            "thu" | "thursday" => Some(SchoolDay::Thursday),
            "fri" | "friday" => Some(SchoolDay::Friday),
            "sat" | "saturday" => Some(SchoolDay::Saturday),
            _ => None,
        }
    }

    /// Position within the Monday-first week, used for stable ordering.
    pub fn num_from_monday(&self) -> u8 {
        match self {
            SchoolDay::Monday => 0,
            SchoolDay::Tuesday => 1,
            SchoolDay::Wednesday => 2,
            SchoolDay::Thursday => 3,
            SchoolDay::Friday => 4,
            SchoolDay::Saturday => 5,
        }
    }
}

impl fmt::Display for SchoolDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    InvalidDate(String),
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarError::InvalidDate(input) => {
                write!(f, "invalid date '{input}' (expected YYYY-MM-DD)")
            }
        }
    }
}

impl std::error::Error for CalendarError {}

/// The date whose schedule a query for `date` actually addresses.
/// Sunday dates shift to the following Monday; every other date is
/// returned unchanged.
pub fn effective_session_date(date: NaiveDate) -> NaiveDate {
    if date.weekday() == Weekday::Sun {
        date + Duration::days(1)
    } else {
        date
    }
}

/// Maps a calendar date to the weekday used for recurrence matching.
pub fn resolve_school_day(date: NaiveDate) -> SchoolDay {
    match effective_session_date(date).weekday() {
        Weekday::Mon => SchoolDay::Monday,
        Weekday::Tue => SchoolDay::Tuesday,
        Weekday::Wed => SchoolDay::Wednesday,
        Weekday::Thu => SchoolDay::Thursday,
        Weekday::Fri => SchoolDay::Friday,
        Weekday::Sat => SchoolDay::Saturday,
        // The shift above turns Sunday into the following Monday.
        Weekday::Sun => SchoolDay::Monday,
    }
}

/// Parses a boundary date string (`YYYY-MM-DD`). Every untyped date
/// entering the crate passes through here.
pub fn parse_civil_date(input: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| CalendarError::InvalidDate(input.trim().to_string()))
}

/// Sorts a day set Monday-first and drops duplicate entries.
pub(crate) fn normalize_days(mut days: Vec<SchoolDay>) -> Vec<SchoolDay> {
    days.sort_by_key(|day| day.num_from_monday());
    days.dedup();
    days
}
