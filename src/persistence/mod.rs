use crate::lesson_validation;
use crate::{AttendanceRecord, LessonTemplate, Roster};
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
    Duplicate(String),
    NotFound,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            PersistenceError::Duplicate(msg) => write!(f, "duplicate entry: {msg}"),
            PersistenceError::NotFound => write!(f, "no roster stored"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait RosterStore {
    fn save_roster(&self, roster: &Roster) -> PersistenceResult<()>;
    fn load_roster(&self) -> PersistenceResult<Option<Roster>>;
}

pub fn validate_lessons(lessons: &[LessonTemplate]) -> PersistenceResult<()> {
    lesson_validation::validate_lesson_collection(lessons)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub fn validate_roster_parts(
    lessons: &[LessonTemplate],
    records: &[AttendanceRecord],
) -> PersistenceResult<()> {
    validate_lessons(lessons)?;
    lesson_validation::validate_attendance_collection(records, lessons)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub fn validate_roster(roster: &Roster) -> PersistenceResult<()> {
    let lessons = roster.lessons();
    let records = roster.attendance();
    validate_roster_parts(&lessons, &records)
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_roster_from_csv, load_roster_from_json, save_roster_to_csv, save_roster_to_json,
};
