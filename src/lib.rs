pub mod attendance;
pub mod calendar;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod lesson;
pub(crate) mod lesson_validation;
pub mod persistence;
pub mod roster;

pub use attendance::{AttendanceRecord, Subject};
pub use calendar::{
    CalendarError, SchoolDay, effective_session_date, parse_civil_date, resolve_school_day,
};
pub use lesson::{LessonDraft, LessonPatch, LessonStatus, LessonTemplate};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteRosterStore;
pub use persistence::{
    PersistenceError, RosterStore, load_roster_from_csv, load_roster_from_json,
    save_roster_to_csv, save_roster_to_json, validate_roster,
};
pub use roster::{Roster, RosterError, RosterSummary};
