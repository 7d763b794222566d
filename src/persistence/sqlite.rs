use super::{PersistenceError, PersistenceResult, RosterStore};
use crate::Roster;
use crate::attendance::AttendanceRecord;
use crate::lesson::LessonTemplate;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// SQLite-backed store. Rows carry the entities as JSON blobs with the
/// uniqueness-key columns broken out so the database can enforce the
/// student once-per-(lesson, date) rule and the purge-then-delete
/// transaction without deserializing anything.
pub struct SqliteRosterStore {
    connection: Mutex<Connection>,
}

#[derive(Serialize, Deserialize)]
struct StoredCounters {
    next_lesson_id: i64,
    next_record_id: i64,
}

impl SqliteRosterStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS roster_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                state_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS lessons (
                id INTEGER PRIMARY KEY,
                lesson_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS attendance (
                id INTEGER PRIMARY KEY,
                lesson_id INTEGER NOT NULL REFERENCES lessons(id),
                student_id TEXT,
                teacher_id TEXT,
                taken_on TEXT NOT NULL,
                record_json TEXT NOT NULL
            );
            CREATE UNIQUE INDEX IF NOT EXISTS attendance_student_once
                ON attendance(lesson_id, student_id, taken_on)
                WHERE student_id IS NOT NULL;
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn insert_attendance_row(
        conn: &Connection,
        record: &AttendanceRecord,
        json: &str,
    ) -> Result<usize, rusqlite::Error> {
        conn.execute(
            "INSERT INTO attendance (id, lesson_id, student_id, teacher_id, taken_on, record_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.lesson_id,
                record.subject.student(),
                record.subject.teacher(),
                record.date.to_string(),
                json
            ],
        )
    }

    /// Atomic insert-if-absent for a single record. A student record
    /// that collides with an existing (lesson, student, date) row is
    /// rejected by the unique index and surfaces as `Duplicate`;
    /// teacher records are never constrained.
    pub fn append_attendance(&self, record: &AttendanceRecord) -> PersistenceResult<()> {
        let json = serde_json::to_string(record)?;
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        match Self::insert_attendance_row(&conn, record, &json) {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(PersistenceError::Duplicate(format!(
                    "attendance for lesson {} on {} is already stored",
                    record.lesson_id, record.date
                )))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Removes a lesson and its attendance in one transaction, so a
    /// concurrent insert can never land between the purge and the
    /// template delete. Returns whether a lesson row was removed.
    pub fn remove_lesson(&self, lesson_id: i64) -> PersistenceResult<bool> {
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM attendance WHERE lesson_id = ?1", params![lesson_id])?;
        let removed = tx.execute("DELETE FROM lessons WHERE id = ?1", params![lesson_id])?;
        tx.commit()?;
        Ok(removed > 0)
    }
}

impl RosterStore for SqliteRosterStore {
    fn save_roster(&self, roster: &Roster) -> PersistenceResult<()> {
        super::validate_roster(roster)?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;

        let (next_lesson_id, next_record_id) = roster.next_ids();
        let state = serde_json::to_string(&StoredCounters {
            next_lesson_id,
            next_record_id,
        })?;
        tx.execute("DELETE FROM attendance", [])?;
        tx.execute("DELETE FROM lessons", [])?;
        tx.execute("DELETE FROM roster_state", [])?;
        tx.execute(
            "INSERT INTO roster_state (id, state_json) VALUES (1, ?1)",
            params![state],
        )?;

        {
            let mut stmt = tx.prepare("INSERT INTO lessons (id, lesson_json) VALUES (?1, ?2)")?;
            for lesson in roster.lessons() {
                let json = serde_json::to_string(&lesson)?;
                stmt.execute(params![lesson.id, json])?;
            }
        }
        for record in roster.attendance() {
            let json = serde_json::to_string(&record)?;
            Self::insert_attendance_row(&tx, &record, &json)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn load_roster(&self) -> PersistenceResult<Option<Roster>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare("SELECT state_json FROM roster_state WHERE id = 1")?;
        let state_json_opt: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(state_json) = state_json_opt else {
            return Ok(None);
        };

        let counters: StoredCounters = serde_json::from_str(&state_json)?;

        let mut stmt = conn.prepare("SELECT lesson_json FROM lessons ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut lessons: Vec<LessonTemplate> = Vec::new();
        for json in rows {
            lessons.push(serde_json::from_str(&json?)?);
        }

        let mut stmt = conn.prepare("SELECT record_json FROM attendance ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut records: Vec<AttendanceRecord> = Vec::new();
        for json in rows {
            records.push(serde_json::from_str(&json?)?);
        }

        super::validate_roster_parts(&lessons, &records)?;

        Ok(Some(Roster::from_parts_with_ids(
            lessons,
            records,
            counters.next_lesson_id,
            counters.next_record_id,
        )))
    }
}
