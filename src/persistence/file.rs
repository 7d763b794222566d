use super::{PersistenceError, PersistenceResult};
use crate::Roster;
use crate::attendance::AttendanceRecord;
use crate::calendar::SchoolDay;
use crate::lesson::{LessonStatus, LessonTemplate};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct RosterSnapshot {
    lessons: Vec<LessonTemplate>,
    #[serde(default)]
    attendance: Vec<AttendanceRecord>,
}

impl RosterSnapshot {
    fn from_roster(roster: &Roster) -> PersistenceResult<Self> {
        let lessons = roster.lessons();
        let attendance = roster.attendance();
        super::validate_roster_parts(&lessons, &attendance)?;
        Ok(Self {
            lessons,
            attendance,
        })
    }

    fn into_roster(self) -> PersistenceResult<Roster> {
        super::validate_roster_parts(&self.lessons, &self.attendance)?;
        Ok(Roster::from_parts(self.lessons, self.attendance))
    }
}

pub fn save_roster_to_json<P: AsRef<Path>>(roster: &Roster, path: P) -> PersistenceResult<()> {
    let snapshot = RosterSnapshot::from_roster(roster)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_roster_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Roster> {
    let file = File::open(path)?;
    let snapshot: RosterSnapshot = serde_json::from_reader(file)?;
    snapshot.into_roster()
}

/// One CSV row per lesson; the day set is `;`-joined short names and
/// the lesson's attendance rides along as an embedded JSON column.
#[derive(Default, Serialize, Deserialize)]
struct LessonCsvRecord {
    id: i64,
    teacher: String,
    group: String,
    days: String,
    starts_at: String,
    ends_at: String,
    room: String,
    description: String,
    status: String,
    #[serde(default)]
    attendance_json: String,
}

impl LessonCsvRecord {
    fn from_lesson(
        lesson: &LessonTemplate,
        attendance: &[AttendanceRecord],
    ) -> PersistenceResult<Self> {
        let owned: Vec<&AttendanceRecord> = attendance
            .iter()
            .filter(|r| r.lesson_id == lesson.id)
            .collect();
        let mut record = LessonCsvRecord::default();
        record.id = lesson.id;
        record.teacher = lesson.teacher.clone();
        record.group = lesson.group.clone().unwrap_or_default();
        record.days = join_days(&lesson.days);
        record.starts_at = format_time(lesson.starts_at);
        record.ends_at = format_time(lesson.ends_at);
        record.room = lesson.room.clone();
        record.description = lesson.description.clone();
        record.status = lesson.status.as_str().to_string();
        record.attendance_json = serde_json::to_string(&owned)?;
        Ok(record)
    }

    fn into_parts(self) -> PersistenceResult<(LessonTemplate, Vec<AttendanceRecord>)> {
        let starts_at = parse_time(&self.starts_at)?;
        let ends_at = parse_time(&self.ends_at)?;
        let mut lesson =
            LessonTemplate::new(self.id, self.teacher, starts_at, ends_at, self.room);
        lesson.group = parse_string_option(self.group);
        lesson.days = split_days(&self.days)?;
        lesson.description = self.description;
        lesson.status = LessonStatus::from_str(&self.status).ok_or_else(|| {
            PersistenceError::InvalidData(format!("invalid lesson status '{}'", self.status))
        })?;
        let attendance = if self.attendance_json.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str::<Vec<AttendanceRecord>>(&self.attendance_json).map_err(
                |err| PersistenceError::InvalidData(format!("invalid attendance json: {err}")),
            )?
        };
        Ok((lesson, attendance))
    }
}

pub fn save_roster_to_csv<P: AsRef<Path>>(roster: &Roster, path: P) -> PersistenceResult<()> {
    let lessons = roster.lessons();
    let attendance = roster.attendance();
    super::validate_roster_parts(&lessons, &attendance)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for lesson in &lessons {
        writer.serialize(LessonCsvRecord::from_lesson(lesson, &attendance)?)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_roster_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Roster> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut lessons = Vec::new();
    let mut attendance = Vec::new();
    for record in reader.deserialize::<LessonCsvRecord>() {
        let (lesson, owned) = record?.into_parts()?;
        lessons.push(lesson);
        attendance.extend(owned);
    }

    if lessons.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no lessons".into(),
        ));
    }

    super::validate_roster_parts(&lessons, &attendance)?;
    Ok(Roster::from_parts(lessons, attendance))
}

fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

fn parse_time(input: &str) -> PersistenceResult<NaiveTime> {
    let trimmed = input.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|e| PersistenceError::InvalidData(format!("invalid time '{input}': {e}")))
}

fn join_days(days: &[SchoolDay]) -> String {
    days.iter()
        .map(|d| d.as_str())
        .collect::<Vec<_>>()
        .join(";")
}

fn split_days(input: &str) -> PersistenceResult<Vec<SchoolDay>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    input
        .split(';')
        .map(|part| {
            SchoolDay::from_str(part).ok_or_else(|| {
                PersistenceError::InvalidData(format!("invalid weekday '{part}'"))
            })
        })
        .collect()
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
