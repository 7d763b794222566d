use chrono::NaiveTime;
use roster_tool::{
    AttendanceRecord, LessonDraft, LessonPatch, LessonStatus, LessonTemplate, Roster, SchoolDay,
    Subject, load_roster_from_csv, load_roster_from_json, parse_civil_date, save_roster_to_csv,
    save_roster_to_json,
};
use std::io::{self, Write};

fn parse_day_list(s: &str) -> Result<Vec<SchoolDay>, String> {
    s.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            SchoolDay::from_str(part).ok_or_else(|| format!("Invalid day '{}'", part.trim()))
        })
        .collect()
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if ci < widths.len() && cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    out.push('|');
    for (i, name) in headers.iter().enumerate() {
        out.push(' ');
        out.push_str(name);
        let pad = widths[i] - name.len();
        if pad > 0 {
            out.push_str(&" ".repeat(pad));
        }
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    for row in rows {
        out.push('|');
        for (ci, cell) in row.iter().enumerate() {
            out.push(' ');
            out.push_str(cell);
            let pad = widths[ci].saturating_sub(cell.len());
            if pad > 0 {
                out.push_str(&" ".repeat(pad));
            }
            out.push(' ');
            out.push('|');
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_lessons(lessons: &[LessonTemplate]) -> String {
    let headers = [
        "id",
        "teacher",
        "group",
        "days",
        "window",
        "room",
        "status",
        "description",
    ];
    let rows: Vec<Vec<String>> = lessons
        .iter()
        .map(|lesson| {
            vec![
                lesson.id.to_string(),
                lesson.teacher.clone(),
                lesson.group.clone().unwrap_or_default(),
                lesson
                    .days
                    .iter()
                    .map(|d| d.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
                format!(
                    "{}-{}",
                    lesson.starts_at.format("%H:%M"),
                    lesson.ends_at.format("%H:%M")
                ),
                lesson.room.clone(),
                lesson.status.as_str().to_string(),
                lesson.description.clone(),
            ]
        })
        .collect();
    render_text_table(&headers, &rows)
}

fn render_attendance(records: &[AttendanceRecord]) -> String {
    let headers = ["id", "lesson", "subject", "date", "description", "recorded_at"];
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            vec![
                record.id.to_string(),
                record.lesson_id.to_string(),
                record.subject.to_string(),
                record.date.to_string(),
                record.description.clone(),
                record.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
        })
        .collect();
    render_text_table(&headers, &rows)
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show all lesson templates\n  add <teacher> <room> <HH:MM> <HH:MM> [days_csv]\n                                     Create a lesson (days like Mon,Wed)\n  delete <id>                        Delete a lesson and its attendance\n  days <id> <csv>                    Replace the recurring day set\n  time <id> <HH:MM> <HH:MM>          Set the start/end window\n  room <id> <room>                   Set the room\n  teacher <id> <name>                Set the teacher reference\n  group <id> <name>                  Set the group reference\n  status <id> <key>                  Set status (scheduled|completed|cancelled)\n  desc <id> <text...>                Set the description (rest of line)\n  on <YYYY-MM-DD>                    Lessons occurring on a date\n  mark <id> <student|teacher> <ref> <YYYY-MM-DD> [desc...]\n                                     Record attendance for a date\n  unmark <id> <record_id>            Delete one attendance record\n  attendance <YYYY-MM-DD>            Attendance recorded for a date\n  note <record_id> <text...>         Edit a record's description\n  save <json|csv> <path>             Persist roster to disk\n  load <json|csv> <path>             Load roster from disk\n  quit|exit                          Exit"
    );
}

fn main() {
    let mut roster = Roster::new();

    println!("Roster Tool (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        if stdin.read_line(&mut line).is_err() {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => {
                print_help();
            }
            "quit" | "exit" => break,
            "show" => {
                println!("Roster ({})", roster.summary().to_cli_summary());
                println!("{}", render_lessons(&roster.lessons()));
            }
            "add" => {
                let teacher = parts.next();
                let room = parts.next();
                let start_s = parts.next();
                let end_s = parts.next();
                let days_s = parts.next();
                match (teacher, room, start_s, end_s) {
                    (Some(teacher), Some(room), Some(start_s), Some(end_s)) => {
                        let Some(starts_at) = parse_time(start_s) else {
                            println!("Invalid start time (HH:MM)");
                            continue;
                        };
                        let Some(ends_at) = parse_time(end_s) else {
                            println!("Invalid end time (HH:MM)");
                            continue;
                        };
                        let days = match days_s.map(parse_day_list).transpose() {
                            Ok(days) => days.unwrap_or_default(),
                            Err(message) => {
                                println!("{}", message);
                                continue;
                            }
                        };
                        let draft = LessonDraft {
                            teacher: teacher.to_string(),
                            room: room.to_string(),
                            starts_at: Some(starts_at),
                            ends_at: Some(ends_at),
                            days,
                            ..LessonDraft::default()
                        };
                        match roster.add_lesson(draft) {
                            Ok(lesson) => {
                                println!("Added lesson {}.", lesson.id);
                                println!("{}", render_lessons(&roster.lessons()));
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: add <teacher> <room> <HH:MM> <HH:MM> [days_csv]"),
                }
            }
            "delete" => {
                let id_s = parts.next();
                match id_s {
                    Some(id_s) => match id_s.parse::<i64>() {
                        Ok(id) => match roster.remove_lesson(id) {
                            Ok(purged) => {
                                println!("Deleted lesson {id}.");
                                if purged > 0 {
                                    println!("Purged {purged} attendance record(s).");
                                }
                                println!("{}", render_lessons(&roster.lessons()));
                            }
                            Err(e) => println!("Error: {}", e),
                        },
                        Err(_) => println!("Invalid id"),
                    },
                    None => println!("Usage: delete <id>"),
                }
            }
            "days" => {
                let id_s = parts.next();
                let csv = parts.next();
                match (id_s, csv) {
                    (Some(id_s), Some(csv)) => {
                        let id: i64 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        let days = match parse_day_list(csv) {
                            Ok(days) => days,
                            Err(message) => {
                                println!("{}", message);
                                continue;
                            }
                        };
                        let patch = LessonPatch {
                            days: Some(days),
                            ..LessonPatch::default()
                        };
                        match roster.update_lesson(id, patch) {
                            Ok(_) => println!("days set.\n{}", render_lessons(&roster.lessons())),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: days <id> <csv>"),
                }
            }
            "time" => {
                let id_s = parts.next();
                let start_s = parts.next();
                let end_s = parts.next();
                match (id_s, start_s, end_s) {
                    (Some(id_s), Some(start_s), Some(end_s)) => {
                        let id: i64 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        let (Some(starts_at), Some(ends_at)) =
                            (parse_time(start_s), parse_time(end_s))
                        else {
                            println!("Invalid time (HH:MM)");
                            continue;
                        };
                        let patch = LessonPatch {
                            starts_at: Some(starts_at),
                            ends_at: Some(ends_at),
                            ..LessonPatch::default()
                        };
                        match roster.update_lesson(id, patch) {
                            Ok(_) => println!("window set.\n{}", render_lessons(&roster.lessons())),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: time <id> <HH:MM> <HH:MM>"),
                }
            }
            "room" | "teacher" | "group" => {
                let id_s = parts.next();
                let value = parts.next();
                match (id_s, value) {
                    (Some(id_s), Some(value)) => {
                        let id: i64 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        let mut patch = LessonPatch::default();
                        match cmd {
                            "room" => patch.room = Some(value.to_string()),
                            "teacher" => patch.teacher = Some(value.to_string()),
                            _ => patch.group = Some(value.to_string()),
                        }
                        match roster.update_lesson(id, patch) {
                            Ok(_) => println!(
                                "{} set.\n{}",
                                cmd,
                                render_lessons(&roster.lessons())
                            ),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: {} <id> <value>", cmd),
                }
            }
            "status" => {
                let id_s = parts.next();
                let key = parts.next();
                match (id_s, key) {
                    (Some(id_s), Some(key)) => {
                        let id: i64 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        let Some(status) = LessonStatus::from_str(key) else {
                            println!(
                                "Unknown status '{}'. Options: {}",
                                key,
                                LessonStatus::variants().join("|")
                            );
                            continue;
                        };
                        let patch = LessonPatch {
                            status: Some(status),
                            ..LessonPatch::default()
                        };
                        match roster.update_lesson(id, patch) {
                            Ok(_) => println!("status set.\n{}", render_lessons(&roster.lessons())),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: status <id> <scheduled|completed|cancelled>"),
                }
            }
            "desc" => {
                let id_s = parts.next();
                let rest: Vec<&str> = parts.collect();
                match (id_s, !rest.is_empty()) {
                    (Some(id_s), true) => {
                        let id: i64 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        let patch = LessonPatch {
                            description: Some(rest.join(" ")),
                            ..LessonPatch::default()
                        };
                        match roster.update_lesson(id, patch) {
                            Ok(_) => println!("description set."),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: desc <id> <text...>"),
                }
            }
            "on" => {
                let date_s = parts.next();
                match date_s {
                    Some(date_s) => match parse_civil_date(date_s) {
                        Ok(date) => {
                            println!("{}", render_lessons(&roster.lessons_on(date)));
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("Usage: on <YYYY-MM-DD>"),
                }
            }
            "mark" => {
                let id_s = parts.next();
                let kind = parts.next();
                let reference = parts.next();
                let date_s = parts.next();
                let rest: Vec<&str> = parts.collect();
                match (id_s, kind, reference, date_s) {
                    (Some(id_s), Some(kind), Some(reference), Some(date_s)) => {
                        let id: i64 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        let subject = match kind {
                            "student" => Subject::Student(reference.to_string()),
                            "teacher" => Subject::Teacher(reference.to_string()),
                            _ => {
                                println!("Subject kind must be student or teacher");
                                continue;
                            }
                        };
                        let date = match parse_civil_date(date_s) {
                            Ok(d) => d,
                            Err(e) => {
                                println!("Error: {}", e);
                                continue;
                            }
                        };
                        let description = if rest.is_empty() {
                            None
                        } else {
                            Some(rest.join(" "))
                        };
                        match roster.record_attendance(id, subject, date, description) {
                            Ok(record) => println!(
                                "Recorded attendance {} for {} on {}.",
                                record.id, record.subject, record.date
                            ),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!(
                        "Usage: mark <id> <student|teacher> <ref> <YYYY-MM-DD> [desc...]"
                    ),
                }
            }
            "unmark" => {
                let id_s = parts.next();
                let record_s = parts.next();
                match (id_s, record_s) {
                    (Some(id_s), Some(record_s)) => {
                        let (Ok(id), Ok(record_id)) =
                            (id_s.parse::<i64>(), record_s.parse::<i64>())
                        else {
                            println!("Invalid id");
                            continue;
                        };
                        match roster.delete_attendance(id, record_id) {
                            Ok(()) => println!("Deleted attendance record {record_id}."),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: unmark <id> <record_id>"),
                }
            }
            "attendance" => {
                let date_s = parts.next();
                match date_s {
                    Some(date_s) => match parse_civil_date(date_s) {
                        Ok(date) => {
                            println!("{}", render_attendance(&roster.attendance_on(date)));
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("Usage: attendance <YYYY-MM-DD>"),
                }
            }
            "note" => {
                let record_s = parts.next();
                let rest: Vec<&str> = parts.collect();
                match (record_s, !rest.is_empty()) {
                    (Some(record_s), true) => {
                        let record_id: i64 = match record_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        match roster.set_attendance_description(record_id, rest.join(" ")) {
                            Ok(record) => {
                                println!("Record {} description updated.", record.id)
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: note <record_id> <text...>"),
                }
            }
            "save" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match save_roster_to_json(&roster, path) {
                        Ok(_) => println!("Roster saved to {}.", path),
                        Err(e) => println!("Error saving roster: {}", e),
                    },
                    (Some("csv"), Some(path)) => match save_roster_to_csv(&roster, path) {
                        Ok(_) => println!("Roster saved to {}.", path),
                        Err(e) => println!("Error saving roster: {}", e),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match load_roster_from_json(path) {
                        Ok(loaded) => {
                            roster = loaded;
                            println!("Roster loaded from {}.", path);
                            println!("{}", render_lessons(&roster.lessons()));
                        }
                        Err(e) => println!("Error loading roster: {}", e),
                    },
                    (Some("csv"), Some(path)) => match load_roster_from_csv(path) {
                        Ok(loaded) => {
                            roster = loaded;
                            println!("Roster loaded from {}.", path);
                            println!("{}", render_lessons(&roster.lessons()));
                        }
                        Err(e) => println!("Error loading roster: {}", e),
                    },
                    _ => println!("Usage: load <json|csv> <path>"),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
