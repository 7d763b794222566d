use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::calendar::parse_civil_date;
use crate::{
    AttendanceRecord, LessonDraft, LessonPatch, LessonTemplate, Roster, RosterError, Subject,
};

#[derive(Clone)]
pub struct AppState {
    roster: Arc<RwLock<Roster>>,
}

impl AppState {
    pub fn new(roster: Roster) -> Self {
        Self {
            roster: Arc::new(RwLock::new(roster)),
        }
    }

    pub fn with_shared(roster: Arc<RwLock<Roster>>) -> Self {
        Self { roster }
    }

    fn roster(&self) -> Arc<RwLock<Roster>> {
        self.roster.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<RosterError> for ApiError {
    fn from(value: RosterError) -> Self {
        match &value {
            RosterError::LessonNotFound(_) | RosterError::AttendanceNotFound(_) => {
                ApiError::NotFound(value.to_string())
            }
            RosterError::DuplicateAttendance { .. } | RosterError::MismatchedLesson { .. } => {
                ApiError::Conflict(value.to_string())
            }
            _ => ApiError::Invalid(value.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                let body = Json(ErrorBody {
                    error: "not_found",
                    message,
                });
                (StatusCode::NOT_FOUND, body).into_response()
            }
            ApiError::Conflict(message) => {
                let body = Json(ErrorBody {
                    error: "conflict",
                    message,
                });
                (StatusCode::CONFLICT, body).into_response()
            }
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct MarkAttendancePayload {
    #[serde(default)]
    student: Option<String>,
    #[serde(default)]
    teacher: Option<String>,
    date: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DescriptionPayload {
    description: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/lessons", get(list_lessons).post(create_lesson))
        .route(
            "/lessons/:id",
            get(get_lesson).put(update_lesson).delete(delete_lesson),
        )
        .route("/lessons/on/:date", get(lessons_on_date))
        .route("/lessons/:id/attendance", post(mark_attendance))
        .route(
            "/lessons/:id/attendance/:record_id",
            delete(delete_attendance),
        )
        .route("/attendance/on/:date", get(attendance_on_date))
        .route(
            "/attendance/:record_id/description",
            put(update_attendance_description),
        )
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, roster: Roster) -> std::io::Result<()> {
    let state = AppState::new(roster);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_lessons(State(state): State<AppState>) -> Json<Vec<LessonTemplate>> {
    let roster = state.roster();
    let lessons = {
        let guard = roster.read();
        guard.lessons()
    };
    Json(lessons)
}

async fn create_lesson(
    State(state): State<AppState>,
    Json(draft): Json<LessonDraft>,
) -> Result<(StatusCode, Json<LessonTemplate>), ApiError> {
    let roster = state.roster();
    let created = {
        let mut guard = roster.write();
        guard.add_lesson(draft)?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
) -> Result<Json<LessonTemplate>, ApiError> {
    let roster = state.roster();
    let result = {
        let guard = roster.read();
        guard.find_lesson(lesson_id)
    };
    match result {
        Some(lesson) => Ok(Json(lesson)),
        None => Err(ApiError::not_found(format!("lesson {lesson_id} not found"))),
    }
}

async fn update_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
    Json(patch): Json<LessonPatch>,
) -> Result<Json<LessonTemplate>, ApiError> {
    let roster = state.roster();
    let updated = {
        let mut guard = roster.write();
        guard.update_lesson(lesson_id, patch)?
    };
    Ok(Json(updated))
}

async fn delete_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let roster = state.roster();
    {
        let mut guard = roster.write();
        guard.remove_lesson(lesson_id)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn lessons_on_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<LessonTemplate>>, ApiError> {
    let date = parse_civil_date(&date).map_err(|err| ApiError::invalid(err.to_string()))?;
    let roster = state.roster();
    let lessons = {
        let guard = roster.read();
        guard.lessons_on(date)
    };
    Ok(Json(lessons))
}

async fn mark_attendance(
    State(state): State<AppState>,
    Path(lesson_id): Path<i64>,
    Json(payload): Json<MarkAttendancePayload>,
) -> Result<(StatusCode, Json<AttendanceRecord>), ApiError> {
    let date =
        parse_civil_date(&payload.date).map_err(|err| ApiError::invalid(err.to_string()))?;
    let roster = state.roster();
    let record = {
        let mut guard = roster.write();
        // Missing lesson outranks a malformed subject reference.
        if guard.find_lesson(lesson_id).is_none() {
            return Err(ApiError::not_found(format!("lesson {lesson_id} not found")));
        }
        let subject = Subject::from_parts(payload.student, payload.teacher)
            .ok_or_else(|| ApiError::from(RosterError::InvalidSubject))?;
        guard.record_attendance(lesson_id, subject, date, payload.description)?
    };
    Ok((StatusCode::CREATED, Json(record)))
}

async fn delete_attendance(
    State(state): State<AppState>,
    Path((lesson_id, record_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    let roster = state.roster();
    {
        let mut guard = roster.write();
        guard.delete_attendance(lesson_id, record_id)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn attendance_on_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError> {
    let date = parse_civil_date(&date).map_err(|err| ApiError::invalid(err.to_string()))?;
    let roster = state.roster();
    let records = {
        let guard = roster.read();
        guard.attendance_on(date)
    };
    Ok(Json(records))
}

async fn update_attendance_description(
    State(state): State<AppState>,
    Path(record_id): Path<i64>,
    Json(payload): Json<DescriptionPayload>,
) -> Result<Json<AttendanceRecord>, ApiError> {
    let roster = state.roster();
    let updated = {
        let mut guard = roster.write();
        guard.set_attendance_description(record_id, payload.description)?
    };
    Ok(Json(updated))
}
