use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::QuizError,
    models::{AnswerRecord, LearnOrder, Mode, NavAction},
    quiz::{summarize, ProgressSummary},
    routes::{warnings, ApiError},
    session::{self, ActiveSession},
    storage::STUDY_RECORDS_FILE,
    AppState,
};

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct DaysResponse {
    pub days: Vec<String>,
    pub has_days: bool,
    pub total_words: usize,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub mode: Mode,
    pub selected_days: Vec<String>,
    pub order: LearnOrder,
    pub word_count: usize,
    pub cursor: usize,
    pub answered: usize,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub order: LearnOrder,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub selected_days: Vec<String>,
    pub order: LearnOrder,
    pub word_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub action: NavAction,
}

#[derive(Debug, Serialize)]
pub struct NavigateResponse {
    pub mode: Mode,
}

#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub records: Vec<AnswerRecord>,
    pub known_words: Vec<String>,
    pub unknown_words: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub file: &'static str,
    pub count: usize,
    pub saved: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub summary: ProgressSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Start a new session
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionCreated>) {
    let id = session::create_session(&state);
    (
        StatusCode::CREATED,
        Json(SessionCreated {
            session_id: id.to_string(),
        }),
    )
}

/// End the caller's session
pub async fn end_session(active: ActiveSession, State(state): State<Arc<AppState>>) -> StatusCode {
    state.sessions.remove(&active.id);
    tracing::info!("Ended session {}", active.id);
    StatusCode::NO_CONTENT
}

/// Categories available for selection
pub async fn list_days(State(state): State<Arc<AppState>>) -> Result<Json<DaysResponse>, ApiError> {
    if state.vocabulary.is_empty() {
        return Err(QuizError::NoData.into());
    }

    Ok(Json(DaysResponse {
        days: state.vocabulary.days(),
        has_days: state.vocabulary.has_days(),
        total_words: state.vocabulary.len(),
    }))
}

pub async fn session_info(active: ActiveSession) -> Json<SessionView> {
    let session = active.session.lock().await;
    Json(SessionView {
        session_id: active.id.to_string(),
        mode: session.mode,
        selected_days: session.selected_days.clone(),
        order: session.order,
        word_count: session.word_set.len(),
        cursor: session.cursor,
        answered: session.answers.len(),
    })
}

/// Choose the Days to study and rebuild the word set
pub async fn select_categories(
    active: ActiveSession,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let mut session = active.session.lock().await;
    session.require_mode(Mode::Home)?;

    let mut warnings = Vec::new();
    if !state.vocabulary.has_days() && !state.vocabulary.is_empty() {
        warnings.push("The word list has no Day column; using every word".to_string());
    }

    let word_count = session
        .select_days(&state.vocabulary, payload.days, payload.order)
        .map_err(|e| {
            tracing::info!("Session {} category selection rejected: {}", active.id, e);
            ApiError::from(e).with_warnings(warnings.clone())
        })?;

    Ok(Json(CategoryResponse {
        selected_days: session.selected_days.clone(),
        order: session.order,
        word_count,
        warnings,
    }))
}

/// Switch screens
pub async fn navigate(
    active: ActiveSession,
    Json(payload): Json<NavigateRequest>,
) -> Result<Json<NavigateResponse>, ApiError> {
    let mut session = active.session.lock().await;
    let mode = session.navigate(payload.action)?;
    tracing::debug!("Session {} switched to {:?}", active.id, mode);
    Ok(Json(NavigateResponse { mode }))
}

pub async fn records(active: ActiveSession) -> Json<RecordsResponse> {
    let session = active.session.lock().await;
    Json(RecordsResponse {
        records: session.answers.records().to_vec(),
        known_words: session.known_words.clone(),
        unknown_words: session.unknown_words.clone(),
    })
}

/// Save this session's answer records to the file store
pub async fn export_records(
    active: ActiveSession,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExportResponse>, ApiError> {
    let session = active.session.lock().await;
    let warning = session.save_records(state.store.as_ref()).await?;

    Ok(Json(ExportResponse {
        file: STUDY_RECORDS_FILE,
        count: session.answers.len(),
        saved: warning.is_none(),
        warnings: warnings([warning]),
    }))
}

/// Progress summary over this session's answers
pub async fn stats(active: ActiveSession) -> Json<StatsResponse> {
    let session = active.session.lock().await;
    let summary = summarize(session.answers.records());
    let message = if summary.attempts == 0 {
        Some("No answers recorded yet".to_string())
    } else {
        None
    };
    Json(StatsResponse { summary, message })
}
