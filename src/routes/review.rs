use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{
    models::{AnswerResult, Mode},
    routes::{learn::AnswerRequest, learn::QuestionView, warnings, ApiError},
    session::{ActiveSession, Session},
    AppState,
};

#[derive(Debug, Serialize)]
pub struct ReviewView {
    #[serde(flatten)]
    pub question: QuestionView,
    pub position: usize,
    pub remaining: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewAnswerResponse {
    pub word: String,
    pub result: AnswerResult,
    pub correct_answer: String,
    pub graduated: bool,
    pub remaining: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

fn review_position(session: &Session) -> (usize, usize) {
    session
        .review
        .as_ref()
        .map_or((0, 0), |review| (review.cursor() + 1, review.len()))
}

/// Current review question, loading the incorrect-word list on first use
pub async fn current(
    active: ActiveSession,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReviewView>, ApiError> {
    let mut session = active.session.lock().await;
    session.require_mode(Mode::Review)?;

    let warning = session.ensure_review_loaded(state.store.as_ref()).await;
    let question = session
        .review_question(state.config.quiz.option_count)
        .map(QuestionView::from)
        .map_err(|e| ApiError::from(e).with_warnings(warnings([warning.clone()])))?;
    let (position, remaining) = review_position(&session);

    Ok(Json(ReviewView {
        question,
        position,
        remaining,
        warnings: warnings([warning]),
    }))
}

/// Judge a review answer. A correct answer removes the word from the list.
pub async fn answer(
    active: ActiveSession,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<ReviewAnswerResponse>, ApiError> {
    let mut session = active.session.lock().await;
    session.require_mode(Mode::Review)?;

    let outcome = session.answer_review(&payload.selected)?;
    let save_warning = if outcome.graduated {
        tracing::info!("Session {} cleared {} from review", active.id, outcome.record.word);
        session.save_review(state.store.as_ref()).await
    } else {
        None
    };
    let (_, remaining) = review_position(&session);

    Ok(Json(ReviewAnswerResponse {
        word: outcome.record.word,
        result: outcome.record.result,
        correct_answer: outcome.correct_answer,
        graduated: outcome.graduated,
        remaining,
        warnings: warnings([save_warning]),
    }))
}

/// Move to the next review word
pub async fn next(
    active: ActiveSession,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReviewView>, ApiError> {
    let mut session = active.session.lock().await;
    session.require_mode(Mode::Review)?;

    let option_count = state.config.quiz.option_count;
    session.next_review(option_count)?;
    let question = QuestionView::from(session.review_question(option_count)?);
    let (position, remaining) = review_position(&session);

    Ok(Json(ReviewView {
        question,
        position,
        remaining,
        warnings: Vec::new(),
    }))
}
