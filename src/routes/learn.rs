use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::QuizError,
    models::{AnswerResult, Mode},
    routes::{warnings, ApiError},
    session::{timestamp, ActiveSession, Question},
    AppState,
};

pub const WRAPPED_MESSAGE: &str = "All words studied. Starting over from the beginning.";

/// A question as shown to the user. The answer stays hidden.
#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub word: String,
    pub day: Option<String>,
    pub options: Vec<String>,
    pub answered: Option<AnswerResult>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            word: question.entry.word.clone(),
            day: question.entry.day.clone(),
            options: question.options.clone(),
            answered: question.outcome,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LearnView {
    #[serde(flatten)]
    pub question: QuestionView,
    pub position: usize,
    pub total: usize,
    pub marked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub selected: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub word: String,
    pub result: AnswerResult,
    pub correct_answer: String,
    pub review_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RevealResponse {
    pub word: String,
    pub correct_answer: String,
}

#[derive(Debug, Serialize)]
pub struct MarkResponse {
    pub word: String,
    pub marked: bool,
    pub marked_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Current learn question
pub async fn current(
    active: ActiveSession,
    State(state): State<Arc<AppState>>,
) -> Result<Json<LearnView>, ApiError> {
    let mut session = active.session.lock().await;
    session.require_mode(Mode::Learn)?;

    let warning = session.ensure_marked_loaded(state.store.as_ref()).await;
    let question = QuestionView::from(session.learn_question(state.config.quiz.option_count)?);
    let marked = session.is_marked(&question.word);

    Ok(Json(LearnView {
        question,
        position: session.cursor + 1,
        total: session.word_set.len(),
        marked,
        message: None,
        warnings: warnings([warning]),
    }))
}

/// Judge the selected option and update the review queue
pub async fn answer(
    active: ActiveSession,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let mut session = active.session.lock().await;
    session.require_mode(Mode::Learn)?;

    let load_warning = session.ensure_review_loaded(state.store.as_ref()).await;
    let outcome = session
        .answer_learn(
            &payload.selected,
            state.config.quiz.clear_review_on_learn,
            &timestamp(),
        )
        .map_err(|e| ApiError::from(e).with_warnings(warnings([load_warning.clone()])))?;

    tracing::debug!(
        "Session {} answered {} ({:?})",
        active.id,
        outcome.record.word,
        outcome.record.result
    );

    let save_warning = if outcome.review_changed {
        session.save_review(state.store.as_ref()).await
    } else {
        None
    };

    Ok(Json(AnswerResponse {
        word: outcome.record.word,
        result: outcome.record.result,
        correct_answer: outcome.correct_answer,
        review_count: session.review.as_ref().map_or(0, |r| r.len()),
        warnings: warnings([load_warning, save_warning]),
    }))
}

/// Correct answer of the current question, shown after the reveal delay
pub async fn reveal(
    active: ActiveSession,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RevealResponse>, ApiError> {
    // Wait before taking the lock so other requests are not held up
    tokio::time::sleep(state.config.reveal_delay()).await;

    let session = active.session.lock().await;
    session.require_mode(Mode::Learn)?;
    let question = session
        .question
        .as_ref()
        .ok_or(QuizError::NoActiveQuestion)?;

    Ok(Json(RevealResponse {
        word: question.entry.word.clone(),
        correct_answer: question.correct_answer.clone(),
    }))
}

/// Move to the next word, wrapping to the first after the last
pub async fn next(
    active: ActiveSession,
    State(state): State<Arc<AppState>>,
) -> Result<Json<LearnView>, ApiError> {
    let mut session = active.session.lock().await;
    session.require_mode(Mode::Learn)?;

    let advance = session.next_learn(state.config.quiz.option_count)?;
    if advance.wrapped {
        tracing::info!("Session {} finished a pass over {} words", active.id, session.word_set.len());
    }

    let question = QuestionView::from(session.learn_question(state.config.quiz.option_count)?);
    let marked = session.is_marked(&question.word);

    Ok(Json(LearnView {
        question,
        position: advance.cursor + 1,
        total: session.word_set.len(),
        marked,
        message: advance.wrapped.then(|| WRAPPED_MESSAGE.to_string()),
        warnings: Vec::new(),
    }))
}

/// Flip the checklist mark on the current word
pub async fn toggle_mark(
    active: ActiveSession,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MarkResponse>, ApiError> {
    let mut session = active.session.lock().await;
    session.require_mode(Mode::Learn)?;

    let load_warning = session.ensure_marked_loaded(state.store.as_ref()).await;
    let (word, marked) = session.toggle_current_mark(&timestamp())?;
    let save_warning = session.save_marked(state.store.as_ref()).await;

    tracing::debug!("Session {} marked {}: {}", active.id, word, marked);

    Ok(Json(MarkResponse {
        word,
        marked,
        marked_count: session.marked.as_ref().map_or(0, |m| m.len()),
        warnings: warnings([load_warning, save_warning]),
    }))
}
