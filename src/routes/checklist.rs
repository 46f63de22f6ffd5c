use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::QuizError,
    models::{MarkedWord, Mode},
    routes::{warnings, ApiError},
    session::ActiveSession,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ChecklistQuery {
    pub day: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChecklistResponse {
    pub days: Vec<String>,
    pub day: String,
    pub words: Vec<MarkedWord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub removed: String,
    pub remaining: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Marked words grouped by Day. Shows the requested Day, or the first one.
pub async fn list(
    active: ActiveSession,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChecklistQuery>,
) -> Result<Json<ChecklistResponse>, ApiError> {
    let mut session = active.session.lock().await;
    session.require_mode(Mode::Checklist)?;

    let warning = session.ensure_marked_loaded(state.store.as_ref()).await;
    let marked = match session.marked.as_ref() {
        Some(marked) if !marked.is_empty() => marked,
        _ => return Err(ApiError::from(QuizError::NoMarkedWords).with_warnings(warnings([warning]))),
    };

    let days = marked.days();
    let day = match query.day {
        Some(day) if days.contains(&day) => day,
        _ => days.first().cloned().unwrap_or_default(),
    };
    let words: Vec<MarkedWord> = marked.for_day(&day).cloned().collect();

    Ok(Json(ChecklistResponse {
        days,
        day,
        words,
        warnings: warnings([warning]),
    }))
}

/// Unmark a word from the checklist
pub async fn remove(
    active: ActiveSession,
    State(state): State<Arc<AppState>>,
    Path(word): Path<String>,
) -> Result<Json<RemoveResponse>, ApiError> {
    let mut session = active.session.lock().await;
    session.require_mode(Mode::Checklist)?;

    let load_warning = session.ensure_marked_loaded(state.store.as_ref()).await;
    let removed = session
        .marked
        .as_mut()
        .is_some_and(|marked| marked.remove(&word));
    if !removed {
        return Err(ApiError {
            status: StatusCode::NOT_FOUND,
            message: format!("{} is not marked", word),
            warnings: warnings([load_warning]),
        });
    }

    let save_warning = session.save_marked(state.store.as_ref()).await;
    tracing::debug!("Session {} unmarked {}", active.id, word);

    Ok(Json(RemoveResponse {
        removed: word,
        remaining: session.marked.as_ref().map_or(0, |m| m.len()),
        warnings: warnings([load_warning, save_warning]),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TrackedWord, WordList};
    use crate::routes::test_support::*;
    use crate::storage::{self, FileStore, MemoryStore, MARKED_WORDS_FILE};
    use axum::http::Method;
    use serde_json::json;

    fn marked(day: &str, word: &str) -> TrackedWord {
        TrackedWord {
            day: day.to_string(),
            word: word.to_string(),
            meaning: format!("{} meaning", word),
            date: "2024-03-01 09:30:00".to_string(),
        }
    }

    async fn checklist_app(rows: Vec<TrackedWord>) -> (axum::Router, Arc<MemoryStore>, String) {
        let store = Arc::new(MemoryStore::new());
        if !rows.is_empty() {
            storage::save_list(store.as_ref(), MARKED_WORDS_FILE, &WordList::from_rows(rows))
                .await
                .unwrap();
        }
        let app = app(state_with(sample_vocabulary(), store.clone()));
        let id = new_session(&app).await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/session/navigate",
            Some(&id),
            Some(json!({"action": "open_checklist"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        (app, store, id)
    }

    #[tokio::test]
    async fn test_empty_checklist() {
        let (app, _, id) = checklist_app(Vec::new()).await;
        let (status, body) = send(&app, Method::GET, "/api/checklist", Some(&id), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "there are no marked words");
    }

    #[tokio::test]
    async fn test_checklist_groups_by_day() {
        let (app, _, id) = checklist_app(vec![
            marked("Day2", "Eat"),
            marked("Day1", "Run"),
            marked("Day2", "Drink"),
        ])
        .await;

        let (status, body) = send(&app, Method::GET, "/api/checklist", Some(&id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["days"], json!(["Day2", "Day1"]));
        assert_eq!(body["day"], "Day2");
        assert_eq!(body["words"].as_array().unwrap().len(), 2);
        assert_eq!(body["words"][1]["Word"], "Drink");

        let uri = "/api/checklist?day=Day1";
        let (_, body) = send(&app, Method::GET, uri, Some(&id), None).await;
        assert_eq!(body["day"], "Day1");
        assert_eq!(body["words"][0]["Word"], "Run");

        // Unknown days fall back to the first one
        let (_, body) = send(&app, Method::GET, "/api/checklist?day=Day9", Some(&id), None).await;
        assert_eq!(body["day"], "Day2");
    }

    #[tokio::test]
    async fn test_remove_last_word_deletes_file() {
        let (app, store, id) = checklist_app(vec![marked("Day1", "Run")]).await;

        let (status, _) = send(&app, Method::DELETE, "/api/checklist/Eat", Some(&id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::DELETE, "/api/checklist/Run", Some(&id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["remaining"], 0);
        assert!(store.load(MARKED_WORDS_FILE).await.unwrap().is_none());

        let (status, _) = send(&app, Method::GET, "/api/checklist", Some(&id), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
