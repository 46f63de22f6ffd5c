pub mod checklist;
pub mod health;
pub mod home;
pub mod learn;
pub mod review;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;

use crate::{error::QuizError, AppState};

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/sessions",
            post(home::create_session).delete(home::end_session),
        )
        .route("/days", get(home::list_days))
        .route("/session", get(home::session_info))
        .route("/session/categories", post(home::select_categories))
        .route("/session/navigate", post(home::navigate))
        .route("/records", get(home::records))
        .route("/records/export", post(home::export_records))
        .route("/stats", get(home::stats))
        .route("/learn/current", get(learn::current))
        .route("/learn/answer", post(learn::answer))
        .route("/learn/next", post(learn::next))
        .route("/learn/reveal", get(learn::reveal))
        .route("/learn/mark", post(learn::toggle_mark))
        .route("/review/current", get(review::current))
        .route("/review/answer", post(review::answer))
        .route("/review/next", post(review::next))
        .route("/checklist", get(checklist::list))
        .route("/checklist/{word}", delete(checklist::remove))
}

/// Error body returned by every API handler
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

/// Handler error: a status, a message for the user and any storage warnings
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub warnings: Vec<String>,
}

impl ApiError {
    /// Attach storage warnings gathered before the failure
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        let status = match &err {
            e if e.is_data_absent() => StatusCode::UNPROCESSABLE_ENTITY,
            QuizError::NoActiveQuestion
            | QuizError::WrongMode { .. }
            | QuizError::InvalidTransition { .. } => StatusCode::CONFLICT,
            _ => {
                tracing::error!("Quiz invariant violated: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        ApiError {
            status,
            message: err.to_string(),
            warnings: Vec::new(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            warnings: self.warnings,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Collect the warnings that are present
pub(crate) fn warnings<const N: usize>(items: [Option<String>; N]) -> Vec<String> {
    items.into_iter().flatten().collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;
    use test_support::*;

    #[test]
    fn test_quiz_error_status_mapping() {
        assert_eq!(
            ApiError::from(QuizError::EmptySet).status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(QuizError::NoActiveQuestion).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(QuizError::CursorOutOfRange { cursor: 3, len: 1 }).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_warnings_skips_missing() {
        let collected = warnings([None, Some("a".to_string()), None]);
        assert_eq!(collected, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_health_route() {
        let app = app(sample_state());
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_session_required() {
        let app = app(sample_state());
        let (status, _) = send(&app, Method::GET, "/api/session", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let unknown = uuid::Uuid::new_v4().to_string();
        let (status, _) = send(&app, Method::GET, "/api/session", Some(&unknown), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_from_query_parameter() {
        let app = app(sample_state());
        let id = new_session(&app).await;
        let uri = format!("/api/session?session={}", id);
        let (status, body) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "home");
    }

    #[tokio::test]
    async fn test_full_learn_review_checklist_flow() {
        let state = sample_state();
        let app = app(state.clone());
        let id = new_session(&app).await;
        let sid = Some(id.as_str());

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/session/categories",
            sid,
            Some(json!({"days": ["Day1"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/session/navigate",
            sid,
            Some(json!({"action": "start_learning"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Miss the first word
        let (_, question) = send(&app, Method::GET, "/api/learn/current", sid, None).await;
        assert_eq!(question["word"], "Apple");
        let wrong = question["options"]
            .as_array()
            .unwrap()
            .iter()
            .find(|o| *o != "사과")
            .unwrap()
            .clone();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/learn/answer",
            sid,
            Some(json!({"selected": wrong})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "Incorrect");
        assert_eq!(body["correct_answer"], "사과");

        // Mark it too
        let (_, body) = send(&app, Method::POST, "/api/learn/mark", sid, None).await;
        assert_eq!(body["marked"], true);

        // Review it and get it right
        send(
            &app,
            Method::POST,
            "/api/session/navigate",
            sid,
            Some(json!({"action": "go_home"})),
        )
        .await;
        send(
            &app,
            Method::POST,
            "/api/session/navigate",
            sid,
            Some(json!({"action": "start_review"})),
        )
        .await;
        let (status, question) = send(&app, Method::GET, "/api/review/current", sid, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(question["word"], "Apple");
        let (_, body) = send(
            &app,
            Method::POST,
            "/api/review/answer",
            sid,
            Some(json!({"selected": "사과"})),
        )
        .await;
        assert_eq!(body["graduated"], true);
        assert_eq!(body["remaining"], 0);

        let (status, _) = send(&app, Method::POST, "/api/review/next", sid, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        // Checklist shows the marked word
        send(
            &app,
            Method::POST,
            "/api/session/navigate",
            sid,
            Some(json!({"action": "go_home"})),
        )
        .await;
        send(
            &app,
            Method::POST,
            "/api/session/navigate",
            sid,
            Some(json!({"action": "open_checklist"})),
        )
        .await;
        let (status, body) = send(&app, Method::GET, "/api/checklist", sid, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["day"], "Day1");
        assert_eq!(body["words"][0]["Word"], "Apple");

        let (_, records) = send(&app, Method::GET, "/api/records", sid, None).await;
        assert_eq!(records["records"].as_array().unwrap().len(), 2);

        let (_, stats) = send(&app, Method::GET, "/api/stats", sid, None).await;
        assert_eq!(stats["attempts"], 2);
        assert_eq!(stats["percent"], 50.0);
    }
}
