use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

pub const PASSWORD_RESET_REQUEST_PATH: &str = "/api/user/auth/reset-password/request/email";

#[derive(Deserialize)]
pub struct ResetPasswordEmail {
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// What the server saw for one accepted call, exposed at `/__requests` so
/// tests can check what actually went over the wire.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub email: String,
}

pub type RequestLog = Arc<RwLock<Vec<RecordedRequest>>>;

pub fn app() -> Router {
    app_with_log(RequestLog::default())
}

pub fn app_with_log(log: RequestLog) -> Router {
    Router::new()
        .route(PASSWORD_RESET_REQUEST_PATH, post(request_password_reset))
        .route("/__requests", get(list_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(log)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_log(listener, RequestLog::default()).await
}

pub async fn run_with_log(listener: TcpListener, log: RequestLog) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_log(log)).await
}

async fn request_password_reset(
    State(log): State<RequestLog>,
    headers: HeaderMap,
    Json(input): Json<ResetPasswordEmail>,
) -> (StatusCode, Json<Message>) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    log.write().await.push(RecordedRequest {
        path: PASSWORD_RESET_REQUEST_PATH.to_string(),
        authorization,
        email: input.email.clone(),
    });

    if !is_plausible_email(&input.email) {
        tracing::info!(email = %input.email, "rejected password reset request");
        return (
            StatusCode::BAD_REQUEST,
            Json(Message {
                message: "invalid email".to_string(),
            }),
        );
    }

    tracing::info!(email = %input.email, "password reset link sent");
    (
        StatusCode::OK,
        Json(Message {
            message: "password reset link sent".to_string(),
        }),
    )
}

async fn list_requests(State(log): State<RequestLog>) -> Json<Vec<RecordedRequest>> {
    Json(log.read().await.clone())
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_payload_requires_email() {
        let result: Result<ResetPasswordEmail, _> = serde_json::from_str(r#"{}"#);
        assert!(result.is_err());
    }

    #[test]
    fn reset_payload_parses_email() {
        let input: ResetPasswordEmail =
            serde_json::from_str(r#"{"email":"user@example.com"}"#).unwrap();
        assert_eq!(input.email, "user@example.com");
    }

    #[test]
    fn email_plausibility() {
        assert!(is_plausible_email("user@example.com"));
        assert!(!is_plausible_email("user.example.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("user@localhost"));
    }

    #[test]
    fn recorded_request_serializes_missing_authorization_as_null() {
        let rec = RecordedRequest {
            path: PASSWORD_RESET_REQUEST_PATH.to_string(),
            authorization: None,
            email: "a@b.c".to_string(),
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json["authorization"].is_null());
        assert_eq!(json["email"], "a@b.c");
    }
}
