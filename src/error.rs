use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Every failure the data layer can produce.
///
/// The three remote kinds are kept apart so callers can tell "no response"
/// from "bad response" from "unreadable response".
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("network request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("server responded with status {status}")]
    Server { status: u16 },

    #[error("unexpected response format: {0}")]
    Decoding(#[from] serde_json::Error),

    #[error("local storage failure: {0}")]
    Store(#[from] sea_orm::DbErr),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
