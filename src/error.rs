use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(reqwest::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Strips the request URL, which carries the TMDB API key in its query string
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::HttpClient(error.without_url())
    }
}

/// Serialized formats the startup data may arrive in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Bincode,
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFormat::Json => write!(f, "json"),
            DataFormat::Bincode => write!(f, "bincode"),
        }
    }
}

/// Errors raised while loading the catalog and similarity matrix at startup.
///
/// Every variant is fatal: the server refuses to start rather than serve from
/// partial data. `Parse` is kept apart from the `*Missing` variants because a
/// file that exists but cannot be decoded points at corruption or a producer
/// version mismatch, not at a deployment that forgot to ship the data.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("catalog file not found: {}", .0.display())]
    CatalogMissing(PathBuf),

    #[error("no similarity matrix found in {} (looked for {})", .dir.display(), .candidates.join(", "))]
    MatrixMissing {
        dir: PathBuf,
        candidates: Vec<String>,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {} as {format}: {reason}", .path.display())]
    Parse {
        path: PathBuf,
        format: DataFormat,
        reason: String,
    },

    #[error("malformed similarity matrix: {0}")]
    Shape(String),

    #[error("similarity matrix is {matrix}x{matrix} but catalog has {catalog} movies")]
    DimensionMismatch { catalog: usize, matrix: usize },
}
