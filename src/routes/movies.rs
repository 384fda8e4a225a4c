use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::MovieDetails,
    routes::AppState,
    services::movie_details,
};

/// Handler for movie details; upstream failures degrade to default fields
///
/// Only non-negative integer ids are accepted.
pub async fn details(
    State(state): State<Arc<AppState>>,
    id: Result<Path<u32>, PathRejection>,
) -> AppResult<Json<MovieDetails>> {
    let Path(id) = id.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected movie id");
        AppError::InvalidInput("invalid movie id".to_string())
    })?;

    Ok(Json(
        movie_details::movie_details(&state.tmdb, i64::from(id)).await,
    ))
}
