use std::sync::Arc;

use axum::{body::Bytes, extract::State, Extension, Json};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{RecommendRequest, RecommendResponse},
    routes::AppState,
};

pub const NO_MOVIE_PROVIDED: &str = "no movie provided";

/// Handler for recommendations endpoint
///
/// The body is parsed by hand so that any malformed payload (bad JSON, wrong
/// content type, non-string `movie`) gets the same 400 as a missing field.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    body: Bytes,
) -> AppResult<Json<RecommendResponse>> {
    let movie = parse_movie(&body)
        .ok_or_else(|| AppError::InvalidInput(NO_MOVIE_PROVIDED.to_string()))?;

    tracing::info!(
        request_id = %request_id,
        movie = %movie,
        "Processing recommendation request"
    );

    let result = state
        .recommender
        .recommend(&movie, state.recommendation_count)
        .await
        .map_err(|e| {
            tracing::warn!(request_id = %request_id, error = %e, "Recommendation failed");
            e
        })?;

    Ok(Json(result.into()))
}

fn parse_movie(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<RecommendRequest>(body)
        .ok()?
        .movie
        .filter(|movie| !movie.is_empty())
}
