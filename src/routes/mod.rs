use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{providers::TmdbClient, Recommender},
    store::Catalog,
};

pub mod movies;
pub mod recommendations;
pub mod titles;

/// Shared, read-only application context built once at startup
pub struct AppState {
    pub recommender: Recommender,
    pub tmdb: Arc<TmdbClient>,
    /// Number of results returned by `/api/recommend`
    pub recommendation_count: usize,
    pub static_dir: PathBuf,
    pub poster_dir: PathBuf,
}

impl AppState {
    pub fn catalog(&self) -> &Catalog {
        self.recommender.catalog()
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let posters = ServeDir::new(&state.poster_dir);
    let assets = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(titles::index))
        .route("/search", get(titles::search))
        .route("/api/recommend", post(recommendations::recommend))
        .route("/movie/:id", get(movies::details))
        .nest_service("/posters", posters)
        .nest_service("/static", assets)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
