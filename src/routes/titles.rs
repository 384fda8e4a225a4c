use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{routes::AppState, services::title_search};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// Handler for the index: every catalog title, in catalog order
pub async fn index(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.catalog().titles().map(String::from).collect())
}

/// Handler for title search endpoint
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<String>> {
    let titles = title_search::search_titles(state.catalog(), &params.q);
    tracing::debug!(query = %params.q, results = titles.len(), "Title search completed");
    Json(titles)
}
