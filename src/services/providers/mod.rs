//! Poster resolution abstraction
//!
//! The recommender only needs "movie id in, displayable image reference out".
//! Implementations own their failure handling: `resolve` never errors, it
//! degrades to a local file, a remote URL, or the `NO_POSTER` sentinel.
use std::sync::Arc;

use crate::models::{MovieId, NO_POSTER};

pub mod retry;
pub mod tmdb;

pub use retry::RetryPolicy;
pub use tmdb::{TmdbClient, TmdbPosterResolver};

/// Trait for poster providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterResolver: Send + Sync {
    /// Resolve a movie id to a displayable poster reference
    async fn resolve(&self, movie_id: &MovieId) -> String;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Resolves posters for several movies in parallel, preserving input order
///
/// Each id gets its own task, so a panic while resolving one poster only
/// costs that slot: it falls back to `NO_POSTER` and the rest are unaffected.
pub async fn resolve_posters(
    resolver: Arc<dyn PosterResolver>,
    movie_ids: Vec<MovieId>,
) -> Vec<String> {
    let mut tasks = Vec::with_capacity(movie_ids.len());

    for movie_id in movie_ids {
        let resolver = resolver.clone();
        let task = tokio::spawn(async move { resolver.resolve(&movie_id).await });
        tasks.push(task);
    }

    let mut posters = Vec::with_capacity(tasks.len());
    let mut failures = 0usize;

    for task in tasks {
        match task.await {
            Ok(poster) => posters.push(poster),
            Err(e) => {
                tracing::error!(error = %e, provider = resolver.name(), "Poster task join error");
                failures += 1;
                posters.push(NO_POSTER.to_string());
            }
        }
    }

    if failures > 0 {
        tracing::warn!(
            success_count = posters.len() - failures,
            error_count = failures,
            "Partial poster resolution failure"
        );
    }

    posters
}
