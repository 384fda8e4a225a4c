use std::cmp::Ordering;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult, LoadError},
    models::{MovieId, MovieRecord, Recommendation, RecommendationResult},
    services::providers::{resolve_posters, PosterResolver},
    store::{Catalog, SimilarityMatrix},
};

/// Top-K similarity recommender over the precomputed matrix
///
/// Catalog and matrix are read-only after startup.
#[derive(Clone)]
pub struct Recommender {
    catalog: Arc<Catalog>,
    matrix: Arc<SimilarityMatrix>,
    posters: Arc<dyn PosterResolver>,
}

impl Recommender {
    pub fn new(
        catalog: Arc<Catalog>,
        matrix: Arc<SimilarityMatrix>,
        posters: Arc<dyn PosterResolver>,
    ) -> Result<Self, LoadError> {
        if matrix.size() != catalog.len() {
            return Err(LoadError::DimensionMismatch {
                catalog: catalog.len(),
                matrix: matrix.size(),
            });
        }

        Ok(Self {
            catalog,
            matrix,
            posters,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Ranks the `k` movies most similar to `title`, without resolving posters
    pub fn rank(&self, title: &str, k: usize) -> AppResult<Vec<&MovieRecord>> {
        if k == 0 {
            return Err(AppError::InvalidInput(
                "number of recommendations must be at least 1".to_string(),
            ));
        }

        let query = self
            .catalog
            .find_by_title(title)
            .ok_or_else(|| AppError::NotFound(format!("Movie not found: {}", title)))?;

        let scores = self.matrix.row(query.catalog_index).ok_or_else(|| {
            AppError::Internal(format!(
                "no similarity row for catalog index {}",
                query.catalog_index
            ))
        })?;

        top_k(scores, query.catalog_index, k)
            .into_iter()
            .map(|(index, _)| {
                self.catalog.get(index).ok_or_else(|| {
                    AppError::Internal(format!("no catalog entry for index {}", index))
                })
            })
            .collect()
    }

    /// Recommends `k` movies similar to `title`, with posters
    pub async fn recommend(&self, title: &str, k: usize) -> AppResult<RecommendationResult> {
        let ranked = self.rank(title, k)?;

        let movie_ids: Vec<MovieId> = ranked.iter().map(|r| r.movie_id.clone()).collect();
        let posters = resolve_posters(self.posters.clone(), movie_ids).await;

        let items: Vec<Recommendation> = ranked
            .into_iter()
            .zip(posters)
            .map(|(record, poster)| Recommendation {
                title: record.title.clone(),
                movie_id: record.movie_id.clone(),
                poster,
            })
            .collect();

        tracing::info!(
            title = %title,
            requested = k,
            results = items.len(),
            provider = self.posters.name(),
            "Recommendations computed"
        );

        Ok(RecommendationResult { items })
    }
}

/// Returns the `k` best `(column, score)` pairs of `scores`, skipping column `exclude`
///
/// Order is score descending, NaN last, equal scores by ascending column.
/// The comparator is total, so the result never depends on sort internals.
pub fn top_k(scores: &[f32], exclude: usize, k: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| compare_scores(b.1, a.1).then_with(|| a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .filter(|(column, _)| *column != exclude)
        .take(k)
        .collect()
}

fn compare_scores(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        // -0.0 and 0.0 are the same score
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}
