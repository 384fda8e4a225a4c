/// TMDB API provider
///
/// Used for two things:
/// 1. Poster resolution: /movie/{id} → `poster_path` → image download into the poster cache
/// 2. Movie details: /movie/{id} and /movie/{id}/credits
///
/// All requests go through `send_with_retry`, so transient 429/5xx and
/// connection failures are retried a bounded number of times.
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{MovieId, TmdbCredits, TmdbMovie, NO_POSTER},
    services::providers::{retry::send_with_retry, PosterResolver, RetryPolicy},
    store::PosterCache,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6);
const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(8);
const LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_base: String,
    timeout: Duration,
    image_timeout: Duration,
    retry: RetryPolicy,
}

impl TmdbClient {
    pub fn new(api_key: String, api_url: String, image_base: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            image_base: image_base.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            image_timeout: DEFAULT_IMAGE_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.tmdb_image_base.clone(),
        )
        .with_timeouts(config.tmdb_timeout(), config.tmdb_image_timeout())
        .with_retry_policy(RetryPolicy {
            max_retries: config.tmdb_max_retries,
            initial_backoff: config.tmdb_backoff(),
            ..Default::default()
        })
    }

    pub fn with_timeouts(mut self, timeout: Duration, image_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.image_timeout = image_timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Full image URL for a TMDB `poster_path`
    pub fn image_url(&self, poster_path: &str) -> String {
        if poster_path.starts_with('/') {
            format!("{}{}", self.image_base, poster_path)
        } else {
            format!("{}/{}", self.image_base, poster_path)
        }
    }

    /// Fetch movie metadata
    pub async fn movie(&self, movie_id: &MovieId) -> AppResult<TmdbMovie> {
        self.get_json(&format!("/movie/{}", movie_id), &[("language", LANGUAGE)])
            .await
    }

    /// Fetch cast and crew
    pub async fn credits(&self, movie_id: &MovieId) -> AppResult<TmdbCredits> {
        self.get_json(&format!("/movie/{}/credits", movie_id), &[])
            .await
    }

    /// Download raw image bytes
    pub async fn download_image(&self, url: &str) -> AppResult<Vec<u8>> {
        let response = send_with_retry(&self.retry, || {
            self.http_client.get(url).timeout(self.image_timeout)
        })
        .await?;

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(AppError::ExternalApi(format!("Empty image body from {}", url)));
        }
        Ok(bytes.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        extra_query: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = send_with_retry(&self.retry, || {
            self.http_client
                .get(&url)
                .query(&[("api_key", self.api_key.as_str())])
                .query(extra_query)
                .timeout(self.timeout)
        })
        .await?;

        let response_text = response.text().await?;

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::debug!(error = %e, path = %path, response = %response_text, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

/// Poster resolver backed by TMDB and the on-disk poster cache
#[derive(Clone)]
pub struct TmdbPosterResolver {
    client: Arc<TmdbClient>,
    cache: PosterCache,
}

impl TmdbPosterResolver {
    pub fn new(client: Arc<TmdbClient>, cache: PosterCache) -> Self {
        Self { client, cache }
    }
}

#[async_trait::async_trait]
impl PosterResolver for TmdbPosterResolver {
    async fn resolve(&self, movie_id: &MovieId) -> String {
        if PosterCache::file_name(movie_id).is_none() {
            tracing::warn!(movie_id = %movie_id, "Movie id is not usable for poster lookup");
            return NO_POSTER.to_string();
        }

        if let Some(reference) = self.cache.lookup(movie_id).await {
            tracing::debug!(movie_id = %movie_id, "Poster cache hit");
            return reference;
        }

        let movie = match self.client.movie(movie_id).await {
            Ok(movie) => movie,
            Err(e) => {
                tracing::warn!(error = %e, movie_id = %movie_id, "TMDB metadata fetch failed");
                // another request may have cached it in the meantime
                return self
                    .cache
                    .lookup(movie_id)
                    .await
                    .unwrap_or_else(|| NO_POSTER.to_string());
            }
        };

        let Some(poster_path) = movie.poster_path.filter(|p| !p.is_empty()) else {
            return NO_POSTER.to_string();
        };

        let image_url = self.client.image_url(&poster_path);

        let bytes = match self.client.download_image(&image_url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, url = %image_url, "Failed to download poster image");
                return image_url;
            }
        };

        match self.cache.store(movie_id, &bytes).await {
            Ok(reference) => {
                tracing::info!(movie_id = %movie_id, provider = "tmdb", "Poster cached");
                reference
            }
            Err(e) => {
                tracing::warn!(error = %e, movie_id = %movie_id, "Failed to write poster to cache");
                image_url
            }
        }
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
