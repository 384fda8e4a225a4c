use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding `movie_dict.json` and the similarity matrix
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory served under `/static`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Directory where downloaded posters are cached, served under `/posters`
    #[serde(default = "default_poster_cache_dir")]
    pub poster_cache_dir: PathBuf,

    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Prefix prepended to TMDB `poster_path` values
    #[serde(default = "default_tmdb_image_base")]
    pub tmdb_image_base: String,

    /// Timeout for TMDB metadata requests, in seconds
    #[serde(default = "default_tmdb_timeout_secs")]
    pub tmdb_timeout_secs: u64,

    /// Timeout for poster image downloads, in seconds
    #[serde(default = "default_tmdb_image_timeout_secs")]
    pub tmdb_image_timeout_secs: u64,

    /// Retries after the first attempt on transient TMDB failures
    #[serde(default = "default_tmdb_max_retries")]
    pub tmdb_max_retries: u32,

    /// Initial retry backoff in milliseconds, doubled per attempt
    #[serde(default = "default_tmdb_backoff_ms")]
    pub tmdb_backoff_ms: u64,

    /// Number of recommendations returned by `/api/recommend`
    #[serde(default = "default_recommendation_count")]
    pub recommendation_count: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_poster_cache_dir() -> PathBuf {
    PathBuf::from("static/posters")
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_tmdb_timeout_secs() -> u64 {
    6
}

fn default_tmdb_image_timeout_secs() -> u64 {
    8
}

fn default_tmdb_max_retries() -> u32 {
    3
}

fn default_tmdb_backoff_ms() -> u64 {
    400
}

fn default_recommendation_count() -> usize {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn tmdb_timeout(&self) -> Duration {
        Duration::from_secs(self.tmdb_timeout_secs)
    }

    pub fn tmdb_image_timeout(&self) -> Duration {
        Duration::from_secs(self.tmdb_image_timeout_secs)
    }

    pub fn tmdb_backoff(&self) -> Duration {
        Duration::from_millis(self.tmdb_backoff_ms)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
