use serde::{Deserialize, Serialize};

// ============================================================================
// TMDB API Types
// ============================================================================

/// Subset of the TMDB `/movie/{id}` response we care about
///
/// Every field is optional: TMDB omits or nulls fields for obscure titles and
/// callers fall back to defaults rather than rejecting the whole payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbMovie {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub spoken_languages: Option<Vec<TmdbLanguage>>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Option<Vec<TmdbGenre>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbLanguage {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    #[serde(default)]
    pub name: Option<String>,
}

/// TMDB `/movie/{id}/credits` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Option<Vec<TmdbCastMember>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
}

/// Movie details returned to the client by `GET /movie/:id`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: i64,
    pub title: Option<String>,
    pub overview: String,
    pub language: Option<String>,
    pub main_star: String,
    pub poster: String,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    pub genres: Vec<String>,
}

impl MovieDetails {
    pub const DEFAULT_OVERVIEW: &'static str = "No overview available.";
    pub const UNKNOWN_STAR: &'static str = "Unknown";

    /// Details with every field at its documented default
    pub fn fallback(id: i64) -> Self {
        Self {
            id,
            title: None,
            overview: Self::DEFAULT_OVERVIEW.to_string(),
            language: None,
            main_star: Self::UNKNOWN_STAR.to_string(),
            poster: super::NO_POSTER.to_string(),
            release_date: None,
            runtime: None,
            genres: Vec::new(),
        }
    }
}
