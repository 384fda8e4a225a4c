use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::Display;

pub mod tmdb;

pub use tmdb::{MovieDetails, TmdbCastMember, TmdbCredits, TmdbGenre, TmdbLanguage, TmdbMovie};

/// Poster reference returned when no image could be resolved
pub const NO_POSTER: &str = "/static/no_poster.png";

/// External identifier of a movie (the TMDB id)
///
/// Catalog dumps are not always clean: ids show up as integers, as integral
/// floats, or as numeric strings. Anything that reads as an integer becomes
/// `Numeric`; everything else is kept verbatim in `Raw` so it can still be
/// echoed back to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MovieId {
    Numeric(i64),
    Raw(Value),
}

impl MovieId {
    pub fn from_value(value: Value) -> Self {
        match &value {
            Value::Number(n) => {
                if let Some(id) = n.as_i64() {
                    return MovieId::Numeric(id);
                }
                if let Some(f) = n.as_f64() {
                    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                        return MovieId::Numeric(f as i64);
                    }
                }
            }
            Value::String(s) => {
                if let Ok(id) = s.trim().parse::<i64>() {
                    return MovieId::Numeric(id);
                }
            }
            _ => {}
        }
        MovieId::Raw(value)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MovieId::Numeric(id) => Some(*id),
            MovieId::Raw(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for MovieId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(MovieId::from_value)
    }
}

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovieId::Numeric(id) => write!(f, "{}", id),
            MovieId::Raw(Value::String(s)) => write!(f, "{}", s),
            MovieId::Raw(other) => write!(f, "{}", other),
        }
    }
}

/// One row of the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    /// Row (and column) of this movie in the similarity matrix
    pub catalog_index: usize,
    pub movie_id: MovieId,
    pub title: String,
}

/// A single recommended movie with its resolved poster
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub movie_id: MovieId,
    pub poster: String,
}

/// Recommendations ranked by descending similarity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationResult {
    pub items: Vec<Recommendation>,
}

impl RecommendationResult {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.items.iter().map(|r| r.title.as_str()).collect()
    }
}

/// Request body of `POST /api/recommend`
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub movie: Option<String>,
}

/// Response of `POST /api/recommend`: three parallel arrays in rank order
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RecommendResponse {
    pub names: Vec<String>,
    pub posters: Vec<String>,
    pub ids: Vec<MovieId>,
}

impl From<RecommendationResult> for RecommendResponse {
    fn from(result: RecommendationResult) -> Self {
        let mut response = RecommendResponse {
            names: Vec::with_capacity(result.len()),
            posters: Vec::with_capacity(result.len()),
            ids: Vec::with_capacity(result.len()),
        };
        for item in result.items {
            response.names.push(item.title);
            response.posters.push(item.poster);
            response.ids.push(item.movie_id);
        }
        response
    }
}
