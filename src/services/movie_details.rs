use crate::{
    models::{MovieDetails, MovieId, TmdbCredits, TmdbMovie},
    services::providers::TmdbClient,
};

/// Builds best-effort movie details from TMDB
///
/// Details and credits are fetched concurrently and degrade independently:
/// a failed call leaves its fields at the `MovieDetails::fallback` defaults.
pub async fn movie_details(client: &TmdbClient, id: i64) -> MovieDetails {
    let movie_id = MovieId::Numeric(id);
    let (movie, credits) = tokio::join!(client.movie(&movie_id), client.credits(&movie_id));

    let mut details = MovieDetails::fallback(id);

    match movie {
        Ok(movie) => apply_movie(&mut details, movie, |path| client.image_url(path)),
        Err(e) => tracing::warn!(error = %e, movie_id = id, "Failed to fetch movie details"),
    }

    match credits {
        Ok(credits) => apply_credits(&mut details, credits),
        Err(e) => tracing::warn!(error = %e, movie_id = id, "Failed to fetch credits"),
    }

    details
}

fn apply_movie(details: &mut MovieDetails, movie: TmdbMovie, image_url: impl Fn(&str) -> String) {
    details.title = non_empty(movie.title).or(non_empty(movie.original_title));

    if let Some(overview) = movie.overview.filter(|o| !o.trim().is_empty()) {
        details.overview = overview;
    }

    let languages: Vec<String> = movie
        .spoken_languages
        .unwrap_or_default()
        .into_iter()
        .filter_map(|l| l.name.filter(|n| !n.is_empty()))
        .collect();
    details.language = if languages.is_empty() {
        movie.original_language
    } else {
        Some(languages.join(", "))
    };

    if let Some(path) = movie.poster_path.filter(|p| !p.is_empty()) {
        details.poster = image_url(&path);
    }

    details.release_date = movie.release_date;
    details.runtime = movie.runtime;
    details.genres = movie
        .genres
        .unwrap_or_default()
        .into_iter()
        .filter_map(|g| g.name.filter(|n| !n.is_empty()))
        .collect();
}

fn apply_credits(details: &mut MovieDetails, credits: TmdbCredits) {
    let lead = credits
        .cast
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|member| non_empty(member.name).or(non_empty(member.original_name)));

    if let Some(name) = lead {
        details.main_star = name;
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TmdbCastMember, NO_POSTER};
    use crate::services::providers::RetryPolicy;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TmdbClient {
        TmdbClient::new(
            "test_key".to_string(),
            server.uri(),
            "https://image.tmdb.org/t/p/w500".to_string(),
        )
        .with_retry_policy(RetryPolicy {
            max_retries: 1,
            initial_backoff: Duration::from_millis(1),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_full_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/603"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "The Matrix",
                "overview": "A hacker learns the truth.",
                "spoken_languages": [{"name": "English"}, {"name": ""}, {"name": "Deutsch"}],
                "original_language": "en",
                "poster_path": "/matrix.jpg",
                "release_date": "1999-03-30",
                "runtime": 136,
                "genres": [{"name": "Action"}, {"name": "Science Fiction"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/movie/603/credits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cast": [{"name": "Keanu Reeves"}, {"name": "Laurence Fishburne"}]
            })))
            .mount(&server)
            .await;

        let details = movie_details(&client_for(&server), 603).await;

        assert_eq!(details.id, 603);
        assert_eq!(details.title.as_deref(), Some("The Matrix"));
        assert_eq!(details.overview, "A hacker learns the truth.");
        assert_eq!(details.language.as_deref(), Some("English, Deutsch"));
        assert_eq!(details.main_star, "Keanu Reeves");
        assert_eq!(details.poster, "https://image.tmdb.org/t/p/w500/matrix.jpg");
        assert_eq!(details.release_date.as_deref(), Some("1999-03-30"));
        assert_eq!(details.runtime, Some(136));
        assert_eq!(details.genres, vec!["Action", "Science Fiction"]);
    }

    #[tokio::test]
    async fn test_sparse_details_use_fallbacks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "original_title": "Le Film",
                "overview": "",
                "spoken_languages": [],
                "original_language": "fr"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/movie/42/credits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cast": [{"name": null, "original_name": "Jean Dupont"}]
            })))
            .mount(&server)
            .await;

        let details = movie_details(&client_for(&server), 42).await;

        assert_eq!(details.title.as_deref(), Some("Le Film"));
        assert_eq!(details.overview, MovieDetails::DEFAULT_OVERVIEW);
        assert_eq!(details.language.as_deref(), Some("fr"));
        assert_eq!(details.main_star, "Jean Dupont");
        assert_eq!(details.poster, NO_POSTER);
        assert!(details.genres.is_empty());
    }

    #[test]
    fn test_empty_strings_fall_back_to_original_names() {
        let mut details = MovieDetails::fallback(5);

        apply_movie(
            &mut details,
            TmdbMovie {
                title: Some(String::new()),
                original_title: Some("Der Film".to_string()),
                ..Default::default()
            },
            |path| path.to_string(),
        );
        apply_credits(
            &mut details,
            TmdbCredits {
                cast: Some(vec![TmdbCastMember {
                    name: Some(String::new()),
                    original_name: Some("Hans Schmidt".to_string()),
                }]),
            },
        );

        assert_eq!(details.title.as_deref(), Some("Der Film"));
        assert_eq!(details.main_star, "Hans Schmidt");
    }

    #[test]
    fn test_all_empty_names_keep_defaults() {
        let mut details = MovieDetails::fallback(5);

        apply_movie(
            &mut details,
            TmdbMovie {
                title: Some(String::new()),
                original_title: Some(String::new()),
                ..Default::default()
            },
            |path| path.to_string(),
        );
        apply_credits(
            &mut details,
            TmdbCredits {
                cast: Some(vec![TmdbCastMember {
                    name: Some(String::new()),
                    original_name: None,
                }]),
            },
        );

        assert_eq!(details.title, None);
        assert_eq!(details.main_star, MovieDetails::UNKNOWN_STAR);
    }

    #[tokio::test]
    async fn test_upstream_failure_degrades_each_part() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/7"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/movie/7/credits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cast": [{"name": "Someone"}]
            })))
            .mount(&server)
            .await;

        let details = movie_details(&client_for(&server), 7).await;

        assert_eq!(details.title, None);
        assert_eq!(details.overview, MovieDetails::DEFAULT_OVERVIEW);
        assert_eq!(details.poster, NO_POSTER);
        assert_eq!(details.main_star, "Someone");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_returns_fallback() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        drop(server);

        let details = movie_details(&client, 1).await;
        assert_eq!(details, MovieDetails::fallback(1));
    }
}
