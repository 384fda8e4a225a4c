use std::io;
use std::path::PathBuf;

use uuid::Uuid;

use crate::models::MovieId;

/// URL prefix under which cached posters are served
pub const POSTER_ROUTE: &str = "/posters";

/// On-disk cache of poster images, one `<movie_id>.jpg` file per movie
///
/// Concurrent requests for the same uncached movie may both download and
/// write the poster. Each write lands in a uniquely named temp file and is
/// renamed over the final name, so the last writer wins and readers never
/// observe a half-written image.
#[derive(Debug, Clone)]
pub struct PosterCache {
    dir: PathBuf,
}

impl PosterCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates the cache directory if it does not exist yet
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// File name for a movie's poster, or `None` if the id is unsafe as a path component
    pub fn file_name(movie_id: &MovieId) -> Option<String> {
        let key = movie_id.to_string();
        let safe = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        safe.then(|| format!("{}.jpg", key))
    }

    /// Public reference for a cached file name
    pub fn reference(file_name: &str) -> String {
        format!("{}/{}", POSTER_ROUTE, file_name)
    }

    /// Returns the public reference if the poster is already cached
    pub async fn lookup(&self, movie_id: &MovieId) -> Option<String> {
        let file_name = Self::file_name(movie_id)?;
        match tokio::fs::try_exists(self.dir.join(&file_name)).await {
            Ok(true) => Some(Self::reference(&file_name)),
            Ok(false) => None,
            Err(e) => {
                tracing::warn!(error = %e, movie_id = %movie_id, "Poster cache lookup failed");
                None
            }
        }
    }

    /// Writes poster bytes atomically and returns the public reference
    pub async fn store(&self, movie_id: &MovieId, bytes: &[u8]) -> io::Result<String> {
        let file_name = Self::file_name(movie_id).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("movie id {} cannot be used as a file name", movie_id),
            )
        })?;

        let final_path = self.dir.join(&file_name);
        let temp_path = self
            .dir
            .join(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

        let written = match tokio::fs::write(&temp_path, bytes).await {
            Ok(()) => tokio::fs::rename(&temp_path, &final_path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            // a failed write can still leave a partial temp file behind
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }

        tracing::debug!(movie_id = %movie_id, path = %final_path.display(), "Cached poster");
        Ok(Self::reference(&file_name))
    }
}
