use std::collections::HashMap;

use crate::models::{MovieId, MovieRecord};

/// Immutable table of known movies, in similarity-matrix order
#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<MovieRecord>,
    by_title: HashMap<String, usize>,
}

impl Catalog {
    /// Builds the catalog from `(movie_id, title)` rows; row `i` gets catalog index `i`.
    ///
    /// Titles are the lookup key. When a title repeats, the first row keeps it.
    pub fn new(rows: Vec<(MovieId, String)>) -> Self {
        let mut records = Vec::with_capacity(rows.len());
        let mut by_title = HashMap::with_capacity(rows.len());
        let mut duplicates = 0usize;

        for (catalog_index, (movie_id, title)) in rows.into_iter().enumerate() {
            if by_title.contains_key(&title) {
                duplicates += 1;
            } else {
                by_title.insert(title.clone(), catalog_index);
            }
            records.push(MovieRecord {
                catalog_index,
                movie_id,
                title,
            });
        }

        if duplicates > 0 {
            tracing::warn!(
                duplicates,
                "Catalog contains duplicate titles; lookups resolve to the first occurrence"
            );
        }

        Self { records, by_title }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, catalog_index: usize) -> Option<&MovieRecord> {
        self.records.get(catalog_index)
    }

    /// Exact, case-sensitive title lookup
    pub fn find_by_title(&self, title: &str) -> Option<&MovieRecord> {
        self.by_title
            .get(title)
            .and_then(|&index| self.records.get(index))
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.title.as_str())
    }
}
