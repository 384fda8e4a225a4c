use std::collections::HashSet;

use crate::store::Catalog;

/// Maximum number of titles returned by a search
pub const MAX_SEARCH_RESULTS: usize = 20;

/// Case-insensitive substring search over catalog titles
///
/// Returns distinct titles in catalog order. A blank query matches nothing.
pub fn search_titles(catalog: &Catalog, query: &str) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    catalog
        .titles()
        .filter(|title| title.to_lowercase().contains(&needle))
        .filter(|title| seen.insert(*title))
        .take(MAX_SEARCH_RESULTS)
        .map(String::from)
        .collect()
}
