pub mod catalog;
pub mod loader;
pub mod matrix;
pub mod poster_cache;

pub use catalog::Catalog;
pub use loader::{load_dataset, Dataset};
pub use matrix::SimilarityMatrix;
pub use poster_cache::PosterCache;
