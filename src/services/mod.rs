pub mod movie_details;
pub mod providers;
pub mod recommendations;
pub mod title_search;

pub use recommendations::Recommender;
