pub mod adapter;
pub mod error;
pub mod moods;
pub mod tmdb;
pub mod youtube;

pub use adapter::MoodCatalog;
pub use error::{CatalogError, Result};
pub use moods::{MovieParams, QUERIES_PER_MOOD, ShortFormQueries, movie_params, short_form_queries};
pub use tmdb::TmdbCatalog;
pub use youtube::{YouTubeCatalog, merge_batches};
