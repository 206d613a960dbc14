pub mod config;
pub mod error;
pub mod media;
pub mod mood;
pub mod recommendation;

pub use config::{
  CatalogConfig, Config, EmbeddingBackend, EmbeddingConfig, SearchConfig, default_config_dir, default_data_dir,
};
pub use error::{Error, Result};
pub use media::{CandidateItem, MediaSource, MediaType, MovieItem, ShortFormItem, record_id};
pub use mood::{MoodSignal, MoodSignalId};
pub use recommendation::{RecommendationResult, SearchMethod, round_similarity};
