//! Composition root: builds the recommendation engine from configuration.
//!
//! Every collaborator is constructed explicitly here and injected into the
//! orchestrator; nothing holds ambient global state.

use attune_core::{Config, EmbeddingBackend};
use catalog::{MoodCatalog, TmdbCatalog, YouTubeCatalog};
use embedding::{EmbeddingCache, EmbeddingProvider, GeminiProvider, OpenAiProvider, ResilientProvider};
use engine::{MemoryHistory, MoodHistory, Recommender};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use vector::{MediaIndex, MediaStore, VectorStore};

#[derive(Error, Debug)]
pub enum DaemonError {
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
  #[error("Vector store error: {0}")]
  Store(#[from] vector::StoreError),
  #[error("Server shutdown")]
  Shutdown,
}

/// Wired application state shared by all request handlers
pub struct App {
  pub recommender: Arc<Recommender>,
  pub history: Arc<MemoryHistory>,
  pub cache: Arc<EmbeddingCache>,
}

/// Build the full engine from config.
///
/// Missing credentials degrade the corresponding source at request time
/// instead of failing startup; the engine absorbs those errors per source.
pub async fn bootstrap(config: &Config) -> Result<App, DaemonError> {
  let provider = build_provider(config);
  let cache = Arc::new(EmbeddingCache::new(provider));

  let index_path = config.resolve_data_dir().join("media.lancedb");
  let index = MediaIndex::open_at_path(index_path, config.embedding.dimensions).await?;
  let store: Arc<dyn VectorStore> = Arc::new(MediaStore::new(index, Arc::clone(&cache)));

  let shorts: Arc<dyn MoodCatalog> = Arc::new(match config.catalog.resolve_youtube_key() {
    Some(key) => YouTubeCatalog::new(key),
    None => {
      warn!("No YouTube API key configured; short-form catalog will degrade to empty");
      YouTubeCatalog::from_env()
    }
  });
  let films: Arc<dyn MoodCatalog> = Arc::new(match config.catalog.resolve_tmdb_key() {
    Some(key) => TmdbCatalog::new(key),
    None => {
      warn!("No TMDB API key configured; film catalog will degrade to empty");
      TmdbCatalog::from_env()
    }
  });

  let history = Arc::new(MemoryHistory::new());
  let recommender = Arc::new(
    Recommender::new(
      Arc::clone(&history) as Arc<dyn MoodHistory>,
      Arc::clone(&store),
      shorts,
      films,
    )
    .with_search_config(config.search.clone())
    .with_catalog_config(config.catalog.clone()),
  );

  info!(
    "Engine ready: {} dims via {}, data at {:?}",
    config.embedding.dimensions,
    cache.model_id(),
    config.resolve_data_dir()
  );

  Ok(App {
    recommender,
    history,
    cache,
  })
}

fn build_provider(config: &Config) -> Arc<dyn EmbeddingProvider> {
  let api_key = config.embedding.resolve_api_key().unwrap_or_else(|| {
    warn!("No embedding API key configured; vector search and re-ranking will degrade");
    String::new()
  });

  match config.embedding.backend {
    EmbeddingBackend::Gemini => Arc::new(ResilientProvider::new(
      GeminiProvider::new(api_key).with_model(&config.embedding.model, config.embedding.dimensions),
    )),
    EmbeddingBackend::OpenAi => Arc::new(ResilientProvider::new(
      OpenAiProvider::new(api_key).with_model(&config.embedding.model, config.embedding.dimensions),
    )),
  }
}
