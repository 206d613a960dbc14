//! Configuration for the attune daemon and CLI.
//!
//! Config priority: explicit path > user config (~/.config/attune/config.toml) > defaults.
//! API keys may also come from the environment (GOOGLE_API_KEY, OPENAI_API_KEY,
//! YOUTUBE_API_KEY, TMDB_API_KEY).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

// ============================================================================
// Embedding Configuration
// ============================================================================

/// Embedding provider options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
  #[default]
  Gemini,
  OpenAi,
}

/// Embedding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
  /// Which embedding provider to use
  pub backend: EmbeddingBackend,

  /// Model name (e.g., "gemini-embedding-001", "text-embedding-3-small")
  pub model: String,

  /// Embedding dimensions (e.g., 768, 1536)
  pub dimensions: usize,

  /// API key override; falls back to GOOGLE_API_KEY / OPENAI_API_KEY
  #[serde(skip_serializing_if = "Option::is_none")]
  pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
  fn default() -> Self {
    Self {
      backend: EmbeddingBackend::Gemini,
      model: "gemini-embedding-001".to_string(),
      dimensions: 768,
      api_key: None,
    }
  }
}

impl EmbeddingConfig {
  /// Resolve the API key from config or environment
  pub fn resolve_api_key(&self) -> Option<String> {
    if let Some(ref key) = self.api_key {
      return Some(key.clone());
    }
    let var = match self.backend {
      EmbeddingBackend::Gemini => "GOOGLE_API_KEY",
      EmbeddingBackend::OpenAi => "OPENAI_API_KEY",
    };
    std::env::var(var).ok().filter(|k| !k.is_empty())
  }
}

// ============================================================================
// Catalog Configuration
// ============================================================================

/// Catalog search adapter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
  /// YouTube Data API key; falls back to YOUTUBE_API_KEY
  #[serde(skip_serializing_if = "Option::is_none")]
  pub youtube_api_key: Option<String>,

  /// TMDB API key; falls back to TMDB_API_KEY
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tmdb_api_key: Option<String>,

  /// Maximum videos returned per recommendation (default: 5)
  pub max_videos: usize,

  /// Maximum songs returned per recommendation (default: 5)
  pub max_songs: usize,

  /// Maximum movies returned per recommendation (default: 10)
  pub max_movies: usize,
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self {
      youtube_api_key: None,
      tmdb_api_key: None,
      max_videos: 5,
      max_songs: 5,
      max_movies: 10,
    }
  }
}

impl CatalogConfig {
  pub fn resolve_youtube_key(&self) -> Option<String> {
    self
      .youtube_api_key
      .clone()
      .or_else(|| std::env::var("YOUTUBE_API_KEY").ok())
      .filter(|k| !k.is_empty())
  }

  pub fn resolve_tmdb_key(&self) -> Option<String> {
    self
      .tmdb_api_key
      .clone()
      .or_else(|| std::env::var("TMDB_API_KEY").ok())
      .filter(|k| !k.is_empty())
  }
}

// ============================================================================
// Search Configuration
// ============================================================================

/// Retrieval and ranking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
  /// Nearest-neighbor candidates fetched per vector query (default: 20)
  pub top_k: usize,

  /// Per-bucket cap on returned items (default: 15)
  pub bucket_cap: usize,

  /// Whether keyword results are re-ranked by embedding similarity (default: true)
  pub rerank: bool,

  /// Timeout for each outbound call in seconds (default: 10)
  pub request_timeout_secs: u64,

  /// Maximum concurrent outbound calls during fan-out (default: 10)
  pub max_in_flight: usize,
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      top_k: 20,
      bucket_cap: 15,
      rerank: true,
      request_timeout_secs: 10,
      max_in_flight: 10,
    }
  }
}

impl SearchConfig {
  pub fn request_timeout(&self) -> std::time::Duration {
    std::time::Duration::from_secs(self.request_timeout_secs)
  }
}

// ============================================================================
// Main Configuration
// ============================================================================

/// attune configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Embedding provider settings
  pub embedding: EmbeddingConfig,

  /// Catalog adapter settings
  pub catalog: CatalogConfig,

  /// Retrieval settings
  pub search: SearchConfig,

  /// Data directory override (vector index lives here)
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data_dir: Option<PathBuf>,
}

impl Config {
  /// Load config from a specific TOML file
  pub fn load(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)?;
    toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
  }

  /// Load the user config if present, otherwise defaults
  pub fn load_or_default() -> Self {
    let path = default_config_dir().join("config.toml");
    if path.exists() {
      match Self::load(&path) {
        Ok(config) => return config,
        Err(e) => eprintln!("Ignoring invalid config {}: {}", path.display(), e),
      }
    }
    Self::default()
  }

  /// Directory holding the vector index
  pub fn resolve_data_dir(&self) -> PathBuf {
    self.data_dir.clone().unwrap_or_else(default_data_dir)
  }
}

/// Get the default base path for attune data
///
/// Respects the following environment variables (in order of precedence):
/// 1. ATTUNE_DATA_DIR - explicit data directory override
/// 2. XDG_DATA_HOME - standard XDG data home directory
/// 3. dirs::data_local_dir() - platform default
pub fn default_data_dir() -> PathBuf {
  if let Ok(dir) = std::env::var("ATTUNE_DATA_DIR") {
    return PathBuf::from(dir);
  }

  if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
    return PathBuf::from(xdg_data).join("attune");
  }

  dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("attune")
}

/// Get the default config directory
///
/// Respects the following environment variables (in order of precedence):
/// 1. ATTUNE_CONFIG_DIR - explicit config directory override
/// 2. XDG_CONFIG_HOME - standard XDG config home directory
/// 3. dirs::config_dir() - platform default
pub fn default_config_dir() -> PathBuf {
  if let Ok(dir) = std::env::var("ATTUNE_CONFIG_DIR") {
    return PathBuf::from(dir);
  }

  if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
    return PathBuf::from(xdg_config).join("attune");
  }

  dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("attune")
}
