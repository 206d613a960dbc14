use async_trait::async_trait;
use attune_core::{CandidateItem, MediaType, MovieItem};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::adapter::MoodCatalog;
use crate::error::{CatalogError, Result};
use crate::moods::movie_params;

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org";
const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Film catalog adapter over the TMDB discover API
#[derive(Debug, Clone)]
pub struct TmdbCatalog {
  client: reqwest::Client,
  base_url: String,
  api_key: Option<String>,
}

impl TmdbCatalog {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      base_url: DEFAULT_BASE_URL.to_string(),
      api_key: Some(api_key.into()).filter(|k| !k.is_empty()),
    }
  }

  /// Build from TMDB_API_KEY; a missing key surfaces later as NotConfigured
  pub fn from_env() -> Self {
    Self {
      client: reqwest::Client::new(),
      base_url: DEFAULT_BASE_URL.to_string(),
      api_key: std::env::var("TMDB_API_KEY").ok().filter(|k| !k.is_empty()),
    }
  }

  pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
    self.base_url = url.into();
    self
  }

  fn discover_url(&self) -> String {
    format!("{}/3/discover/movie", self.base_url)
  }

  async fn discover(&self, label: &str, max_results: usize) -> Result<Vec<MovieItem>> {
    let api_key = self.api_key.as_deref().ok_or(CatalogError::NotConfigured("TMDB_API_KEY"))?;

    let params = movie_params(label);
    debug!("TMDB discover for mood {:?}: genres {:?}", label, params.genre_ids);

    let mut query: Vec<(&str, String)> = vec![
      ("api_key", api_key.to_string()),
      ("language", "en-US".to_string()),
      ("sort_by", params.sort_by.to_string()),
      ("page", "1".to_string()),
    ];
    if !params.genre_ids.is_empty() {
      let genres = params
        .genre_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
      query.push(("with_genres", genres));
    }

    let response = self
      .client
      .get(self.discover_url())
      .timeout(REQUEST_TIMEOUT)
      .query(&query)
      .send()
      .await
      .map_err(CatalogError::from_transport)?;

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      warn!("TMDB discover failed: {} - {}", status, body);
      return Err(classify_status(status));
    }

    let data: DiscoverResponse = response
      .json()
      .await
      .map_err(|e| CatalogError::Transient(format!("invalid TMDB response: {}", e)))?;

    Ok(
      data
        .results
        .into_iter()
        .take(max_results)
        .map(|movie| MovieItem {
          native_id: movie.id.to_string(),
          title: movie.title,
          overview: movie.overview,
          poster_url: movie.poster_path.map(|p| format!("{}{}", POSTER_BASE_URL, p)),
          release_date: movie.release_date,
          vote_average: movie.vote_average,
          genre_ids: movie.genre_ids,
          similarity: None,
        })
        .collect(),
    )
  }
}

fn classify_status(status: reqwest::StatusCode) -> CatalogError {
  match status.as_u16() {
    401 | 403 => CatalogError::Forbidden(format!("TMDB returned {}", status)),
    429 => CatalogError::QuotaExceeded(format!("TMDB returned {}", status)),
    _ => CatalogError::Transient(format!("TMDB returned {}", status)),
  }
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
  #[serde(default)]
  results: Vec<DiscoverMovie>,
}

#[derive(Debug, Deserialize)]
struct DiscoverMovie {
  id: u64,
  title: String,
  #[serde(default)]
  overview: String,
  #[serde(default)]
  poster_path: Option<String>,
  #[serde(default)]
  release_date: String,
  #[serde(default)]
  vote_average: f32,
  #[serde(default)]
  genre_ids: Vec<u32>,
}

#[async_trait]
impl MoodCatalog for TmdbCatalog {
  fn name(&self) -> &str {
    "tmdb"
  }

  fn supported_types(&self) -> &'static [MediaType] {
    &[MediaType::Movie]
  }

  async fn fetch_by_mood(
    &self,
    label: &str,
    _category: Option<&str>,
    media_type: MediaType,
    max_results: usize,
  ) -> Result<Vec<CandidateItem>> {
    if media_type != MediaType::Movie {
      return Ok(Vec::new());
    }

    let movies = self.discover(label, max_results).await?;
    Ok(movies.into_iter().map(CandidateItem::Movie).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_discover_url() {
    let catalog = TmdbCatalog::new("k").with_base_url("http://localhost:1234");
    assert_eq!(catalog.discover_url(), "http://localhost:1234/3/discover/movie");
  }

  #[tokio::test]
  async fn test_missing_key_is_not_configured() {
    let catalog = TmdbCatalog::new("");
    let result = catalog.fetch_by_mood("sad", None, MediaType::Movie, 10).await;
    assert_eq!(result, Err(CatalogError::NotConfigured("TMDB_API_KEY")));
  }

  #[tokio::test]
  async fn test_unsupported_media_type_is_empty() {
    let catalog = TmdbCatalog::new("k");
    let result = catalog.fetch_by_mood("sad", None, MediaType::Song, 10).await.unwrap();
    assert!(result.is_empty());
  }

  #[test]
  fn test_classify_statuses() {
    assert!(matches!(
      classify_status(reqwest::StatusCode::UNAUTHORIZED),
      CatalogError::Forbidden(_)
    ));
    assert!(matches!(
      classify_status(reqwest::StatusCode::TOO_MANY_REQUESTS),
      CatalogError::QuotaExceeded(_)
    ));
    assert!(matches!(
      classify_status(reqwest::StatusCode::SERVICE_UNAVAILABLE),
      CatalogError::Transient(_)
    ));
  }

  #[test]
  fn test_response_mapping_shapes() {
    let raw = r#"{
      "results": [
        {"id": 603, "title": "The Matrix", "overview": "hacker", "poster_path": "/m.jpg",
         "release_date": "1999-03-31", "vote_average": 8.2, "genre_ids": [28, 878]}
      ]
    }"#;
    let parsed: DiscoverResponse = serde_json::from_str(raw).unwrap();
    assert_eq!(parsed.results.len(), 1);
    assert_eq!(parsed.results[0].id, 603);
    assert_eq!(parsed.results[0].genre_ids, vec![28, 878]);
  }
}
