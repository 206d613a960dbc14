use async_trait::async_trait;
use attune_core::{CandidateItem, MediaType, ShortFormItem};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

use crate::adapter::MoodCatalog;
use crate::error::{CatalogError, Result};
use crate::moods::{QUERIES_PER_MOOD, short_form_queries};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Short-form catalog adapter over the YouTube Data API
#[derive(Debug, Clone)]
pub struct YouTubeCatalog {
  client: reqwest::Client,
  base_url: String,
  api_key: Option<String>,
}

impl YouTubeCatalog {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      base_url: DEFAULT_BASE_URL.to_string(),
      api_key: Some(api_key.into()).filter(|k| !k.is_empty()),
    }
  }

  /// Build from YOUTUBE_API_KEY; a missing key surfaces later as NotConfigured
  pub fn from_env() -> Self {
    Self {
      client: reqwest::Client::new(),
      base_url: DEFAULT_BASE_URL.to_string(),
      api_key: std::env::var("YOUTUBE_API_KEY").ok().filter(|k| !k.is_empty()),
    }
  }

  pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
    self.base_url = url.into();
    self
  }

  fn search_url(&self) -> String {
    format!("{}/youtube/v3/search", self.base_url)
  }

  /// Run one search query against the API
  async fn search(&self, query: &str, max_results: usize) -> Result<Vec<ShortFormItem>> {
    let api_key = self
      .api_key
      .as_deref()
      .ok_or(CatalogError::NotConfigured("YOUTUBE_API_KEY"))?;

    debug!("YouTube search: {:?}", query);

    let max_results = max_results.to_string();
    let response = self
      .client
      .get(self.search_url())
      .timeout(REQUEST_TIMEOUT)
      .query(&[
        ("part", "snippet"),
        ("q", query),
        ("type", "video"),
        ("maxResults", max_results.as_str()),
        ("order", "relevance"),
        ("key", api_key),
      ])
      .send()
      .await
      .map_err(CatalogError::from_transport)?;

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      warn!("YouTube search failed: {} - {}", status, body);
      return Err(classify_status(status, &body));
    }

    let data: SearchResponse = response
      .json()
      .await
      .map_err(|e| CatalogError::Transient(format!("invalid YouTube response: {}", e)))?;

    Ok(
      data
        .items
        .into_iter()
        .filter_map(|item| {
          let native_id = item.id.video_id?;
          let snippet = item.snippet;
          Some(ShortFormItem {
            native_id,
            title: snippet.title,
            description: snippet.description,
            thumbnail_url: snippet.thumbnails.best_url(),
            channel_title: snippet.channel_title,
            published_at: snippet.published_at,
            similarity: None,
          })
        })
        .collect(),
    )
  }
}

/// Classify a YouTube error status.
///
/// Quota exhaustion arrives as 403 with a quota reason in the body, so the
/// body has to disambiguate it from a plain authorization failure.
fn classify_status(status: reqwest::StatusCode, body: &str) -> CatalogError {
  match status.as_u16() {
    429 => CatalogError::QuotaExceeded(format!("YouTube returned {}", status)),
    403 if body.contains("quota") => CatalogError::QuotaExceeded(format!("YouTube returned {}: quota", status)),
    401 | 403 => CatalogError::Forbidden(format!("YouTube returned {}", status)),
    _ => CatalogError::Transient(format!("YouTube returned {}", status)),
  }
}

/// Merge query batches, deduplicating by native id (first occurrence wins)
pub fn merge_batches(batches: Vec<Vec<ShortFormItem>>, max_results: usize) -> Vec<ShortFormItem> {
  let mut seen = HashSet::new();
  let mut merged = Vec::new();

  for batch in batches {
    for item in batch {
      if seen.insert(item.native_id.clone()) {
        merged.push(item);
      }
    }
  }

  merged.truncate(max_results);
  merged
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
  #[serde(default)]
  items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
  id: ItemId,
  snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct ItemId {
  #[serde(rename = "videoId")]
  video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
  title: String,
  #[serde(default)]
  description: String,
  #[serde(default)]
  thumbnails: Thumbnails,
  #[serde(rename = "channelTitle", default)]
  channel_title: String,
  #[serde(rename = "publishedAt", default)]
  published_at: String,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
  high: Option<Thumbnail>,
  medium: Option<Thumbnail>,
  default: Option<Thumbnail>,
}

impl Thumbnails {
  fn best_url(self) -> Option<String> {
    self
      .high
      .or(self.medium)
      .or(self.default)
      .map(|thumbnail| thumbnail.url)
  }
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
  url: String,
}

#[async_trait]
impl MoodCatalog for YouTubeCatalog {
  fn name(&self) -> &str {
    "youtube"
  }

  fn supported_types(&self) -> &'static [MediaType] {
    &[MediaType::Video, MediaType::Song]
  }

  async fn fetch_by_mood(
    &self,
    label: &str,
    _category: Option<&str>,
    media_type: MediaType,
    max_results: usize,
  ) -> Result<Vec<CandidateItem>> {
    let taxonomy = short_form_queries(label);
    let queries = match media_type {
      MediaType::Video => taxonomy.videos,
      MediaType::Song => taxonomy.songs,
      MediaType::Movie | MediaType::Journal => return Ok(Vec::new()),
    };
    let queries = &queries[..QUERIES_PER_MOOD.min(queries.len())];

    // Related queries run concurrently; result order is superseded downstream
    let results = futures::future::join_all(queries.iter().map(|query| self.search(query, max_results))).await;

    let mut batches = Vec::new();
    let mut first_error = None;
    for result in results {
      match result {
        Ok(batch) => batches.push(batch),
        Err(e) => {
          warn!("YouTube query failed for mood {}: {}", label, e);
          first_error.get_or_insert(e);
        }
      }
    }

    // Only propagate when every query failed
    if batches.is_empty() {
      if let Some(error) = first_error {
        return Err(error);
      }
    }

    let merged = merge_batches(batches, max_results);
    Ok(
      merged
        .into_iter()
        .map(|item| match media_type {
          MediaType::Song => CandidateItem::Song(item),
          _ => CandidateItem::Video(item),
        })
        .collect(),
    )
  }
}
