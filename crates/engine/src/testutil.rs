//! Shared mock collaborators for engine tests.

use async_trait::async_trait;
use attune_core::{CandidateItem, MediaType, MovieItem, ShortFormItem};
use catalog::{CatalogError, MoodCatalog};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use vector::{RecordMetadata, StoreError, VectorMatch, VectorStore};

#[derive(Debug, Clone)]
pub(crate) struct QueryCall {
  pub text: String,
  pub top_k: usize,
  pub filter: Option<String>,
}

/// Scriptable in-memory vector store.
///
/// Unfiltered queries pop from `plain_results`; id-filtered queries look up
/// `scores_by_id`. Every call is recorded for assertions.
#[derive(Default)]
pub(crate) struct MockStore {
  pub records: Mutex<HashMap<String, RecordMetadata>>,
  pub upsert_calls: Mutex<Vec<String>>,
  pub query_log: Mutex<Vec<QueryCall>>,
  pub plain_results: Mutex<VecDeque<Result<Vec<VectorMatch>, String>>>,
  pub scores_by_id: Mutex<HashMap<String, f32>>,
  pub fail_upserts: AtomicBool,
  pub fail_queries: AtomicBool,
}

impl MockStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push_plain_result(&self, result: Result<Vec<VectorMatch>, String>) {
    self.plain_results.lock().unwrap().push_back(result);
  }

  pub fn set_score(&self, id: &str, score: f32) {
    self.scores_by_id.lock().unwrap().insert(id.to_string(), score);
  }

  pub fn queried_texts(&self) -> Vec<String> {
    self.query_log.lock().unwrap().iter().map(|c| c.text.clone()).collect()
  }

  fn id_from_filter(filter: &str) -> Option<String> {
    filter
      .strip_prefix("id = '")
      .and_then(|rest| rest.strip_suffix('\''))
      .map(|id| id.replace("''", "'"))
  }
}

#[async_trait]
impl VectorStore for MockStore {
  async fn exists(&self, id: &str) -> bool {
    self.records.lock().unwrap().contains_key(id)
  }

  async fn upsert(&self, id: &str, _text: &str, metadata: RecordMetadata) -> vector::Result<bool> {
    if self.fail_upserts.load(Ordering::SeqCst) {
      return Err(StoreError::InvalidRecord("store down".to_string()));
    }
    self.upsert_calls.lock().unwrap().push(id.to_string());

    let mut records = self.records.lock().unwrap();
    if records.contains_key(id) {
      return Ok(false);
    }
    records.insert(id.to_string(), metadata);
    Ok(true)
  }

  async fn query(&self, text: &str, top_k: usize, filter: Option<&str>) -> vector::Result<Vec<VectorMatch>> {
    self.query_log.lock().unwrap().push(QueryCall {
      text: text.to_string(),
      top_k,
      filter: filter.map(|f| f.to_string()),
    });

    if self.fail_queries.load(Ordering::SeqCst) {
      return Err(StoreError::InvalidRecord("index offline".to_string()));
    }

    if let Some(filter) = filter {
      let id = Self::id_from_filter(filter).unwrap_or_default();
      let score = self.scores_by_id.lock().unwrap().get(&id).copied();
      return Ok(match score {
        Some(score) => {
          let metadata = self
            .records
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_else(|| {
              RecordMetadata::new(attune_core::MediaSource::Youtube, MediaType::Video, id.clone(), "", "")
            });
          vec![VectorMatch { id, score, metadata }]
        }
        None => Vec::new(),
      });
    }

    match self.plain_results.lock().unwrap().pop_front() {
      Some(Ok(matches)) => Ok(matches),
      Some(Err(message)) => Err(StoreError::InvalidRecord(message)),
      None => Ok(Vec::new()),
    }
  }

  async fn delete(&self, id: &str) -> vector::Result<()> {
    self.records.lock().unwrap().remove(id);
    Ok(())
  }

  fn dimensions(&self) -> usize {
    8
  }
}

/// Scriptable catalog adapter
pub(crate) struct MockCatalog {
  name: &'static str,
  responses: Mutex<HashMap<MediaType, Result<Vec<CandidateItem>, CatalogError>>>,
  pub calls: Mutex<Vec<(String, MediaType, usize)>>,
}

impl MockCatalog {
  pub fn new(name: &'static str) -> Self {
    Self {
      name,
      responses: Mutex::new(HashMap::new()),
      calls: Mutex::new(Vec::new()),
    }
  }

  pub fn respond(&self, media_type: MediaType, response: Result<Vec<CandidateItem>, CatalogError>) {
    self.responses.lock().unwrap().insert(media_type, response);
  }
}

#[async_trait]
impl MoodCatalog for MockCatalog {
  fn name(&self) -> &str {
    self.name
  }

  fn supported_types(&self) -> &'static [MediaType] {
    &[MediaType::Video, MediaType::Song, MediaType::Movie]
  }

  async fn fetch_by_mood(
    &self,
    label: &str,
    _category: Option<&str>,
    media_type: MediaType,
    max_results: usize,
  ) -> catalog::Result<Vec<CandidateItem>> {
    self
      .calls
      .lock()
      .unwrap()
      .push((label.to_string(), media_type, max_results));

    self
      .responses
      .lock()
      .unwrap()
      .get(&media_type)
      .cloned()
      .unwrap_or_else(|| Ok(Vec::new()))
  }
}

pub(crate) fn video(id: &str) -> CandidateItem {
  CandidateItem::Video(ShortFormItem {
    native_id: id.to_string(),
    title: format!("video {}", id),
    description: format!("about {}", id),
    thumbnail_url: None,
    channel_title: "channel".to_string(),
    published_at: "2024-01-01T00:00:00Z".to_string(),
    similarity: None,
  })
}

pub(crate) fn song(id: &str) -> CandidateItem {
  CandidateItem::Song(ShortFormItem {
    native_id: id.to_string(),
    title: format!("song {}", id),
    description: format!("track {}", id),
    thumbnail_url: None,
    channel_title: "artist".to_string(),
    published_at: "2024-01-01T00:00:00Z".to_string(),
    similarity: None,
  })
}

pub(crate) fn movie(id: &str) -> CandidateItem {
  CandidateItem::Movie(MovieItem {
    native_id: id.to_string(),
    title: format!("movie {}", id),
    overview: format!("a film about {}", id),
    poster_url: None,
    release_date: "2020-06-01".to_string(),
    vote_average: 7.0,
    genre_ids: vec![18],
    similarity: None,
  })
}

/// A vector match wrapping a candidate's metadata
pub(crate) fn match_for(item: &CandidateItem, score: f32) -> VectorMatch {
  VectorMatch {
    id: item.record_id(),
    score,
    metadata: RecordMetadata::from_candidate(item),
  }
}
