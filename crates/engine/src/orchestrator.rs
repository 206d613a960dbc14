use attune_core::{
  CandidateItem, CatalogConfig, Error, MediaSource, MediaType, MoodSignal, RecommendationResult, Result, SearchConfig,
  SearchMethod, round_similarity,
};
use catalog::{CatalogError, MoodCatalog};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use vector::{RecordMetadata, VectorMatch, VectorStore};

use crate::events::{EngineEvent, EventSink};
use crate::history::MoodHistory;
use crate::rerank::Reranker;

/// Bound on the detached persistence task's lifetime
const PERSIST_TIMEOUT: Duration = Duration::from_secs(30);

/// The recommendation orchestrator.
///
/// Sequences vector search, catalog fallback, re-ranking, and best-effort
/// persistence over injected collaborators. One invocation serves one user
/// request; failures in any single source degrade that source to empty
/// rather than surfacing to the caller.
pub struct Recommender {
  history: Arc<dyn MoodHistory>,
  store: Arc<dyn VectorStore>,
  shorts: Arc<dyn MoodCatalog>,
  films: Arc<dyn MoodCatalog>,
  search: SearchConfig,
  limits: CatalogConfig,
  events: EventSink,
}

impl Recommender {
  pub fn new(
    history: Arc<dyn MoodHistory>,
    store: Arc<dyn VectorStore>,
    shorts: Arc<dyn MoodCatalog>,
    films: Arc<dyn MoodCatalog>,
  ) -> Self {
    Self {
      history,
      store,
      shorts,
      films,
      search: SearchConfig::default(),
      limits: CatalogConfig::default(),
      events: EventSink::none(),
    }
  }

  pub fn with_search_config(mut self, search: SearchConfig) -> Self {
    self.search = search;
    self
  }

  pub fn with_catalog_config(mut self, limits: CatalogConfig) -> Self {
    self.limits = limits;
    self
  }

  pub fn with_events(mut self, tx: UnboundedSender<EngineEvent>) -> Self {
    self.events = EventSink::new(tx);
    self
  }

  /// Produce ranked recommendations for the user's latest mood signal.
  ///
  /// Idempotent: side effects are best-effort caching and audit writes only.
  pub async fn recommend(&self, user_id: &str) -> Result<RecommendationResult> {
    let signal = self
      .history
      .find_latest_mood_signal(user_id)
      .await?
      .ok_or_else(|| Error::NoMoodSignal {
        user_id: user_id.to_string(),
      })?;

    let source_text = self.resolve_source_text(&signal).await;
    info!(
      "Recommending for user {} (mood {}, vector {})",
      user_id,
      signal.label,
      signal.vector_id.is_some()
    );

    // VectorAttempt: only when the journal text was embedded at creation time
    let mut vector_succeeded = false;
    if signal.vector_id.is_some() && !source_text.is_empty() {
      match tokio::time::timeout(
        self.search.request_timeout(),
        self.store.query(&source_text, self.search.top_k, None),
      )
      .await
      {
        Ok(Ok(matches)) => {
          vector_succeeded = true;
          let (videos, songs, movies) = partition_matches(matches, self.search.bucket_cap);
          if !(videos.is_empty() && songs.is_empty() && movies.is_empty()) {
            let mut result = RecommendationResult::new(&signal, videos, songs, movies, SearchMethod::VectorSimilarity);
            round_result(&mut result);
            self.spawn_persist(&signal, &result);
            return Ok(result);
          }
          // Fallback is mandatory on empty results, not just on failure: an
          // under-populated index must not surface as "no recommendations"
          debug!("Vector index returned no usable matches; falling back to catalog search");
        }
        Ok(Err(e)) => {
          warn!("Vector search failed, falling back to catalog search: {}", e);
          self.events.emit(EngineEvent::VectorSearchFailed { error: e.to_string() });
        }
        Err(_) => {
          warn!("Vector search timed out, falling back to catalog search");
          self.events.emit(EngineEvent::VectorSearchFailed {
            error: "timed out".to_string(),
          });
        }
      }
    }

    // KeywordAttempt: both catalogs, isolated; one failing never blocks the other
    let label = signal.label.as_str();
    let category = signal.category.as_deref();
    let timeout = self.search.request_timeout();
    let (video_fetch, song_fetch, movie_fetch) = tokio::join!(
      tokio::time::timeout(
        timeout,
        self.shorts.fetch_by_mood(label, category, MediaType::Video, self.limits.max_videos),
      ),
      tokio::time::timeout(
        timeout,
        self.shorts.fetch_by_mood(label, category, MediaType::Song, self.limits.max_songs),
      ),
      tokio::time::timeout(
        timeout,
        self.films.fetch_by_mood(label, category, MediaType::Movie, self.limits.max_movies),
      ),
    );

    let (mut videos, videos_failed) = self.absorb_catalog(self.shorts.name(), MediaType::Video, video_fetch);
    let (mut songs, songs_failed) = self.absorb_catalog(self.shorts.name(), MediaType::Song, song_fetch);
    let (mut movies, movies_failed) = self.absorb_catalog(self.films.name(), MediaType::Movie, movie_fetch);

    let shorts_failed = videos_failed && songs_failed;
    if !vector_succeeded && shorts_failed && movies_failed {
      return Err(Error::AllSourcesUnavailable);
    }

    // Rerank: needs a source-text vector and at least one non-empty bucket
    let mut method = SearchMethod::KeywordOnly;
    let any_results = !(videos.is_empty() && songs.is_empty() && movies.is_empty());
    if self.search.rerank && signal.vector_id.is_some() && !source_text.is_empty() && any_results {
      let reranker = Reranker::new(Arc::clone(&self.store), self.search.max_in_flight, self.events.clone());
      tokio::join!(
        reranker.rerank_bucket(&source_text, &mut videos),
        reranker.rerank_bucket(&source_text, &mut songs),
        reranker.rerank_bucket(&source_text, &mut movies),
      );
      method = SearchMethod::KeywordRerankedVector;
    }

    let mut result = RecommendationResult::new(&signal, videos, songs, movies, method);
    round_result(&mut result);
    self.spawn_persist(&signal, &result);
    Ok(result)
  }

  /// Embed a journal's text and record its vector id on the signal.
  ///
  /// Failure leaves `vector_id` unset, which silently disables the vector
  /// path for this signal; the keyword path still works.
  pub async fn ingest_signal(&self, signal: &mut MoodSignal) {
    if signal.source_text.is_empty() {
      return;
    }

    let record_id = format!("journal:{}", signal.source_id);
    let metadata = RecordMetadata::new(
      MediaSource::Journal,
      MediaType::Journal,
      signal.source_id.clone(),
      String::new(),
      signal.source_text.clone(),
    )
    .with_extra("user_id", signal.user_id.clone().into())
    .with_extra("created_at", signal.created_at.to_rfc3339().into());

    match self.store.upsert(&record_id, &signal.source_text, metadata).await {
      Ok(_) => signal.vector_id = Some(record_id),
      Err(e) => {
        warn!("Journal embedding failed; vector search disabled for {}: {}", record_id, e);
        self.events.emit(EngineEvent::PersistFailed {
          record_id,
          error: e.to_string(),
        });
      }
    }
  }

  /// The signal's own text, or the journal record when the signal carries none
  async fn resolve_source_text(&self, signal: &MoodSignal) -> String {
    if !signal.source_text.is_empty() {
      return signal.source_text.clone();
    }
    match self.history.find_journal_text(&signal.source_id).await {
      Ok(Some(text)) => text,
      Ok(None) => String::new(),
      Err(e) => {
        warn!("Journal text lookup failed for {}: {}", signal.source_id, e);
        String::new()
      }
    }
  }

  /// Convert one catalog fetch outcome into (bucket, hard_failed)
  fn absorb_catalog(
    &self,
    catalog: &str,
    media_type: MediaType,
    fetch: std::result::Result<catalog::Result<Vec<CandidateItem>>, tokio::time::error::Elapsed>,
  ) -> (Vec<CandidateItem>, bool) {
    match fetch {
      Ok(Ok(items)) => (items, false),
      Ok(Err(e)) => {
        warn!("Catalog {} degraded for {}: {}", catalog, media_type.as_str(), e);
        self.events.emit(EngineEvent::CatalogDegraded {
          catalog: catalog.to_string(),
          media_type,
          error: e,
        });
        (Vec::new(), true)
      }
      Err(_) => {
        warn!("Catalog {} timed out for {}", catalog, media_type.as_str());
        self.events.emit(EngineEvent::CatalogDegraded {
          catalog: catalog.to_string(),
          media_type,
          error: CatalogError::Transient("timed out".to_string()),
        });
        (Vec::new(), true)
      }
    }
  }

  /// Fire-and-forget persistence of returned candidates plus the audit record.
  ///
  /// Detached from the response path with its own timeout; caller
  /// cancellation does not cancel it, and it is never awaited here.
  fn spawn_persist(&self, signal: &MoodSignal, result: &RecommendationResult) {
    let items: Vec<(String, String, RecordMetadata)> = result
      .items()
      .map(|item| (item.record_id(), item.descriptive_text(), RecordMetadata::from_candidate(item)))
      .collect();

    let store = Arc::clone(&self.store);
    let history = Arc::clone(&self.history);
    let events = self.events.clone();
    let user_id = signal.user_id.clone();
    let signal_id = signal.id;
    let max_in_flight = self.search.max_in_flight.max(1);
    let payload = match serde_json::to_value(result) {
      Ok(value) => value,
      Err(e) => {
        warn!("Recommendation payload not serializable: {}", e);
        serde_json::Value::Null
      }
    };

    tokio::spawn(async move {
      let work = async {
        let semaphore = Arc::new(Semaphore::new(max_in_flight));
        let writes = join_all(items.into_iter().map(|(record_id, text, metadata)| {
          let store = Arc::clone(&store);
          let semaphore = Arc::clone(&semaphore);
          let events = events.clone();
          async move {
            let _permit = semaphore.acquire().await.ok();
            match store.upsert(&record_id, &text, metadata).await {
              Ok(written) => usize::from(written),
              Err(e) => {
                warn!("Best-effort persistence failed for {}: {}", record_id, e);
                events.emit(EngineEvent::PersistFailed {
                  record_id,
                  error: e.to_string(),
                });
                0
              }
            }
          }
        }))
        .await;

        if let Err(e) = history.create_audit_record(&user_id, signal_id, payload).await {
          warn!("Audit record write failed for {}: {}", user_id, e);
          events.emit(EngineEvent::AuditFailed { error: e.to_string() });
        }

        events.emit(EngineEvent::PersistFinished {
          written: writes.iter().sum(),
        });
      };

      if tokio::time::timeout(PERSIST_TIMEOUT, work).await.is_err() {
        warn!("Background persistence timed out after {:?}", PERSIST_TIMEOUT);
      }
    });
  }
}

/// Split nearest-neighbor matches into capped video/song/movie buckets.
///
/// Matches arrive pre-sorted by the index; order is preserved. Journal
/// records (and anything else non-recommendable) are dropped.
fn partition_matches(matches: Vec<VectorMatch>, bucket_cap: usize) -> (Vec<CandidateItem>, Vec<CandidateItem>, Vec<CandidateItem>) {
  let mut videos = Vec::new();
  let mut songs = Vec::new();
  let mut movies = Vec::new();

  for matched in matches {
    let bucket = match matched.metadata.media_type {
      MediaType::Video => &mut videos,
      MediaType::Song => &mut songs,
      MediaType::Movie => &mut movies,
      MediaType::Journal => continue,
    };
    if bucket.len() >= bucket_cap {
      continue;
    }
    if let Some(item) = matched.metadata.to_candidate(Some(matched.score)) {
      bucket.push(item);
    }
  }

  (videos, songs, movies)
}

/// Round every similarity to 2 decimal places for presentation stability
fn round_result(result: &mut RecommendationResult) {
  for bucket in [&mut result.videos, &mut result.songs, &mut result.movies] {
    for item in bucket.iter_mut() {
      if let Some(score) = item.similarity() {
        item.set_similarity(round_similarity(score));
      }
    }
  }
}
