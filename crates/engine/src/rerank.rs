use attune_core::CandidateItem;
use futures::future::join_all;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::warn;
use vector::{RecordMetadata, VectorStore, id_filter};

use crate::events::{EngineEvent, EventSink};

/// Re-ranks catalog candidates by embedding similarity to a reference text.
///
/// The reference text is always the mood signal's source text. An item's own
/// description is only embedded on the write path (so the filtered query has
/// a vector to hit) and is never used as the query text.
pub struct Reranker {
  store: Arc<dyn VectorStore>,
  max_in_flight: usize,
  events: EventSink,
}

impl Reranker {
  pub fn new(store: Arc<dyn VectorStore>, max_in_flight: usize, events: EventSink) -> Self {
    Self {
      store,
      max_in_flight,
      events,
    }
  }

  /// Score and sort one bucket in place, descending by similarity.
  ///
  /// A failed per-item call degrades that item to similarity 0 instead of
  /// aborting the bucket.
  pub async fn rerank_bucket(&self, reference_text: &str, items: &mut [CandidateItem]) {
    if items.is_empty() {
      return;
    }

    let semaphore = Arc::new(Semaphore::new(self.max_in_flight.max(1)));
    let scores = join_all(items.iter().map(|item| {
      let semaphore = Arc::clone(&semaphore);
      async move {
        let _permit = semaphore.acquire().await.ok();
        self.score_item(reference_text, item).await
      }
    }))
    .await;

    for (item, score) in items.iter_mut().zip(scores) {
      item.set_similarity(score);
    }

    sort_by_similarity(items);
  }

  async fn score_item(&self, reference_text: &str, item: &CandidateItem) -> f32 {
    let record_id = item.record_id();

    // The filtered query below can only score ids present in the index
    let metadata = RecordMetadata::from_candidate(item);
    if let Err(e) = self.store.upsert(&record_id, &item.descriptive_text(), metadata).await {
      warn!("Re-rank upsert failed for {}: {}", record_id, e);
      self.events.emit(EngineEvent::RerankDegraded {
        record_id,
        error: e.to_string(),
      });
      return 0.0;
    }

    match self.store.query(reference_text, 1, Some(&id_filter(&record_id))).await {
      Ok(matches) => matches.first().map(|m| m.score).unwrap_or(0.0),
      Err(e) => {
        warn!("Re-rank query failed for {}: {}", record_id, e);
        self.events.emit(EngineEvent::RerankDegraded {
          record_id,
          error: e.to_string(),
        });
        0.0
      }
    }
  }
}

/// Stable descending sort by similarity; ties keep adapter order
pub fn sort_by_similarity(items: &mut [CandidateItem]) {
  items.sort_by(|a, b| {
    let a_score = a.similarity().unwrap_or(0.0);
    let b_score = b.similarity().unwrap_or(0.0);
    b_score.partial_cmp(&a_score).unwrap_or(Ordering::Equal)
  });
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::{MockStore, movie};

  #[tokio::test]
  async fn test_rerank_sorts_descending() {
    let store = Arc::new(MockStore::new());
    let mut items = vec![movie("low"), movie("high"), movie("mid")];
    store.set_score(&items[0].record_id(), 0.3);
    store.set_score(&items[1].record_id(), 0.9);
    store.set_score(&items[2].record_id(), 0.6);

    let reranker = Reranker::new(store, 10, EventSink::none());
    reranker.rerank_bucket("journal text", &mut items).await;

    let scores: Vec<f32> = items.iter().map(|i| i.similarity().unwrap()).collect();
    assert_eq!(scores, vec![0.9, 0.6, 0.3]);
  }

  #[tokio::test]
  async fn test_query_text_is_always_the_reference_text() {
    let store = Arc::new(MockStore::new());
    let mut items = vec![movie("a"), movie("b")];
    store.set_score(&items[0].record_id(), 0.5);
    store.set_score(&items[1].record_id(), 0.4);

    let reranker = Reranker::new(Arc::clone(&store) as Arc<dyn VectorStore>, 10, EventSink::none());
    reranker.rerank_bucket("felt grateful after the hike", &mut items).await;

    let texts = store.queried_texts();
    assert!(!texts.is_empty());
    for text in &texts {
      assert_eq!(text, "felt grateful after the hike");
    }
    // The candidates' own descriptions never appear as query text
    for item in &items {
      assert!(!texts.contains(&item.descriptive_text()));
    }
  }

  #[tokio::test]
  async fn test_failed_item_degrades_to_zero() {
    let store = Arc::new(MockStore::new());
    let mut items = vec![movie("scored"), movie("unscored")];
    store.set_score(&items[0].record_id(), 0.7);
    // no score registered for the second item: filtered query returns empty

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let reranker = Reranker::new(Arc::clone(&store) as Arc<dyn VectorStore>, 10, EventSink::new(tx));
    reranker.rerank_bucket("reference", &mut items).await;

    assert_eq!(items[0].similarity(), Some(0.7));
    assert_eq!(items[1].similarity(), Some(0.0));
    // An empty match set is not an error, so no degradation event fires
    assert!(rx.try_recv().is_err());
  }

  #[tokio::test]
  async fn test_upsert_failure_emits_event() {
    let store = Arc::new(MockStore::new());
    store.fail_upserts.store(true, std::sync::atomic::Ordering::SeqCst);
    let mut items = vec![movie("a")];

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let reranker = Reranker::new(Arc::clone(&store) as Arc<dyn VectorStore>, 10, EventSink::new(tx));
    reranker.rerank_bucket("reference", &mut items).await;

    assert_eq!(items[0].similarity(), Some(0.0));
    match rx.try_recv() {
      Ok(EngineEvent::RerankDegraded { record_id, .. }) => {
        assert_eq!(record_id, "tmdb:movie:a");
      }
      other => panic!("expected RerankDegraded, got {:?}", other),
    }
  }

  #[test]
  fn test_sort_is_stable_for_ties() {
    let mut items = vec![movie("first"), movie("second"), movie("third")];
    items[0].set_similarity(0.5);
    items[1].set_similarity(0.5);
    items[2].set_similarity(0.9);

    sort_by_similarity(&mut items);

    assert_eq!(items[0].native_id(), "third");
    // Tied items keep their original relative order
    assert_eq!(items[1].native_id(), "first");
    assert_eq!(items[2].native_id(), "second");
  }
}
