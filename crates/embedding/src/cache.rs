//! In-process embedding cache keyed by content hash.
//!
//! Best-effort de-duplication with process lifetime: no eviction, no
//! persistence, no cross-process sharing. Text is treated as a
//! content-addressed key, so an entry can never go stale.

use crate::{EmbeddingError, EmbeddingProvider};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Hit/miss counters for the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
  pub hits: u64,
  pub misses: u64,
  pub entries: usize,
}

/// Content-hash keyed cache in front of an embedding provider
pub struct EmbeddingCache {
  provider: Arc<dyn EmbeddingProvider>,
  entries: RwLock<HashMap<String, Arc<Vec<f32>>>>,
  hits: AtomicU64,
  misses: AtomicU64,
}

impl EmbeddingCache {
  pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
    Self {
      provider,
      entries: RwLock::new(HashMap::new()),
      hits: AtomicU64::new(0),
      misses: AtomicU64::new(0),
    }
  }

  /// Stable cache key for a text (SHA-256 hex)
  pub fn content_key(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
  }

  pub fn dimensions(&self) -> usize {
    self.provider.dimensions()
  }

  pub fn model_id(&self) -> &str {
    self.provider.model_id()
  }

  pub fn stats(&self) -> CacheStats {
    CacheStats {
      hits: self.hits.load(Ordering::Relaxed),
      misses: self.misses.load(Ordering::Relaxed),
      entries: self.entries.read().map(|e| e.len()).unwrap_or(0),
    }
  }

  /// Return the cached vector for this text, computing it on first use.
  ///
  /// Concurrent callers for the same text may race the computation; the map
  /// keeps whichever entry landed first, so equal text always converges to
  /// one vector.
  pub async fn get_or_compute(&self, text: &str) -> Result<Arc<Vec<f32>>, EmbeddingError> {
    let key = Self::content_key(text);

    if let Some(vector) = self.entries.read().ok().and_then(|map| map.get(&key).cloned()) {
      self.hits.fetch_add(1, Ordering::Relaxed);
      return Ok(vector);
    }

    self.misses.fetch_add(1, Ordering::Relaxed);
    debug!("Embedding cache miss for key {}", &key[..12]);

    // Lock is not held across the provider call
    let vector = Arc::new(self.provider.embed(text).await?);

    let mut map = self
      .entries
      .write()
      .map_err(|_| EmbeddingError::Provider("embedding cache poisoned".to_string()))?;
    let entry = map.entry(key).or_insert_with(|| Arc::clone(&vector));
    Ok(Arc::clone(entry))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;

  /// Counting fake provider returning a vector derived from text length
  struct CountingProvider {
    calls: AtomicU64,
  }

  impl CountingProvider {
    fn new() -> Self {
      Self {
        calls: AtomicU64::new(0),
      }
    }
  }

  #[async_trait]
  impl EmbeddingProvider for CountingProvider {
    fn name(&self) -> &str {
      "counting"
    }

    fn model_id(&self) -> &str {
      "counting-model"
    }

    fn dimensions(&self) -> usize {
      4
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      let len = text.len() as f32;
      Ok(vec![len, len + 1.0, len + 2.0, len + 3.0])
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
      let mut out = Vec::new();
      for text in texts {
        out.push(self.embed(text).await?);
      }
      Ok(out)
    }

    async fn is_available(&self) -> bool {
      true
    }
  }

  #[tokio::test]
  async fn test_repeat_lookup_hits_cache() {
    let provider = Arc::new(CountingProvider::new());
    let cache = EmbeddingCache::new(Arc::clone(&provider) as Arc<dyn EmbeddingProvider>);

    let first = cache.get_or_compute("hello").await.unwrap();
    let second = cache.get_or_compute("hello").await.unwrap();

    // Bit-identical vectors, provider invoked exactly once
    assert_eq!(first, second);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
  }

  #[tokio::test]
  async fn test_distinct_texts_get_distinct_entries() {
    let provider = Arc::new(CountingProvider::new());
    let cache = EmbeddingCache::new(Arc::clone(&provider) as Arc<dyn EmbeddingProvider>);

    let a = cache.get_or_compute("hello").await.unwrap();
    let b = cache.get_or_compute("goodbye").await.unwrap();

    assert_ne!(a, b);
    assert_eq!(cache.stats().entries, 2);
  }

  #[tokio::test]
  async fn test_concurrent_lookups_converge() {
    let provider = Arc::new(CountingProvider::new());
    let cache = Arc::new(EmbeddingCache::new(Arc::clone(&provider) as Arc<dyn EmbeddingProvider>));

    let tasks: Vec<_> = (0..16)
      .map(|_| {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.get_or_compute("same text").await.unwrap() })
      })
      .collect();

    let mut vectors = Vec::new();
    for task in tasks {
      vectors.push(task.await.unwrap());
    }

    // One entry per key, all callers see the same value
    assert_eq!(cache.stats().entries, 1);
    for vector in &vectors {
      assert_eq!(**vector, *vectors[0]);
    }
  }

  #[test]
  fn test_content_key_is_stable() {
    assert_eq!(EmbeddingCache::content_key("hello"), EmbeddingCache::content_key("hello"));
    assert_ne!(EmbeddingCache::content_key("hello"), EmbeddingCache::content_key("hello "));
  }
}
