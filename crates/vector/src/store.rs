use arrow_array::RecordBatch;
use arrow_array::RecordBatchIterator;
use async_trait::async_trait;
use embedding::EmbeddingCache;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::index::{MediaIndex, Result};
use crate::record::{RecordMetadata, VectorMatch, batch_to_match, record_to_batch};
use crate::schema::media_vectors_schema;

/// Build a filter expression matching a single record id
pub fn id_filter(id: &str) -> String {
  format!("id = '{}'", id.replace('\'', "''"))
}

/// The vector store adapter: text-in convenience operations over the media
/// vector index, embedding through the shared cache.
#[async_trait]
pub trait VectorStore: Send + Sync {
  /// Probe for a record id. On store error this fails open (returns false)
  /// so callers re-compute rather than silently dropping data.
  async fn exists(&self, id: &str) -> bool;

  /// Write `{id, vector(text), metadata}` unless the id is already present.
  /// Returns true when a write happened. An id is written at most once.
  async fn upsert(&self, id: &str, text: &str, metadata: RecordMetadata) -> Result<bool>;

  /// Embed `text` and return the `top_k` nearest records, ordered by the
  /// index's descending similarity. The adapter does not re-sort.
  async fn query(&self, text: &str, top_k: usize, filter: Option<&str>) -> Result<Vec<VectorMatch>>;

  /// Remove a record. Not on the recommendation hot path.
  async fn delete(&self, id: &str) -> Result<()>;

  fn dimensions(&self) -> usize;
}

/// LanceDB-backed implementation of [`VectorStore`]
pub struct MediaStore {
  index: MediaIndex,
  cache: Arc<EmbeddingCache>,
}

impl MediaStore {
  pub fn new(index: MediaIndex, cache: Arc<EmbeddingCache>) -> Self {
    Self { index, cache }
  }

  pub fn cache(&self) -> &Arc<EmbeddingCache> {
    &self.cache
  }
}

#[async_trait]
impl VectorStore for MediaStore {
  async fn exists(&self, id: &str) -> bool {
    let table = match self.index.media_table().await {
      Ok(t) => t,
      Err(e) => {
        warn!("Existence probe failed opening table for {}: {}", id, e);
        return false;
      }
    };

    match table.count_rows(Some(id_filter(id))).await {
      Ok(count) => count > 0,
      Err(e) => {
        warn!("Existence probe failed for {}: {}", id, e);
        false
      }
    }
  }

  async fn upsert(&self, id: &str, text: &str, metadata: RecordMetadata) -> Result<bool> {
    if self.exists(id).await {
      debug!("Skipping upsert, id already present: {}", id);
      return Ok(false);
    }

    let vector = self.cache.get_or_compute(text).await?;
    let batch = record_to_batch(id, &metadata, &vector, self.index.vector_dim)?;
    let batches = RecordBatchIterator::new(vec![Ok(batch)], media_vectors_schema(self.index.vector_dim));

    let table = self.index.media_table().await?;
    table.add(Box::new(batches)).execute().await?;

    debug!("Stored vector record {}", id);
    Ok(true)
  }

  async fn query(&self, text: &str, top_k: usize, filter: Option<&str>) -> Result<Vec<VectorMatch>> {
    let vector = self.cache.get_or_compute(text).await?;
    let table = self.index.media_table().await?;

    let query = if let Some(f) = filter {
      table.vector_search(vector.to_vec())?.limit(top_k.max(1)).only_if(f)
    } else {
      table.vector_search(vector.to_vec())?.limit(top_k.max(1))
    };

    let results: Vec<RecordBatch> = query.execute().await?.try_collect().await?;

    let mut matches = Vec::new();
    for batch in results {
      for row in 0..batch.num_rows() {
        matches.push(batch_to_match(&batch, row)?);
      }
    }

    Ok(matches)
  }

  async fn delete(&self, id: &str) -> Result<()> {
    let table = self.index.media_table().await?;
    table.delete(&id_filter(id)).await?;
    Ok(())
  }

  fn dimensions(&self) -> usize {
    self.index.vector_dim
  }
}
