use arrow_array::{Array, FixedSizeListArray, Float32Array, Int64Array, RecordBatch, StringArray};
use attune_core::{CandidateItem, MediaSource, MediaType, MovieItem, ShortFormItem};
use chrono::Utc;
use std::sync::Arc;

use crate::index::{Result, StoreError};
use crate::schema::media_vectors_schema;

/// Typed metadata attached to a vector record.
///
/// Mandatory fields cover every source; per-source attributes ride in the
/// open `extra` map.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RecordMetadata {
  pub source: MediaSource,
  pub media_type: MediaType,
  pub native_id: String,
  pub title: String,
  pub description: String,
  #[serde(default)]
  pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RecordMetadata {
  pub fn new(
    source: MediaSource,
    media_type: MediaType,
    native_id: impl Into<String>,
    title: impl Into<String>,
    description: impl Into<String>,
  ) -> Self {
    Self {
      source,
      media_type,
      native_id: native_id.into(),
      title: title.into(),
      description: description.into(),
      extra: serde_json::Map::new(),
    }
  }

  pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
    self.extra.insert(key.into(), value);
    self
  }

  fn extra_str(&self, key: &str) -> Option<String> {
    self.extra.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
  }

  /// Capture a candidate item's provider metadata
  pub fn from_candidate(item: &CandidateItem) -> Self {
    match item {
      CandidateItem::Video(short) | CandidateItem::Song(short) => {
        let mut m = Self::new(
          item.source(),
          item.media_type(),
          short.native_id.clone(),
          short.title.clone(),
          short.description.clone(),
        )
        .with_extra("channel_title", short.channel_title.clone().into())
        .with_extra("published_at", short.published_at.clone().into());
        if let Some(ref url) = short.thumbnail_url {
          m = m.with_extra("thumbnail_url", url.clone().into());
        }
        m
      }
      CandidateItem::Movie(movie) => {
        let mut m = Self::new(
          item.source(),
          item.media_type(),
          movie.native_id.clone(),
          movie.title.clone(),
          movie.overview.clone(),
        )
        .with_extra("release_date", movie.release_date.clone().into())
        .with_extra("vote_average", serde_json::json!(movie.vote_average))
        .with_extra("genre_ids", serde_json::json!(movie.genre_ids));
        if let Some(ref url) = movie.poster_url {
          m = m.with_extra("poster_url", url.clone().into());
        }
        m
      }
    }
  }

  /// Rebuild a candidate item from stored metadata.
  ///
  /// Journal records return None; they share the index but are never
  /// recommendable.
  pub fn to_candidate(&self, similarity: Option<f32>) -> Option<CandidateItem> {
    match self.media_type {
      MediaType::Journal => None,
      MediaType::Video | MediaType::Song => {
        let short = ShortFormItem {
          native_id: self.native_id.clone(),
          title: self.title.clone(),
          description: self.description.clone(),
          thumbnail_url: self.extra_str("thumbnail_url"),
          channel_title: self.extra_str("channel_title").unwrap_or_default(),
          published_at: self.extra_str("published_at").unwrap_or_default(),
          similarity,
        };
        Some(if self.media_type == MediaType::Video {
          CandidateItem::Video(short)
        } else {
          CandidateItem::Song(short)
        })
      }
      MediaType::Movie => Some(CandidateItem::Movie(MovieItem {
        native_id: self.native_id.clone(),
        title: self.title.clone(),
        overview: self.description.clone(),
        poster_url: self.extra_str("poster_url"),
        release_date: self.extra_str("release_date").unwrap_or_default(),
        vote_average: self
          .extra
          .get("vote_average")
          .and_then(|v| v.as_f64())
          .unwrap_or(0.0) as f32,
        genre_ids: self
          .extra
          .get("genre_ids")
          .and_then(|v| serde_json::from_value(v.clone()).ok())
          .unwrap_or_default(),
        similarity,
      })),
    }
  }
}

/// One nearest-neighbor match from the index
#[derive(Debug, Clone)]
pub struct VectorMatch {
  pub id: String,
  pub score: f32,
  pub metadata: RecordMetadata,
}

/// Convert a record to an Arrow RecordBatch
pub fn record_to_batch(id: &str, metadata: &RecordMetadata, vector: &[f32], vector_dim: usize) -> Result<RecordBatch> {
  let id_arr = StringArray::from(vec![id.to_string()]);
  let source = StringArray::from(vec![metadata.source.as_str().to_string()]);
  let media_type = StringArray::from(vec![metadata.media_type.as_str().to_string()]);
  let native_id = StringArray::from(vec![metadata.native_id.clone()]);
  let title = StringArray::from(vec![metadata.title.clone()]);
  let description = StringArray::from(vec![metadata.description.clone()]);
  let extra = StringArray::from(vec![serde_json::to_string(&metadata.extra)?]);
  let created_at = Int64Array::from(vec![Utc::now().timestamp_millis()]);

  // Pad or truncate to the index dimensionality
  let mut values = vector.to_vec();
  values.resize(vector_dim, 0.0);
  let field = Arc::new(arrow_schema::Field::new("item", arrow_schema::DataType::Float32, true));
  let vector_list = FixedSizeListArray::try_new(field, vector_dim as i32, Arc::new(Float32Array::from(values)), None)?;

  let batch = RecordBatch::try_new(
    media_vectors_schema(vector_dim),
    vec![
      Arc::new(id_arr),
      Arc::new(source),
      Arc::new(media_type),
      Arc::new(native_id),
      Arc::new(title),
      Arc::new(description),
      Arc::new(extra),
      Arc::new(created_at),
      Arc::new(vector_list),
    ],
  )?;

  Ok(batch)
}

/// Convert a RecordBatch row to a VectorMatch.
///
/// `score` is cosine-style similarity derived from the `_distance` column
/// when present.
pub fn batch_to_match(batch: &RecordBatch, row: usize) -> Result<VectorMatch> {
  let get_string = |name: &str| -> Result<String> {
    batch
      .column_by_name(name)
      .and_then(|c| c.as_any().downcast_ref::<StringArray>())
      .map(|a| a.value(row).to_string())
      .ok_or_else(|| StoreError::InvalidRecord(format!("column {}", name)))
  };

  let id = get_string("id")?;
  let source = get_string("source")?
    .parse::<MediaSource>()
    .map_err(StoreError::InvalidRecord)?;
  let media_type = get_string("media_type")?
    .parse::<MediaType>()
    .map_err(StoreError::InvalidRecord)?;

  let extra: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&get_string("extra")?)?;

  let distance = batch
    .column_by_name("_distance")
    .and_then(|col| col.as_any().downcast_ref::<Float32Array>())
    .filter(|arr| !arr.is_null(row))
    .map(|arr| arr.value(row))
    .unwrap_or(0.0);
  let score = (1.0 - distance).clamp(-1.0, 1.0);

  Ok(VectorMatch {
    id,
    score,
    metadata: RecordMetadata {
      source,
      media_type,
      native_id: get_string("native_id")?,
      title: get_string("title")?,
      description: get_string("description")?,
      extra,
    },
  })
}
