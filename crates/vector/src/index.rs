use embedding::EmbeddingError;
use lancedb::{Connection, connect};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::schema::media_vectors_schema;

pub const MEDIA_TABLE: &str = "media_vectors";

#[derive(Error, Debug)]
pub enum StoreError {
  #[error("LanceDB error: {0}")]
  Lance(#[from] lancedb::Error),
  #[error("Arrow error: {0}")]
  Arrow(#[from] arrow::error::ArrowError),
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
  #[error("Embedding error: {0}")]
  Embedding(#[from] EmbeddingError),
  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
  #[error("Invalid record: {0}")]
  InvalidRecord(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Connection to the media vector index
pub struct MediaIndex {
  pub path: PathBuf,
  pub connection: Connection,
  pub vector_dim: usize,
}

impl MediaIndex {
  /// Open or create the index at a specific path
  pub async fn open_at_path(db_path: PathBuf, vector_dim: usize) -> Result<Self> {
    if let Some(parent) = db_path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    info!("Opening media vector index at {:?}", db_path);
    let connection = connect(db_path.to_string_lossy().as_ref()).execute().await?;

    let index = Self {
      path: db_path,
      connection,
      vector_dim,
    };

    index.ensure_tables().await?;

    Ok(index)
  }

  /// Ensure the media_vectors table exists
  async fn ensure_tables(&self) -> Result<()> {
    let table_names = self.connection.table_names().execute().await?;

    if !table_names.contains(&MEDIA_TABLE.to_string()) {
      debug!("Creating {} table", MEDIA_TABLE);
      self
        .connection
        .create_empty_table(MEDIA_TABLE, media_vectors_schema(self.vector_dim))
        .execute()
        .await?;
    }

    Ok(())
  }

  /// Get the media_vectors table
  pub async fn media_table(&self) -> Result<lancedb::Table> {
    Ok(self.connection.open_table(MEDIA_TABLE).execute().await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[tokio::test]
  async fn test_open_creates_table() {
    let temp_dir = TempDir::new().unwrap();

    let index = MediaIndex::open_at_path(temp_dir.path().join("test.lancedb"), 8)
      .await
      .unwrap();

    let tables = index.connection.table_names().execute().await.unwrap();
    assert!(tables.contains(&MEDIA_TABLE.to_string()));
  }

  #[tokio::test]
  async fn test_reopen_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.lancedb");

    let first = MediaIndex::open_at_path(path.clone(), 8).await.unwrap();
    drop(first);
    let second = MediaIndex::open_at_path(path, 8).await.unwrap();

    assert_eq!(second.vector_dim, 8);
  }
}
