use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
  fn name(&self) -> &str;
  fn model_id(&self) -> &str;
  fn dimensions(&self) -> usize;

  async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
  async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
  async fn is_available(&self) -> bool;
}

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
  #[error("Provider not available")]
  NotAvailable,
  #[error("Request failed: {0}")]
  Request(#[from] reqwest::Error),
  #[error("Provider error: {0}")]
  Provider(String),
  #[error("Authentication rejected: {0}")]
  Auth(String),
  #[error("Quota exceeded: {0}")]
  Quota(String),
  #[error("Network error: {0}")]
  Network(String),
  #[error("Request timed out")]
  Timeout,
}

impl EmbeddingError {
  /// Classify an HTTP failure status into an error variant
  pub fn from_status(provider: &str, status: reqwest::StatusCode, body: String) -> Self {
    match status.as_u16() {
      401 | 403 => EmbeddingError::Auth(format!("{} returned {}: {}", provider, status, body)),
      429 => EmbeddingError::Quota(format!("{} returned {}: {}", provider, status, body)),
      _ => EmbeddingError::Provider(format!("{} returned {}: {}", provider, status, body)),
    }
  }
}
