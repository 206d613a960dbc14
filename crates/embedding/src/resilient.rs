// Retry wrapper for embedding providers.
//
// Providers themselves never retry; this wrapper owns the retry policy for
// callers that want one (exponential backoff with jitter, bounded attempts,
// per-attempt timeout).

use crate::{EmbeddingError, EmbeddingProvider};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry policy for embedding calls
#[derive(Debug, Clone)]
pub struct RetryConfig {
  /// Maximum number of retry attempts
  pub max_retries: u32,
  /// Initial backoff duration
  pub initial_backoff: Duration,
  /// Maximum backoff duration
  pub max_backoff: Duration,
  /// Backoff multiplier (exponential factor)
  pub backoff_multiplier: f64,
  /// Whether to add jitter to backoff
  pub add_jitter: bool,
  /// Per-attempt timeout
  pub request_timeout: Duration,
}

impl Default for RetryConfig {
  fn default() -> Self {
    Self {
      max_retries: 3,
      initial_backoff: Duration::from_millis(500),
      max_backoff: Duration::from_secs(15),
      backoff_multiplier: 2.0,
      add_jitter: true,
      request_timeout: Duration::from_secs(15),
    }
  }
}

impl RetryConfig {
  /// Calculate backoff duration for a given attempt
  pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
    let base = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
    let mut backoff = Duration::from_secs_f64(base.min(self.max_backoff.as_secs_f64()));

    if self.add_jitter {
      // Up to 25% jitter
      let jitter_factor = 1.0 + (rand_f64() * 0.25);
      backoff = Duration::from_secs_f64(backoff.as_secs_f64() * jitter_factor);
    }

    backoff.min(self.max_backoff)
  }
}

/// A simple pseudo-random number generator for jitter (no external deps)
fn rand_f64() -> f64 {
  use std::time::{SystemTime, UNIX_EPOCH};

  let nanos = SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .subsec_nanos();

  (nanos as f64 / u32::MAX as f64).fract()
}

/// Check if an error is retryable
pub fn is_retryable_error(error: &EmbeddingError) -> bool {
  match error {
    EmbeddingError::Network(_) | EmbeddingError::Timeout | EmbeddingError::Quota(_) => true,
    EmbeddingError::Provider(msg) => {
      // Transient upstream statuses
      msg.contains("502") || msg.contains("503") || msg.contains("504")
    }
    _ => false,
  }
}

/// An embedding provider that wraps another provider with retry logic
pub struct ResilientProvider<P: EmbeddingProvider> {
  inner: P,
  config: RetryConfig,
}

impl<P: EmbeddingProvider> ResilientProvider<P> {
  pub fn new(provider: P) -> Self {
    Self {
      inner: provider,
      config: RetryConfig::default(),
    }
  }

  pub fn with_config(provider: P, config: RetryConfig) -> Self {
    Self {
      inner: provider,
      config,
    }
  }

  async fn embed_with_retry(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
    let mut last_error = None;

    for attempt in 0..=self.config.max_retries {
      if attempt > 0 {
        let backoff = self.config.backoff_for_attempt(attempt - 1);
        debug!("Retry attempt {} after {:?}", attempt, backoff);
        sleep(backoff).await;
      }

      match tokio::time::timeout(self.config.request_timeout, self.inner.embed(text)).await {
        Ok(Ok(result)) => return Ok(result),
        Ok(Err(e)) => {
          if is_retryable_error(&e) && attempt < self.config.max_retries {
            warn!("Retryable embedding error on attempt {}: {}", attempt + 1, e);
            last_error = Some(e);
            continue;
          }
          return Err(e);
        }
        Err(_) => {
          warn!("Embedding request timed out on attempt {}", attempt + 1);
          last_error = Some(EmbeddingError::Timeout);
        }
      }
    }

    Err(last_error.unwrap_or_else(|| EmbeddingError::Provider("Max retries exceeded".to_string())))
  }
}

#[async_trait]
impl<P: EmbeddingProvider + Send + Sync> EmbeddingProvider for ResilientProvider<P> {
  fn name(&self) -> &str {
    self.inner.name()
  }

  fn model_id(&self) -> &str {
    self.inner.model_id()
  }

  fn dimensions(&self) -> usize {
    self.inner.dimensions()
  }

  async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
    self.embed_with_retry(text).await
  }

  async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut results = Vec::with_capacity(texts.len());

    for text in texts {
      // Each text gets its own retry budget
      results.push(self.embed_with_retry(text).await?);
    }

    Ok(results)
  }

  async fn is_available(&self) -> bool {
    self.inner.is_available().await
  }
}

/// Wrap an embedding provider with retry logic, shareable across tasks
pub fn wrap_resilient<P>(provider: P) -> Arc<dyn EmbeddingProvider + Send + Sync>
where
  P: EmbeddingProvider + Send + Sync + 'static,
{
  Arc::new(ResilientProvider::new(provider))
}
