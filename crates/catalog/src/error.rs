use thiserror::Error;

/// Typed catalog adapter failures.
///
/// Callers use the variant to decide whether to skip the adapter gracefully
/// (empty bucket, log) rather than abort the whole recommendation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
  #[error("Catalog not configured: missing {0}")]
  NotConfigured(&'static str),
  #[error("Quota exceeded: {0}")]
  QuotaExceeded(String),
  #[error("Forbidden: {0}")]
  Forbidden(String),
  #[error("Transient catalog error: {0}")]
  Transient(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
  /// Map a reqwest transport failure into the taxonomy
  pub fn from_transport(error: reqwest::Error) -> Self {
    if error.is_timeout() {
      CatalogError::Transient("request timed out".to_string())
    } else {
      CatalogError::Transient(error.to_string())
    }
  }
}
