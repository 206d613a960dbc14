use async_trait::async_trait;
use attune_core::{CandidateItem, MediaType};

use crate::error::Result;

/// A mood-keyed catalog search backend.
///
/// Adapters are independent of each other and of vector search; a failure in
/// one must never block the others.
#[async_trait]
pub trait MoodCatalog: Send + Sync {
  fn name(&self) -> &str;

  /// Media types this catalog can produce
  fn supported_types(&self) -> &'static [MediaType];

  /// Fetch raw candidates for a mood label.
  ///
  /// The label is matched case-insensitively against a static taxonomy with
  /// a neutral default, so every input resolves to some query. Returned
  /// items are deduplicated by native id but otherwise in provider order;
  /// ranking happens downstream.
  async fn fetch_by_mood(
    &self,
    label: &str,
    category: Option<&str>,
    media_type: MediaType,
    max_results: usize,
  ) -> Result<Vec<CandidateItem>>;
}
