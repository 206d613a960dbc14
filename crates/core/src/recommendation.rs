use crate::media::CandidateItem;
use crate::mood::MoodSignal;
use serde::{Deserialize, Serialize};

/// How the result set was retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
  /// Nearest-neighbor retrieval from the vector index
  VectorSimilarity,
  /// Catalog keyword search, re-ranked by embedding similarity
  KeywordRerankedVector,
  /// Catalog keyword search only
  KeywordOnly,
}

impl SearchMethod {
  pub fn as_str(&self) -> &'static str {
    match self {
      SearchMethod::VectorSimilarity => "vector_similarity",
      SearchMethod::KeywordRerankedVector => "keyword_reranked_vector",
      SearchMethod::KeywordOnly => "keyword_only",
    }
  }
}

/// The ranked, deduplicated result of one orchestrator invocation.
///
/// Always structured: `total_count == 0` with no error means "no results",
/// not a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
  pub mood_label: String,
  pub mood_score: Option<f32>,
  pub mood_category: Option<String>,
  pub videos: Vec<CandidateItem>,
  pub songs: Vec<CandidateItem>,
  pub movies: Vec<CandidateItem>,
  pub search_method: SearchMethod,
  pub total_count: usize,
}

impl RecommendationResult {
  pub fn new(
    signal: &MoodSignal,
    videos: Vec<CandidateItem>,
    songs: Vec<CandidateItem>,
    movies: Vec<CandidateItem>,
    search_method: SearchMethod,
  ) -> Self {
    let total_count = videos.len() + songs.len() + movies.len();
    Self {
      mood_label: signal.label.clone(),
      mood_score: signal.score,
      mood_category: signal.category.clone(),
      videos,
      songs,
      movies,
      search_method,
      total_count,
    }
  }

  pub fn items(&self) -> impl Iterator<Item = &CandidateItem> {
    self.videos.iter().chain(self.songs.iter()).chain(self.movies.iter())
  }
}

/// Round a similarity score to 2 decimal places for presentation stability
pub fn round_similarity(score: f32) -> f32 {
  (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::media::ShortFormItem;

  fn item(id: &str) -> CandidateItem {
    CandidateItem::Song(ShortFormItem {
      native_id: id.to_string(),
      title: id.to_string(),
      description: String::new(),
      thumbnail_url: None,
      channel_title: "ch".to_string(),
      published_at: String::new(),
      similarity: None,
    })
  }

  #[test]
  fn test_total_count() {
    let signal = MoodSignal::new("u", "Calm", "text", "j1");
    let result = RecommendationResult::new(&signal, vec![item("a")], vec![item("b"), item("c")], vec![], SearchMethod::KeywordOnly);
    assert_eq!(result.total_count, 3);
    assert_eq!(result.items().count(), 3);
  }

  #[test]
  fn test_round_similarity() {
    assert_eq!(round_similarity(0.876), 0.88);
    assert_eq!(round_similarity(0.874), 0.87);
    assert_eq!(round_similarity(-0.456), -0.46);
  }

  #[test]
  fn test_search_method_serde() {
    let json = serde_json::to_string(&SearchMethod::KeywordRerankedVector).unwrap();
    assert_eq!(json, "\"keyword_reranked_vector\"");
  }
}
