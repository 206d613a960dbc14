use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a mood signal (newtype for type safety)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoodSignalId(Uuid);

impl MoodSignalId {
  pub fn new() -> Self {
    Self(Uuid::now_v7()) // Time-ordered UUIDs
  }

  pub fn from_uuid(id: Uuid) -> Self {
    Self(id)
  }

  pub fn as_uuid(&self) -> Uuid {
    self.0
  }
}

impl Default for MoodSignalId {
  fn default() -> Self {
    Self::new()
  }
}

impl std::fmt::Display for MoodSignalId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl std::str::FromStr for MoodSignalId {
  type Err = uuid::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(Self(Uuid::parse_str(s)?))
  }
}

/// Structured output of classifying a journal entry's sentiment.
///
/// Produced upstream by the mood classifier; immutable once created. The
/// orchestrator only ever reads the most recent signal per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodSignal {
  pub id: MoodSignalId,
  pub user_id: String,
  /// Classifier label, e.g. "Happy", "Stressed". Matched case-insensitively.
  pub label: String,
  /// Classifier confidence in [0, 1], when the classifier reported one.
  pub score: Option<f32>,
  /// Coarse polarity ("Positive", "Negative", "Neutral"), when reported.
  pub category: Option<String>,
  /// The journal text the classification was derived from.
  pub source_text: String,
  /// Id of the originating journal entry.
  pub source_id: String,
  /// Vector record id, set when the source text was embedded at creation time.
  pub vector_id: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl MoodSignal {
  pub fn new(
    user_id: impl Into<String>,
    label: impl Into<String>,
    source_text: impl Into<String>,
    source_id: impl Into<String>,
  ) -> Self {
    Self {
      id: MoodSignalId::new(),
      user_id: user_id.into(),
      label: label.into(),
      score: None,
      category: None,
      source_text: source_text.into(),
      source_id: source_id.into(),
      vector_id: None,
      created_at: Utc::now(),
    }
  }

  pub fn with_score(mut self, score: f32) -> Self {
    self.score = Some(score.clamp(0.0, 1.0));
    self
  }

  pub fn with_category(mut self, category: impl Into<String>) -> Self {
    self.category = Some(category.into());
    self
  }

  pub fn with_vector_id(mut self, vector_id: impl Into<String>) -> Self {
    self.vector_id = Some(vector_id.into());
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_signal_builder() {
    let signal = MoodSignal::new("user-1", "Happy", "great day at the lake", "journal-1")
      .with_score(0.92)
      .with_category("Positive");

    assert_eq!(signal.label, "Happy");
    assert_eq!(signal.score, Some(0.92));
    assert_eq!(signal.category.as_deref(), Some("Positive"));
    assert!(signal.vector_id.is_none());
  }

  #[test]
  fn test_score_clamped() {
    let signal = MoodSignal::new("user-1", "Happy", "text", "journal-1").with_score(1.7);
    assert_eq!(signal.score, Some(1.0));
  }

  #[test]
  fn test_signal_ids_are_unique() {
    let a = MoodSignalId::new();
    let b = MoodSignalId::new();
    assert_ne!(a, b);
  }

  #[test]
  fn test_signal_id_roundtrip() {
    let id = MoodSignalId::new();
    let parsed: MoodSignalId = id.to_string().parse().unwrap();
    assert_eq!(id, parsed);
  }
}
