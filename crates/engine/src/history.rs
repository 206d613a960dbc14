use async_trait::async_trait;
use attune_core::{MoodSignal, MoodSignalId, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Persistence collaborator for mood/journal/recommendation records.
///
/// Durable storage is external to this engine; this trait is the whole
/// contract the orchestrator needs from it.
#[async_trait]
pub trait MoodHistory: Send + Sync {
  /// Most recent mood signal for a user, if any
  async fn find_latest_mood_signal(&self, user_id: &str) -> Result<Option<MoodSignal>>;

  /// Journal text for a source id, if still available
  async fn find_journal_text(&self, source_id: &str) -> Result<Option<String>>;

  /// Best-effort audit write of a recommendation payload
  async fn create_audit_record(&self, user_id: &str, mood_signal_id: MoodSignalId, payload: serde_json::Value)
  -> Result<()>;
}

/// One persisted recommendation payload
#[derive(Debug, Clone)]
pub struct AuditRecord {
  pub user_id: String,
  pub mood_signal_id: MoodSignalId,
  pub payload: serde_json::Value,
  pub created_at: DateTime<Utc>,
}

/// In-process [`MoodHistory`] used by the daemon and tests
#[derive(Default)]
pub struct MemoryHistory {
  signals: RwLock<HashMap<String, Vec<MoodSignal>>>,
  journals: RwLock<HashMap<String, String>>,
  audits: RwLock<Vec<AuditRecord>>,
}

impl MemoryHistory {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record a classified mood signal (and its journal text)
  pub async fn record_signal(&self, signal: MoodSignal) {
    self
      .journals
      .write()
      .await
      .insert(signal.source_id.clone(), signal.source_text.clone());
    self
      .signals
      .write()
      .await
      .entry(signal.user_id.clone())
      .or_default()
      .push(signal);
  }

  pub async fn audit_records(&self) -> Vec<AuditRecord> {
    self.audits.read().await.clone()
  }

  pub async fn signal_count(&self, user_id: &str) -> usize {
    self.signals.read().await.get(user_id).map(|s| s.len()).unwrap_or(0)
  }
}

#[async_trait]
impl MoodHistory for MemoryHistory {
  async fn find_latest_mood_signal(&self, user_id: &str) -> Result<Option<MoodSignal>> {
    let signals = self.signals.read().await;
    Ok(
      signals
        .get(user_id)
        .and_then(|list| list.iter().max_by_key(|s| s.created_at))
        .cloned(),
    )
  }

  async fn find_journal_text(&self, source_id: &str) -> Result<Option<String>> {
    Ok(self.journals.read().await.get(source_id).cloned())
  }

  async fn create_audit_record(
    &self,
    user_id: &str,
    mood_signal_id: MoodSignalId,
    payload: serde_json::Value,
  ) -> Result<()> {
    self.audits.write().await.push(AuditRecord {
      user_id: user_id.to_string(),
      mood_signal_id,
      payload,
      created_at: Utc::now(),
    });
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_latest_signal_wins() {
    let history = MemoryHistory::new();

    let mut first = MoodSignal::new("user-1", "Sad", "rough morning", "j1");
    first.created_at = Utc::now() - chrono::Duration::hours(2);
    let second = MoodSignal::new("user-1", "Happy", "things turned around", "j2");

    history.record_signal(first).await;
    history.record_signal(second).await;

    let latest = history.find_latest_mood_signal("user-1").await.unwrap().unwrap();
    assert_eq!(latest.label, "Happy");
  }

  #[tokio::test]
  async fn test_unknown_user_has_no_signal() {
    let history = MemoryHistory::new();
    assert!(history.find_latest_mood_signal("nobody").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_journal_text_lookup() {
    let history = MemoryHistory::new();
    history
      .record_signal(MoodSignal::new("user-1", "Calm", "an evening by the fire", "j9"))
      .await;

    let text = history.find_journal_text("j9").await.unwrap();
    assert_eq!(text.as_deref(), Some("an evening by the fire"));
    assert!(history.find_journal_text("j-missing").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_audit_records_append() {
    let history = MemoryHistory::new();
    let id = MoodSignalId::new();

    history
      .create_audit_record("user-1", id, serde_json::json!({"total_count": 3}))
      .await
      .unwrap();

    let audits = history.audit_records().await;
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].mood_signal_id, id);
    assert_eq!(audits[0].payload["total_count"], 3);
  }
}
