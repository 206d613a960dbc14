use attune_core::MediaType;
use catalog::CatalogError;
use tokio::sync::mpsc::UnboundedSender;

/// Typed observability events emitted while a recommendation is assembled.
///
/// Failures absorbed into degraded sub-results surface here so callers and
/// tests can assert on the classification instead of matching log output.
#[derive(Debug, Clone)]
pub enum EngineEvent {
  /// The vector query errored or timed out; keyword fallback was taken
  VectorSearchFailed { error: String },
  /// One catalog fetch degraded to an empty bucket
  CatalogDegraded {
    catalog: String,
    media_type: MediaType,
    error: CatalogError,
  },
  /// A single re-rank call failed; the item was scored 0
  RerankDegraded { record_id: String, error: String },
  /// A best-effort vector write failed during background persistence
  PersistFailed { record_id: String, error: String },
  /// The audit record write failed
  AuditFailed { error: String },
  /// Background persistence finished; `written` counts new vector records
  PersistFinished { written: usize },
}

/// Optional sink for engine events; dropping receivers never blocks the engine
#[derive(Debug, Clone, Default)]
pub struct EventSink {
  tx: Option<UnboundedSender<EngineEvent>>,
}

impl EventSink {
  pub fn new(tx: UnboundedSender<EngineEvent>) -> Self {
    Self { tx: Some(tx) }
  }

  pub fn none() -> Self {
    Self { tx: None }
  }

  pub fn emit(&self, event: EngineEvent) {
    if let Some(ref tx) = self.tx {
      let _ = tx.send(event);
    }
  }
}
