pub mod events;
pub mod history;
pub mod orchestrator;
pub mod rerank;

#[cfg(test)]
pub(crate) mod testutil;

pub use events::{EngineEvent, EventSink};
pub use history::{AuditRecord, MemoryHistory, MoodHistory};
pub use orchestrator::Recommender;
pub use rerank::{Reranker, sort_by_similarity};
