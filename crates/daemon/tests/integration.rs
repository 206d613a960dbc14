//! End-to-end daemon tests over a real unix socket and vector index.

use async_trait::async_trait;
use attune_core::{MediaSource, MediaType};
use catalog::{MoodCatalog, TmdbCatalog, YouTubeCatalog};
use daemon::{App, Client, Router, Server};
use embedding::{EmbeddingCache, EmbeddingError, EmbeddingProvider};
use engine::{MemoryHistory, MoodHistory, Recommender};
use std::sync::Arc;
use tempfile::TempDir;
use vector::{MediaIndex, MediaStore, RecordMetadata, VectorStore};

const DIM: usize = 8;

/// Deterministic local embedding: equal text embeds equally, no network
struct LocalProvider;

#[async_trait]
impl EmbeddingProvider for LocalProvider {
  fn name(&self) -> &str {
    "local"
  }

  fn model_id(&self) -> &str {
    "local-test"
  }

  fn dimensions(&self) -> usize {
    DIM
  }

  async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
    let mut vector = vec![0.0_f32; DIM];
    for (i, byte) in text.bytes().enumerate() {
      vector[i % DIM] += byte as f32 / 255.0;
    }
    Ok(vector)
  }

  async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut out = Vec::new();
    for text in texts {
      out.push(self.embed(text).await?);
    }
    Ok(out)
  }

  async fn is_available(&self) -> bool {
    true
  }
}

async fn build_app(temp_dir: &TempDir) -> Arc<App> {
  let cache = Arc::new(EmbeddingCache::new(Arc::new(LocalProvider) as Arc<dyn EmbeddingProvider>));
  let index = MediaIndex::open_at_path(temp_dir.path().join("media.lancedb"), DIM)
    .await
    .unwrap();
  let store: Arc<dyn VectorStore> = Arc::new(MediaStore::new(index, Arc::clone(&cache)));
  let history = Arc::new(MemoryHistory::new());

  // No API keys: both catalogs degrade with NotConfigured at request time
  let recommender = Arc::new(Recommender::new(
    Arc::clone(&history) as Arc<dyn MoodHistory>,
    Arc::clone(&store),
    Arc::new(YouTubeCatalog::new("")) as Arc<dyn MoodCatalog>,
    Arc::new(TmdbCatalog::new("")) as Arc<dyn MoodCatalog>,
  ));

  Arc::new(App {
    recommender,
    history,
    cache,
  })
}

struct Harness {
  _temp_dir: TempDir,
  app: Arc<App>,
  client: Client,
  shutdown: daemon::ShutdownHandle,
  server_task: tokio::task::JoinHandle<()>,
}

async fn start_daemon() -> Harness {
  let temp_dir = TempDir::new().unwrap();
  let app = build_app(&temp_dir).await;
  let socket_path = temp_dir.path().join("attune.sock");

  let router = Arc::new(Router::new(Arc::clone(&app)));
  let server = Server::with_socket_path(Arc::clone(&router), socket_path.clone());
  let shutdown = server.shutdown_handle();
  router.set_shutdown_handle(server.shutdown_handle()).await;

  let server_task = tokio::spawn(async move {
    let _ = server.run().await;
  });
  tokio::time::sleep(std::time::Duration::from_millis(50)).await;

  let client = Client::connect_to(&socket_path).await.unwrap();

  Harness {
    _temp_dir: temp_dir,
    app,
    client,
    shutdown,
    server_task,
  }
}

impl Harness {
  async fn stop(self) {
    self.shutdown.shutdown();
    let _ = self.server_task.await;
  }
}

#[tokio::test]
async fn test_ping_and_status() {
  let mut harness = start_daemon().await;

  let pong = harness.client.call("ping", serde_json::json!({})).await.unwrap();
  assert_eq!(pong.result.unwrap(), serde_json::json!("pong"));

  let status = harness.client.call("status", serde_json::json!({})).await.unwrap();
  let status = status.result.unwrap();
  assert_eq!(status["status"], "running");
  assert!(status["embedding_cache"]["entries"].is_number());

  harness.stop().await;
}

#[tokio::test]
async fn test_recommend_without_history_reports_no_mood_signal() {
  let mut harness = start_daemon().await;

  let response = harness
    .client
    .call("recommend", serde_json::json!({"user_id": "stranger"}))
    .await
    .unwrap();

  let error = response.error.expect("expected an error");
  assert_eq!(error.code, -32001);
  assert!(error.message.contains("stranger"));

  harness.stop().await;
}

#[tokio::test]
async fn test_mood_record_embeds_journal() {
  let mut harness = start_daemon().await;

  let response = harness
    .client
    .call(
      "mood_record",
      serde_json::json!({
          "user_id": "user-1",
          "label": "Happy",
          "score": 0.9,
          "category": "Positive",
          "text": "a bright start to the week",
          "source_id": "j1",
      }),
    )
    .await
    .unwrap();

  let result = response.result.unwrap();
  assert_eq!(result["label"], "Happy");
  assert_eq!(result["vector_id"], "journal:j1");
  assert_eq!(harness.app.history.signal_count("user-1").await, 1);

  harness.stop().await;
}

#[tokio::test]
async fn test_recommend_serves_vector_matches() {
  let mut harness = start_daemon().await;

  // Pre-populate the index with media close to the journal text
  let video_meta = RecordMetadata::new(
    MediaSource::Youtube,
    MediaType::Video,
    "v1",
    "sunrise hike highlights",
    "a bright morning hike",
  );
  let store_probe = build_store_handle(&harness).await;
  store_probe
    .upsert("youtube:video:v1", "a bright morning hike", video_meta)
    .await
    .unwrap();

  harness
    .client
    .call(
      "mood_record",
      serde_json::json!({
          "user_id": "user-1",
          "label": "Happy",
          "text": "a bright morning hike",
          "source_id": "j1",
      }),
    )
    .await
    .unwrap();

  let response = harness
    .client
    .call("recommend", serde_json::json!({"user_id": "user-1"}))
    .await
    .unwrap();

  let result = response.result.expect("expected a result");
  assert_eq!(result["search_method"], "vector_similarity");
  assert_eq!(result["videos"][0]["native_id"], "v1");
  assert_eq!(result["total_count"], 1);

  harness.stop().await;
}

#[tokio::test]
async fn test_recommend_returns_structured_empty_result() {
  let mut harness = start_daemon().await;

  // Journal embedded, index has no media, catalogs unconfigured: the caller
  // still receives a structured empty result, not an error
  harness
    .client
    .call(
      "mood_record",
      serde_json::json!({
          "user_id": "user-2",
          "label": "Stressed",
          "text": "too many meetings today",
      }),
    )
    .await
    .unwrap();

  let response = harness
    .client
    .call("recommend", serde_json::json!({"user_id": "user-2"}))
    .await
    .unwrap();

  let result = response.result.expect("expected a result");
  assert_eq!(result["total_count"], 0);
  assert_eq!(result["search_method"], "keyword_only");

  harness.stop().await;
}

#[tokio::test]
async fn test_unknown_method() {
  let mut harness = start_daemon().await;

  let response = harness.client.call("nonsense", serde_json::json!({})).await.unwrap();
  assert_eq!(response.error.unwrap().code, -32601);

  harness.stop().await;
}

/// Open a second store handle onto the harness's index directory
async fn build_store_handle(harness: &Harness) -> MediaStore {
  let cache = Arc::new(EmbeddingCache::new(Arc::new(LocalProvider) as Arc<dyn EmbeddingProvider>));
  let index = MediaIndex::open_at_path(harness._temp_dir.path().join("media.lancedb"), DIM)
    .await
    .unwrap();
  MediaStore::new(index, cache)
}
