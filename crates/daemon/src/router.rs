use crate::bootstrap::App;
use crate::rpc::{self, Request, Response};
use crate::server::ShutdownHandle;
use attune_core::{Error, MoodSignal};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Routes decoded requests to their handlers over shared app state
pub struct Router {
  app: Arc<App>,
  shutdown_handle: Arc<Mutex<Option<ShutdownHandle>>>,
}

impl Router {
  pub fn new(app: Arc<App>) -> Self {
    Self {
      app,
      shutdown_handle: Arc::new(Mutex::new(None)),
    }
  }

  /// Set the shutdown handle (called after the server is created)
  pub async fn set_shutdown_handle(&self, handle: ShutdownHandle) {
    let mut guard = self.shutdown_handle.lock().await;
    *guard = Some(handle);
  }

  /// Handle an incoming request
  pub async fn handle(&self, request: Request) -> Response {
    debug!("Handling request: {}", request.method);

    match request.method.as_str() {
      "ping" => Response::success(request.id, serde_json::json!("pong")),
      "status" => self.handle_status(request).await,
      "shutdown" => self.handle_shutdown(request).await,
      "mood_record" => self.handle_mood_record(request).await,
      "recommend" => self.handle_recommend(request).await,
      _ => {
        warn!("Unknown method: {}", request.method);
        Response::error(
          request.id,
          rpc::METHOD_NOT_FOUND,
          &format!("Method not found: {}", request.method),
        )
      }
    }
  }

  async fn handle_status(&self, request: Request) -> Response {
    let status = serde_json::json!({
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "embedding_cache": self.app.cache.stats(),
    });
    Response::success(request.id, status)
  }

  async fn handle_shutdown(&self, request: Request) -> Response {
    info!("Shutdown requested via RPC");
    let guard = self.shutdown_handle.lock().await;
    if let Some(ref handle) = *guard {
      handle.shutdown();
      Response::success(request.id, serde_json::json!({"status": "shutting_down"}))
    } else {
      Response::error(request.id, rpc::INTERNAL_ERROR, "Shutdown handle not available")
    }
  }

  /// Accept an upstream-classified mood signal and its journal text.
  ///
  /// The journal text is embedded best-effort so the vector path can serve
  /// this signal; embedding failure only disables that path.
  async fn handle_mood_record(&self, request: Request) -> Response {
    #[derive(Deserialize)]
    struct Args {
      user_id: String,
      label: String,
      text: String,
      #[serde(default)]
      score: Option<f32>,
      #[serde(default)]
      category: Option<String>,
      #[serde(default)]
      source_id: Option<String>,
    }

    let args: Args = match serde_json::from_value(request.params.clone()) {
      Ok(a) => a,
      Err(e) => return Response::error(request.id, rpc::INVALID_PARAMS, &format!("Invalid params: {}", e)),
    };

    let source_id = args.source_id.unwrap_or_else(|| uuid::Uuid::now_v7().to_string());
    let mut signal = MoodSignal::new(args.user_id, args.label, args.text, source_id);
    if let Some(score) = args.score {
      signal = signal.with_score(score);
    }
    if let Some(category) = args.category {
      signal = signal.with_category(category);
    }

    self.app.recommender.ingest_signal(&mut signal).await;

    let summary = serde_json::json!({
        "signal_id": signal.id.to_string(),
        "label": signal.label,
        "vector_id": signal.vector_id,
    });
    self.app.history.record_signal(signal).await;

    Response::success(request.id, summary)
  }

  async fn handle_recommend(&self, request: Request) -> Response {
    #[derive(Deserialize)]
    struct Args {
      user_id: String,
    }

    let args: Args = match serde_json::from_value(request.params.clone()) {
      Ok(a) => a,
      Err(e) => return Response::error(request.id, rpc::INVALID_PARAMS, &format!("Invalid params: {}", e)),
    };

    match self.app.recommender.recommend(&args.user_id).await {
      Ok(result) => match serde_json::to_value(&result) {
        Ok(value) => Response::success(request.id, value),
        Err(e) => Response::error(request.id, rpc::INTERNAL_ERROR, &format!("Serialization: {}", e)),
      },
      Err(e @ Error::NoMoodSignal { .. }) => Response::error(request.id, rpc::NO_MOOD_SIGNAL, &e.to_string()),
      Err(e @ Error::AllSourcesUnavailable) => Response::error(request.id, rpc::SOURCES_UNAVAILABLE, &e.to_string()),
      Err(e) => Response::error(request.id, rpc::INTERNAL_ERROR, &e.to_string()),
    }
  }
}
