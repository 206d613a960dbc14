use crate::bootstrap::DaemonError;
use crate::router::Router;
use crate::rpc::{self, Request, Response};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Get the default socket path
pub fn default_socket_path() -> PathBuf {
  if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
    PathBuf::from(runtime_dir).join("attune.sock")
  } else {
    let uid = unsafe { libc::getuid() };
    PathBuf::from(format!("/tmp/attune-{}.sock", uid))
  }
}

/// Line-delimited JSON-RPC server over a unix socket
pub struct Server {
  socket_path: PathBuf,
  router: Arc<Router>,
  shutdown_tx: broadcast::Sender<()>,
}

impl Server {
  pub fn new(router: Arc<Router>) -> Self {
    Self::with_socket_path(router, default_socket_path())
  }

  pub fn with_socket_path(router: Arc<Router>, socket_path: PathBuf) -> Self {
    let (shutdown_tx, _) = broadcast::channel(1);
    Self {
      socket_path,
      router,
      shutdown_tx,
    }
  }

  /// Get a shutdown handle to signal server shutdown
  pub fn shutdown_handle(&self) -> ShutdownHandle {
    ShutdownHandle {
      tx: self.shutdown_tx.clone(),
    }
  }

  pub fn socket_path(&self) -> &Path {
    &self.socket_path
  }

  /// Accept connections until shutdown is signalled
  pub async fn run(&self) -> Result<(), DaemonError> {
    if self.socket_path.exists() {
      std::fs::remove_file(&self.socket_path)?;
    }
    if let Some(parent) = self.socket_path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    let listener = UnixListener::bind(&self.socket_path)?;
    info!("Daemon listening on {:?}", self.socket_path);

    let mut shutdown_rx = self.shutdown_tx.subscribe();

    loop {
      tokio::select! {
          accepted = listener.accept() => {
              match accepted {
                  Ok((stream, _)) => {
                      let router = Arc::clone(&self.router);
                      tokio::spawn(async move {
                          if let Err(e) = handle_connection(stream, router).await {
                              error!("Connection error: {}", e);
                          }
                      });
                  }
                  Err(e) => error!("Accept error: {}", e),
              }
          }
          _ = shutdown_rx.recv() => {
              info!("Shutdown signal received");
              break;
          }
      }
    }

    if self.socket_path.exists() {
      std::fs::remove_file(&self.socket_path)?;
    }

    Ok(())
  }
}

/// Handle to signal server shutdown
#[derive(Clone)]
pub struct ShutdownHandle {
  tx: broadcast::Sender<()>,
}

impl ShutdownHandle {
  pub fn shutdown(&self) {
    let _ = self.tx.send(());
  }
}

/// Serve one client connection: one JSON request per line, one response back
async fn handle_connection(stream: UnixStream, router: Arc<Router>) -> Result<(), DaemonError> {
  let (reader, mut writer) = stream.into_split();
  let mut reader = BufReader::new(reader);
  let mut line = String::new();

  loop {
    line.clear();
    let read = reader.read_line(&mut line).await?;
    if read == 0 {
      debug!("Client disconnected");
      break;
    }

    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    let response = match serde_json::from_str::<Request>(trimmed) {
      Ok(request) => {
        debug!("Request: {} (id={:?})", request.method, request.id);
        router.handle(request).await
      }
      Err(e) => {
        warn!("Invalid request JSON: {}", e);
        Response::error(None, rpc::PARSE_ERROR, &format!("Parse error: {}", e))
      }
    };

    let json = serde_json::to_string(&response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
  }

  Ok(())
}

/// Client for talking to a running daemon
pub struct Client {
  stream: UnixStream,
}

impl Client {
  /// Connect to the daemon at the default socket path
  pub async fn connect() -> Result<Self, DaemonError> {
    Self::connect_to(&default_socket_path()).await
  }

  pub async fn connect_to(socket_path: &Path) -> Result<Self, DaemonError> {
    let stream = UnixStream::connect(socket_path).await?;
    Ok(Self { stream })
  }

  /// Send one request and wait for its response
  pub async fn call(&mut self, method: &str, params: serde_json::Value) -> Result<Response, DaemonError> {
    static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
    let id = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);

    let request = Request {
      id: Some(serde_json::Value::Number(id.into())),
      method: method.to_string(),
      params,
    };

    let (reader, mut writer) = self.stream.split();

    let json = serde_json::to_string(&request)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;

    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    reader.read_line(&mut line).await?;

    Ok(serde_json::from_str(&line)?)
  }
}
