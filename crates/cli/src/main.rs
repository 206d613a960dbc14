use anyhow::{Context, Result, bail};
use attune_core::Config;
use clap::{Parser, Subcommand};
use daemon::{Client, Router, Server, default_socket_path};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "attune")]
#[command(about = "Mood-aware media recommendations from your journal")]
struct Cli {
  /// Path to a config file (default: ~/.config/attune/config.toml)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run the daemon in the foreground
  Daemon,
  /// Record a classified mood signal with its journal text
  Mood {
    /// User the signal belongs to
    #[arg(short, long)]
    user: String,
    /// Mood label (happy, sad, angry, stressed, calm, neutral, ...)
    #[arg(short, long)]
    label: String,
    /// The journal text the mood was derived from
    text: String,
    /// Classifier confidence in [0, 1]
    #[arg(long)]
    score: Option<f32>,
    /// Mood polarity (Positive, Negative, Neutral)
    #[arg(long)]
    category: Option<String>,
  },
  /// Fetch recommendations for a user's latest mood
  Recommend {
    /// User to recommend for
    #[arg(short, long)]
    user: String,
    /// Print the raw JSON result
    #[arg(long)]
    json: bool,
  },
  /// Show daemon status
  Status,
  /// Ask a running daemon to shut down
  Shutdown,
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let cli = Cli::parse();
  let config = match cli.config {
    Some(ref path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
    None => Config::load_or_default(),
  };

  match cli.command {
    Commands::Daemon => run_daemon(config).await,
    Commands::Mood {
      user,
      label,
      text,
      score,
      category,
    } => {
      let mut params = serde_json::json!({
          "user_id": user,
          "label": label,
          "text": text,
      });
      if let Some(score) = score {
        params["score"] = serde_json::json!(score);
      }
      if let Some(category) = category {
        params["category"] = serde_json::json!(category);
      }

      let result = call_daemon("mood_record", params).await?;
      println!("{}", serde_json::to_string_pretty(&result)?);
      Ok(())
    }
    Commands::Recommend { user, json } => {
      let result = call_daemon("recommend", serde_json::json!({"user_id": user})).await?;
      if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
      } else {
        print_recommendations(&result);
      }
      Ok(())
    }
    Commands::Status => {
      let result = call_daemon("status", serde_json::json!({})).await?;
      println!("{}", serde_json::to_string_pretty(&result)?);
      Ok(())
    }
    Commands::Shutdown => {
      let result = call_daemon("shutdown", serde_json::json!({})).await?;
      println!("{}", serde_json::to_string_pretty(&result)?);
      Ok(())
    }
  }
}

async fn run_daemon(config: Config) -> Result<()> {
  let app = daemon::bootstrap(&config).await.context("building engine")?;
  let router = Arc::new(Router::new(Arc::new(app)));
  let server = Server::new(Arc::clone(&router));
  router.set_shutdown_handle(server.shutdown_handle()).await;

  let shutdown = server.shutdown_handle();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      info!("Ctrl-C received, shutting down");
      shutdown.shutdown();
    }
  });

  server.run().await.context("running daemon")?;
  Ok(())
}

async fn call_daemon(method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
  let socket = default_socket_path();
  let mut client = Client::connect_to(&socket)
    .await
    .with_context(|| format!("connecting to daemon at {:?} (is `attune daemon` running?)", socket))?;

  let response = client.call(method, params).await.context("calling daemon")?;

  if let Some(error) = response.error {
    bail!("{} (code {})", error.message, error.code);
  }
  response.result.context("daemon returned an empty response")
}

fn print_recommendations(result: &serde_json::Value) {
  println!(
    "Mood: {} ({})",
    result["mood_label"].as_str().unwrap_or("?"),
    result["mood_category"].as_str().unwrap_or("n/a")
  );
  println!(
    "Method: {} | {} items",
    result["search_method"].as_str().unwrap_or("?"),
    result["total_count"]
  );

  for (heading, key) in [("Videos", "videos"), ("Songs", "songs"), ("Movies", "movies")] {
    let Some(items) = result[key].as_array() else { continue };
    if items.is_empty() {
      continue;
    }
    println!("\n{}:", heading);
    for item in items {
      let title = item["title"].as_str().unwrap_or("?");
      match item["similarity"].as_f64() {
        Some(similarity) => println!("  {:.2}  {}", similarity, title),
        None => println!("        {}", title),
      }
    }
  }
}
