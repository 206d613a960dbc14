use crate::gemini::classify_transport;
use crate::{EmbeddingError, EmbeddingProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "text-embedding-3-small";
const DEFAULT_DIMENSIONS: usize = 1536;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Embedding provider backed by the OpenAI embeddings API
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
  client: reqwest::Client,
  base_url: String,
  api_key: String,
  model: String,
  dimensions: usize,
}

impl OpenAiProvider {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      base_url: DEFAULT_BASE_URL.to_string(),
      api_key: api_key.into(),
      model: DEFAULT_MODEL.to_string(),
      dimensions: DEFAULT_DIMENSIONS,
    }
  }

  pub fn from_env() -> Option<Self> {
    std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()).map(Self::new)
  }

  pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
    self.base_url = url.into();
    self
  }

  pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
    self.model = model.into();
    self.dimensions = dimensions;
    self
  }

  fn embeddings_url(&self) -> String {
    format!("{}/v1/embeddings", self.base_url)
  }

  async fn request(&self, input: EmbeddingInput<'_>) -> Result<EmbeddingResponse, EmbeddingError> {
    let request = EmbeddingRequest {
      model: &self.model,
      input,
    };

    let response = self
      .client
      .post(self.embeddings_url())
      .timeout(REQUEST_TIMEOUT)
      .header("Authorization", format!("Bearer {}", self.api_key))
      .json(&request)
      .send()
      .await
      .map_err(classify_transport)?;

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      warn!("OpenAI embedding failed: {} - {}", status, body);
      return Err(EmbeddingError::from_status("OpenAI", status, body));
    }

    Ok(response.json().await?)
  }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
  model: &'a str,
  input: EmbeddingInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum EmbeddingInput<'a> {
  Single(&'a str),
  Batch(Vec<&'a str>),
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
  data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
  embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
  fn name(&self) -> &str {
    "openai"
  }

  fn model_id(&self) -> &str {
    &self.model
  }

  fn dimensions(&self) -> usize {
    self.dimensions
  }

  async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
    if text.is_empty() {
      return Err(EmbeddingError::Provider("cannot embed empty text".to_string()));
    }

    debug!("Embedding text with OpenAI: {} chars", text.len());

    let result = self.request(EmbeddingInput::Single(text)).await?;

    result
      .data
      .into_iter()
      .next()
      .map(|d| d.embedding)
      .ok_or_else(|| EmbeddingError::Provider("No embedding in response".into()))
  }

  async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if texts.is_empty() {
      return Ok(Vec::new());
    }

    debug!("Embedding {} texts with OpenAI", texts.len());

    let result = self.request(EmbeddingInput::Batch(texts.to_vec())).await?;
    Ok(result.data.into_iter().map(|d| d.embedding).collect())
  }

  async fn is_available(&self) -> bool {
    !self.api_key.is_empty()
  }
}
