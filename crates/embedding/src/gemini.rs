use crate::{EmbeddingError, EmbeddingProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-embedding-001";
const DEFAULT_DIMENSIONS: usize = 768;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Embedding provider backed by the Gemini REST API
#[derive(Debug, Clone)]
pub struct GeminiProvider {
  client: reqwest::Client,
  base_url: String,
  api_key: String,
  model: String,
  dimensions: usize,
}

impl GeminiProvider {
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
    std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty()).map(Self::new)
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

  fn embed_url(&self) -> String {
    format!(
      "{}/v1beta/models/{}:embedContent?key={}",
      self.base_url, self.model, self.api_key
    )
  }

  fn batch_url(&self) -> String {
    format!(
      "{}/v1beta/models/{}:batchEmbedContents?key={}",
      self.base_url, self.model, self.api_key
    )
  }

  fn request_for<'a>(&'a self, text: &'a str) -> EmbedRequest<'a> {
    EmbedRequest {
      model: None,
      content: Content {
        parts: vec![Part { text }],
      },
      output_dimensionality: self.dimensions,
    }
  }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  model: Option<String>,
  content: Content<'a>,
  #[serde(rename = "outputDimensionality")]
  output_dimensionality: usize,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
  parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
  text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
  embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
  values: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
  requests: Vec<EmbedRequest<'a>>,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
  embeddings: Vec<ContentEmbedding>,
}

#[async_trait]
impl EmbeddingProvider for GeminiProvider {
  fn name(&self) -> &str {
    "gemini"
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

    debug!("Embedding text with Gemini: {} chars", text.len());

    let response = self
      .client
      .post(self.embed_url())
      .timeout(REQUEST_TIMEOUT)
      .json(&self.request_for(text))
      .send()
      .await
      .map_err(classify_transport)?;

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      warn!("Gemini embedding failed: {} - {}", status, body);
      return Err(EmbeddingError::from_status("Gemini", status, body));
    }

    let result: EmbedResponse = response.json().await?;

    if result.embedding.values.len() != self.dimensions {
      warn!(
        "Unexpected embedding dimensions: got {}, expected {}",
        result.embedding.values.len(),
        self.dimensions
      );
    }

    Ok(result.embedding.values)
  }

  async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if texts.is_empty() {
      return Ok(Vec::new());
    }

    debug!("Embedding {} texts with Gemini", texts.len());

    // batchEmbedContents requires the model repeated per request entry
    let requests: Vec<EmbedRequest<'_>> = texts
      .iter()
      .map(|text| {
        let mut request = self.request_for(text);
        request.model = Some(format!("models/{}", self.model));
        request
      })
      .collect();

    let response = self
      .client
      .post(self.batch_url())
      .timeout(REQUEST_TIMEOUT)
      .json(&BatchRequest { requests })
      .send()
      .await
      .map_err(classify_transport)?;

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      warn!("Gemini batch embedding failed: {} - {}", status, body);
      return Err(EmbeddingError::from_status("Gemini", status, body));
    }

    let result: BatchResponse = response.json().await?;
    Ok(result.embeddings.into_iter().map(|e| e.values).collect())
  }

  async fn is_available(&self) -> bool {
    !self.api_key.is_empty()
  }
}

/// Map a reqwest transport failure to the embedding error taxonomy
pub(crate) fn classify_transport(error: reqwest::Error) -> EmbeddingError {
  if error.is_timeout() {
    EmbeddingError::Timeout
  } else if error.is_connect() {
    EmbeddingError::Network(error.to_string())
  } else {
    EmbeddingError::Request(error)
  }
}
