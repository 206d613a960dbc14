use serde::{Deserialize, Serialize};

/// JSON-RPC style request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
  #[serde(default)]
  pub id: Option<serde_json::Value>,
  pub method: String,
  #[serde(default)]
  pub params: serde_json::Value,
}

impl Request {
  pub fn new(method: impl Into<String>, params: serde_json::Value) -> Self {
    Self {
      id: None,
      method: method.into(),
      params,
    }
  }
}

/// JSON-RPC style response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<serde_json::Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub result: Option<serde_json::Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<RpcError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
  pub code: i32,
  pub message: String,
}

/// Method not found
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Malformed params
pub const INVALID_PARAMS: i32 = -32602;
/// Malformed request JSON
pub const PARSE_ERROR: i32 = -32700;
/// Generic server failure
pub const INTERNAL_ERROR: i32 = -32000;
/// The user has no mood history yet
pub const NO_MOOD_SIGNAL: i32 = -32001;
/// Every recommendation source failed
pub const SOURCES_UNAVAILABLE: i32 = -32002;

impl Response {
  pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
    Self {
      id,
      result: Some(result),
      error: None,
    }
  }

  pub fn error(id: Option<serde_json::Value>, code: i32, message: &str) -> Self {
    Self {
      id,
      result: None,
      error: Some(RpcError {
        code,
        message: message.to_string(),
      }),
    }
  }
}
