use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::*;

use crate::{Config, Error, Record};

/// Error reported by the remote service for a single call.
///
/// Mirrors the JSON error body PostgREST answers with, e.g.:
/// `{"code":"PGRST202","details":null,"hint":null,"message":"Could not find the function"}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ErrorDescriptor {
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub code: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub details: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hint: Option<String>,
}

impl ErrorDescriptor {
  pub fn new(message: impl Into<String>) -> Self {
    return Self {
      message: message.into(),
      ..Default::default()
    };
  }

  pub fn with_code(mut self, code: impl Into<String>) -> Self {
    self.code = Some(code.into());
    return self;
  }
}

/// Outcome of one RPC call. At most one of `data` and `error` is expected to be set.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RpcResponse {
  pub data: Option<Vec<Record>>,
  pub error: Option<ErrorDescriptor>,
}

impl RpcResponse {
  pub fn rows(rows: Vec<Record>) -> Self {
    return Self {
      data: Some(rows),
      error: None,
    };
  }

  pub fn error(error: ErrorDescriptor) -> Self {
    return Self {
      data: None,
      error: Some(error),
    };
  }
}

/// Capability to invoke a named remote procedure.
///
/// Failures are reported through the `error` field of [RpcResponse] rather than a Rust error.
#[async_trait]
pub trait RpcTransport: Send + Sync {
  async fn call(&self, procedure: &str, args: &serde_json::Value) -> RpcResponse;
}

/// [RpcTransport] speaking PostgREST's `POST /rest/v1/rpc/<name>` over HTTP.
pub struct HttpTransport {
  client: reqwest::Client,
  url: url::Url,
}

impl HttpTransport {
  pub fn new(config: &Config) -> Result<Self, Error> {
    let url = url::Url::parse(&config.url).map_err(Error::InvalidUrl)?;
    let client = reqwest::Client::builder()
      .default_headers(build_headers(&config.key)?)
      .build()
      .map_err(Error::OtherReqwest)?;

    return Ok(Self { client, url });
  }

  fn rpc_url(&self, procedure: &str) -> url::Url {
    let mut url = self.url.clone();
    let base = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{base}/{REST_API}/rpc/{procedure}"));
    return url;
  }
}

#[async_trait]
impl RpcTransport for HttpTransport {
  async fn call(&self, procedure: &str, args: &serde_json::Value) -> RpcResponse {
    let response = match self
      .client
      .post(self.rpc_url(procedure))
      .json(args)
      .send()
      .await
    {
      Ok(response) => response,
      Err(err) => return RpcResponse::error(ErrorDescriptor::new(err.to_string())),
    };

    let status = response.status();
    let body = match response.bytes().await {
      Ok(body) => body,
      Err(err) => return RpcResponse::error(ErrorDescriptor::new(err.to_string())),
    };

    if !status.is_success() {
      return RpcResponse::error(parse_error(status, &body));
    }

    return match parse_rows(&body) {
      Ok(data) => RpcResponse { data, error: None },
      Err(err) => {
        RpcResponse::error(ErrorDescriptor::new(format!("Invalid JSON response: {err}")))
      }
    };
  }
}

fn parse_rows(body: &[u8]) -> Result<Option<Vec<Record>>, serde_json::Error> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(None);
  }

  return Ok(match serde_json::from_slice::<Record>(body)? {
    Record::Null => None,
    Record::Array(rows) => Some(rows),
    // Functions returning a scalar or a single composite.
    value => Some(vec![value]),
  });
}

fn parse_error(status: StatusCode, body: &[u8]) -> ErrorDescriptor {
  if let Ok(descriptor) = serde_json::from_slice::<ErrorDescriptor>(body) {
    return descriptor;
  }

  debug!("Unstructured error body for HTTP status {status}");

  let text = String::from_utf8_lossy(body);
  let message = if text.trim().is_empty() {
    status
      .canonical_reason()
      .unwrap_or("Unknown error")
      .to_string()
  } else {
    text.into_owned()
  };
  return ErrorDescriptor::new(message).with_code(status.as_str());
}

fn build_headers(key: &str) -> Result<HeaderMap, Error> {
  let mut base = HeaderMap::with_capacity(3);
  base.insert(
    header::CONTENT_TYPE,
    HeaderValue::from_static("application/json"),
  );

  let invalid = |_| Error::InvalidKey("not a valid header value".to_string());
  let mut api_key = HeaderValue::from_str(key).map_err(invalid)?;
  api_key.set_sensitive(true);
  base.insert("apikey", api_key);

  let mut bearer = HeaderValue::from_str(&format!("Bearer {key}")).map_err(invalid)?;
  bearer.set_sensitive(true);
  base.insert(header::AUTHORIZATION, bearer);

  return Ok(base);
}

const REST_API: &str = "rest/v1";
