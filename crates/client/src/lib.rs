//! A client library to call RPC functions of a Supabase/PostgREST backend via HTTP.
//!
//! The main entry point is [RpcFetcher], which invokes a named remote procedure and narrows its
//! result set down to the first row.

#![forbid(unsafe_code, clippy::unwrap_used)]
#![allow(clippy::needless_return)]
#![warn(clippy::await_holding_lock, clippy::inefficient_to_string)]

mod config;
mod transport;

use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;
use tracing::*;

pub use config::{Config, KEY_ENV, URL_ENV};
pub use transport::{ErrorDescriptor, HttpTransport, RpcResponse, RpcTransport};

/// One opaque result row.
pub type Record = serde_json::Value;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
  #[error("RemoteCall: {0}")]
  RemoteCall(ErrorDescriptor),

  #[error(
    "No data returned from the '{procedure}' function. Make sure the function exists and the table has data."
  )]
  EmptyResult { procedure: String },

  #[error("RecordDeserialization: {0}")]
  RecordDeserialization(serde_json::Error),

  #[error("InvalidUrl: {0}")]
  InvalidUrl(url::ParseError),

  #[error("InvalidKey: {0}")]
  InvalidKey(String),

  #[error("MissingConfig: {0} not set")]
  MissingConfig(&'static str),

  // NOTE: Only surfaces when building the HTTP client, call failures end up in RemoteCall.
  #[error("Reqwest: {0}")]
  OtherReqwest(reqwest::Error),
}

/// Calls remote procedures and returns the first row of their result.
///
/// Cheap to clone. All clones share the same transport, which is read-only after construction.
#[derive(Clone)]
pub struct RpcFetcher {
  transport: Arc<dyn RpcTransport>,
}

impl RpcFetcher {
  pub fn new(transport: impl RpcTransport + 'static) -> Self {
    return Self {
      transport: Arc::new(transport),
    };
  }

  /// Connects to the service described by `config` over HTTP.
  pub fn connect(config: &Config) -> Result<Self, Error> {
    return Ok(Self::new(HttpTransport::new(config)?));
  }

  /// Like [RpcFetcher::connect] with the configuration read from the environment.
  pub fn from_env() -> Result<Self, Error> {
    return Self::connect(&Config::from_env()?);
  }

  /// Calls `procedure` without arguments and returns the first row it yields.
  pub async fn fetch_random_item(&self, procedure: &str) -> Result<Record, Error> {
    return self
      .fetch_first_with_args(procedure, &serde_json::Value::Object(Default::default()))
      .await;
  }

  /// Calls `procedure` with named arguments, e.g. `json!({"category": "history"})`.
  pub async fn fetch_first_with_args(
    &self,
    procedure: &str,
    args: &serde_json::Value,
  ) -> Result<Record, Error> {
    let response = self.transport.call(procedure, args).await;
    return first_row(procedure, response);
  }

  pub async fn fetch_random_item_as<T: DeserializeOwned>(
    &self,
    procedure: &str,
  ) -> Result<T, Error> {
    let record = self.fetch_random_item(procedure).await?;
    return serde_json::from_value(record).map_err(Error::RecordDeserialization);
  }
}

fn first_row(procedure: &str, response: RpcResponse) -> Result<Record, Error> {
  let RpcResponse { data, error } = response;

  if let Some(err) = error {
    // A response carrying both is malformed, the error takes precedence.
    let discarded_rows = data.as_ref().map_or(0, Vec::len);
    error!(
      procedure,
      error = ?err,
      discarded_rows,
      "Error calling RPC function '{procedure}': {err}"
    );
    return Err(Error::RemoteCall(err));
  }

  let Some(first) = data.and_then(|rows| rows.into_iter().next()) else {
    return Err(Error::EmptyResult {
      procedure: procedure.to_string(),
    });
  };

  debug!(procedure, "RPC function returned a row");
  return Ok(first);
}
