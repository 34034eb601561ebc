use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tracing::{info, trace};

use super::{BulkRequest, BulkTransport, TransportError, TransportResponse};

/// reqwest-backed transport. The client is reused across requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
  client: reqwest::Client,
}

impl HttpTransport {
  pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
      builder = builder.timeout(timeout);
    }
    let client = builder.build()?;

    info!(timeout_secs = timeout.map(|t| t.as_secs()), "HTTP transport initialized");
    Ok(Self { client })
  }
}

fn classify(error: reqwest::Error) -> TransportError {
  if error.is_timeout() {
    TransportError::Timeout
  } else if error.is_connect() {
    TransportError::Network(error.to_string())
  } else {
    TransportError::Request(error)
  }
}

#[async_trait]
impl BulkTransport for HttpTransport {
  fn name(&self) -> &str {
    "http"
  }

  #[tracing::instrument(level = "trace", skip(self, request), fields(url = %request.url, bytes = request.body.len()))]
  async fn execute(&self, request: BulkRequest) -> Result<TransportResponse, TransportError> {
    let start = Instant::now();
    let length = request.content_length();

    let response = self
      .client
      .post(&request.url)
      .header(CONTENT_TYPE, request.content_type)
      .header(CONTENT_LENGTH, length)
      .body(request.body)
      .send()
      .await
      .map_err(classify)?;

    let status = response.status();
    let body = response.bytes().await.map_err(classify)?;

    trace!(
      status = %status,
      elapsed_ms = start.elapsed().as_millis(),
      response_bytes = body.len(),
      "Received bulk response"
    );

    Ok(TransportResponse {
      status: status.as_u16(),
      reason: status.canonical_reason().unwrap_or_default().to_string(),
      body: body.to_vec(),
    })
  }
}
