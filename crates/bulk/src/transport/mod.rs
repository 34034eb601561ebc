//! Transport seam for bulk requests.
//!
//! The [`Issuer`] builds one [`BulkRequest`] per flushed batch and runs it
//! through a [`BulkTransport`]. [`HttpTransport`] is the reqwest-backed
//! implementation; tests plug in recording stubs.

mod http;
pub mod issuer;
pub mod response;

pub use http::HttpTransport;
pub use issuer::{BulkSummary, Issuer};

use crate::batch::Batch;

/// Media type of the newline-delimited JSON bulk body
pub const BULK_CONTENT_TYPE: &str = "application/json";

/// One outbound POST to the bulk endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRequest {
  pub url: String,
  pub content_type: &'static str,
  pub body: Vec<u8>,
}

impl BulkRequest {
  pub fn new(url: impl Into<String>, batch: Batch) -> Self {
    Self {
      url: url.into(),
      content_type: BULK_CONTENT_TYPE,
      body: batch.into_bytes(),
    }
  }

  pub fn content_length(&self) -> usize {
    self.body.len()
  }
}

/// What came back from the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
  pub status: u16,
  /// Canonical reason phrase for `status`, empty when unknown
  pub reason: String,
  pub body: Vec<u8>,
}

impl TransportResponse {
  pub fn new(status: u16, reason: impl Into<String>) -> Self {
    Self {
      status,
      reason: reason.into(),
      body: Vec::new(),
    }
  }

  pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
    self.body = body.into();
    self
  }
}

/// HTTP execution primitive: one request in, one response or error out.
#[async_trait::async_trait]
pub trait BulkTransport: Send + Sync {
  fn name(&self) -> &str;

  async fn execute(&self, request: BulkRequest) -> Result<TransportResponse, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
  #[error("Request failed: {0}")]
  Request(#[from] reqwest::Error),
  #[error("Network error: {0}")]
  Network(String),
  #[error("Request timed out")]
  Timeout,
}
