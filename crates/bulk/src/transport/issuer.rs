//! Transport issuer - turns one flushed batch into one bulk request.

use std::{sync::Arc, time::Instant};

use tracing::{debug, trace, warn};

use super::{BulkRequest, BulkTransport, response::BulkResponse};
use crate::{batch::Batch, error::BulkError};

/// Statuses accepted as success. Anything else, including other 2xx codes,
/// is reported as an error.
pub fn is_accepted(status: u16) -> bool {
  matches!(status, 200 | 201)
}

/// Outcome of a successful flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkSummary {
  /// Instructions in the flushed batch
  pub ops: usize,
  /// Body size in bytes
  pub bytes: usize,
  pub status: u16,
  /// Server-reported processing time, when the body carried one
  pub took_ms: Option<u64>,
}

/// Issues flushed batches against the bulk endpoint. One call, one outcome;
/// nothing is retried.
pub struct Issuer {
  url: String,
  transport: Arc<dyn BulkTransport>,
  check_items: bool,
}

impl std::fmt::Debug for Issuer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Issuer")
      .field("url", &self.url)
      .field("transport", &self.transport.name())
      .field("check_items", &self.check_items)
      .finish()
  }
}

impl Issuer {
  pub fn new(url: impl Into<String>, transport: Arc<dyn BulkTransport>) -> Self {
    Self {
      url: url.into(),
      transport,
      check_items: true,
    }
  }

  pub fn with_item_checks(mut self, check_items: bool) -> Self {
    self.check_items = check_items;
    self
  }

  pub fn url(&self) -> &str {
    &self.url
  }

  /// Issue `batch`. Empty batches are still sent.
  #[tracing::instrument(level = "debug", skip(self, batch), fields(ops = batch.ops(), bytes = batch.len()))]
  pub async fn issue(&self, batch: Batch) -> Result<BulkSummary, BulkError> {
    let ops = batch.ops();
    let bytes = batch.len();
    let request = BulkRequest::new(self.url.clone(), batch);

    let start = Instant::now();
    let response = match self.transport.execute(request).await {
      Ok(response) => response,
      Err(e) => {
        warn!(error = %e, ops, "Bulk request failed, batch dropped");
        return Err(e.into());
      }
    };

    trace!(
      status = response.status,
      elapsed_ms = start.elapsed().as_millis(),
      "Bulk request completed"
    );

    if !is_accepted(response.status) {
      warn!(status = response.status, reason = %response.reason, ops, "Bulk request rejected");
      return Err(BulkError::Status {
        status: response.status,
        reason: response.reason,
      });
    }

    let mut summary = BulkSummary {
      ops,
      bytes,
      status: response.status,
      took_ms: None,
    };

    if !self.check_items {
      return Ok(summary);
    }

    match BulkResponse::parse(&response.body) {
      Ok(parsed) => {
        summary.took_ms = Some(parsed.took);
        if parsed.errors {
          let failed = parsed.failures();
          if !failed.is_empty() {
            warn!(failed = failed.len(), total = parsed.items.len(), "Bulk items failed");
            return Err(BulkError::ItemFailures {
              failed,
              total: parsed.items.len(),
            });
          }
          warn!("Bulk response flagged errors but no failed item was found");
        }
      }
      Err(e) => debug!(error = %e, "Bulk response body not parsed, skipping item checks"),
    }

    debug!(ops, bytes, status = summary.status, "Batch issued");
    Ok(summary)
  }
}
