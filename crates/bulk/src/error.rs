use crate::{
  domain::instruction::RenderError,
  transport::{TransportError, response::ItemFailure},
};

/// Errors surfaced to submitters and flush callers
#[derive(Debug, thiserror::Error)]
pub enum BulkError {
  #[error("Bulk writer has shut down")]
  Closed,
  #[error("Render failed: {0}")]
  Render(#[from] RenderError),
  #[error("Transport failed: {0}")]
  Transport(#[from] TransportError),
  #[error("HTTP error: {status} {reason}")]
  Status { status: u16, reason: String },
  #[error("{} of {total} bulk items failed", .failed.len())]
  ItemFailures { failed: Vec<ItemFailure>, total: usize },
}

impl BulkError {
  /// True when the batch reached the service but was refused in whole or in part
  pub fn is_rejection(&self) -> bool {
    matches!(self, Self::Status { .. } | Self::ItemFailures { .. })
  }
}
