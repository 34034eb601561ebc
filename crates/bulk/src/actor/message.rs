//! Messages exchanged between [`BulkHandle`](super::BulkHandle) and the batch owner.
//!
//! Every request carries a `oneshot` reply channel: each submission and each
//! flush has exactly one outcome.

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::{
  batch::Batch,
  domain::instruction::{Instruction, RenderError},
  error::BulkError,
  transport::{BulkSummary, Issuer},
};

/// An instruction handed to the owner, acknowledged once rendered
#[derive(Debug)]
pub struct Submission {
  pub instruction: Box<dyn Instruction>,
  /// Receives the render outcome. A rejected instruction is not in the batch.
  pub ack: oneshot::Sender<Result<(), RenderError>>,
}

/// Ask the owner to swap out the current batch
#[derive(Debug)]
pub struct FlushRequest {
  pub reply: oneshot::Sender<FlushReply>,
}

/// What the owner hands back for a flush request
#[derive(Debug)]
pub enum FlushReply {
  /// The owner issued the batch itself (inline mode)
  Issued(Result<BulkSummary, BulkError>),
  /// The owner swapped buffers; the requester issues the batch (detached mode)
  Detached { batch: Batch, issuer: Arc<Issuer> },
}
