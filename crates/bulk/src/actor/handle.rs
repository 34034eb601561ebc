//! Public handle to the batch owner
//!
//! The handle is cheap to clone and holds only channel endpoints; the batch
//! buffer itself never leaves the owner task.

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use super::message::{FlushReply, FlushRequest, Submission};
use crate::{domain::instruction::Instruction, error::BulkError, transport::BulkSummary};

/// Handle producers and flush callers use to talk to a batch owner.
///
/// Any number of tasks may call [`update`](Self::update) concurrently.
/// Concurrent [`send_batch`](Self::send_batch) calls are serialized by the
/// owner loop.
///
/// After [`quit`](Self::quit) every call returns [`BulkError::Closed`]. Calls
/// racing with `quit` may land either side of it; callers that need their
/// instructions delivered must stop submitting and flush before quitting.
#[derive(Clone, Debug)]
pub struct BulkHandle {
  submit_tx: mpsc::Sender<Submission>,
  flush_tx: mpsc::Sender<FlushRequest>,
  cancel: CancellationToken,
}

impl BulkHandle {
  pub fn new(
    submit_tx: mpsc::Sender<Submission>,
    flush_tx: mpsc::Sender<FlushRequest>,
    cancel: CancellationToken,
  ) -> Self {
    Self {
      submit_tx,
      flush_tx,
      cancel,
    }
  }

  /// Add one instruction to the current batch.
  ///
  /// Returns once the owner has rendered it into the batch. A render failure
  /// comes back as [`BulkError::Render`] and the instruction is dropped; the
  /// rest of the batch is untouched.
  pub async fn update(&self, instruction: impl Instruction) -> Result<(), BulkError> {
    self.update_boxed(Box::new(instruction)).await
  }

  /// Same as [`update`](Self::update), for callers that already hold a `Box<dyn Instruction>`.
  pub async fn update_boxed(&self, instruction: Box<dyn Instruction>) -> Result<(), BulkError> {
    let (ack_tx, ack_rx) = oneshot::channel();
    let submission = Submission {
      instruction,
      ack: ack_tx,
    };
    self.submit_tx.send(submission).await.map_err(|_| BulkError::Closed)?;

    // Owner dropped the ack without answering: it terminated first
    ack_rx.await.map_err(|_| BulkError::Closed)?.map_err(BulkError::from)
  }

  /// Flush everything accepted so far as one bulk request.
  ///
  /// Waits for the buffer swap and then for the outcome of the request.
  /// Instructions accepted after the swap go into the next batch. A failed
  /// batch is not retried or requeued.
  pub async fn send_batch(&self) -> Result<BulkSummary, BulkError> {
    let (reply_tx, reply_rx) = oneshot::channel();
    self
      .flush_tx
      .send(FlushRequest { reply: reply_tx })
      .await
      .map_err(|_| BulkError::Closed)?;

    match reply_rx.await.map_err(|_| BulkError::Closed)? {
      FlushReply::Issued(outcome) => outcome,
      FlushReply::Detached { batch, issuer } => issuer.issue(batch).await,
    }
  }

  /// Stop the owner loop. Unflushed instructions are discarded.
  pub fn quit(&self) {
    self.cancel.cancel();
  }

  pub fn is_closed(&self) -> bool {
    self.cancel.is_cancelled() || self.submit_tx.is_closed()
  }
}
