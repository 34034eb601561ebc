//! BatchOwner - the single task that owns the batch buffer
//!
//! Producers and flush callers never touch the buffer. They send messages and
//! the owner handles them one at a time:
//!
//! ```text
//! update()     ──submit──┐
//! update()     ──submit──┤
//! send_batch() ──flush───┼──▶ BatchOwner ──▶ Issuer ──▶ POST /_bulk
//! quit()       ──cancel──┘        │
//!                              BatchBuffer
//! ```
//!
//! Selection is biased: terminate first, then flush, then submit. A flush
//! racing with `quit` may therefore never run.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::{
  handle::BulkHandle,
  message::{FlushReply, FlushRequest, Submission},
};
use crate::{
  batch::BatchBuffer,
  domain::config::{BulkConfig, IssueMode},
  transport::Issuer,
};

/// Counters reported when the owner loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnerStats {
  /// Instructions rendered into a batch
  pub accepted: usize,
  /// Instructions dropped because they failed to render
  pub rejected: usize,
  /// Flush requests handled
  pub flushes: usize,
  /// Instructions still buffered when the loop ended
  pub discarded: usize,
}

/// The batch owner actor.
///
/// # Lifecycle
///
/// Runs until one of:
/// - [`BulkHandle::quit`] cancels its token
/// - every handle has been dropped
pub struct BatchOwner {
  buffer: BatchBuffer,
  issuer: Arc<Issuer>,
  mode: IssueMode,
  submit_rx: mpsc::Receiver<Submission>,
  flush_rx: mpsc::Receiver<FlushRequest>,
  cancel: CancellationToken,
  stats: OwnerStats,
}

impl BatchOwner {
  /// Create an owner and the handle that drives it.
  ///
  /// The owner is not started until `run()` is called.
  pub fn new(issuer: Arc<Issuer>, config: &BulkConfig) -> (Self, BulkHandle) {
    // tokio channels need at least one slot
    let (submit_tx, submit_rx) = mpsc::channel(config.submit_capacity.max(1));
    let (flush_tx, flush_rx) = mpsc::channel(config.flush_capacity.max(1));
    let cancel = CancellationToken::new();

    let owner = Self {
      buffer: BatchBuffer::new(),
      issuer,
      mode: config.issue_mode,
      submit_rx,
      flush_rx,
      cancel: cancel.clone(),
      stats: OwnerStats::default(),
    };
    (owner, BulkHandle::new(submit_tx, flush_tx, cancel))
  }

  /// Spawn the owner on the current runtime and return its handle
  pub fn spawn(issuer: Arc<Issuer>, config: &BulkConfig) -> BulkHandle {
    let (owner, handle) = Self::new(issuer, config);
    tokio::spawn(owner.run());
    handle
  }

  /// Main loop. Each event is handled to completion before the next one is
  /// considered.
  pub async fn run(mut self) -> OwnerStats {
    info!(url = %self.issuer.url(), mode = ?self.mode, "BatchOwner started");

    loop {
      tokio::select! {
          biased;

          _ = self.cancel.cancelled() => {
              info!("BatchOwner shutting down (quit)");
              break;
          }

          request = self.flush_rx.recv() => {
              match request {
                  Some(request) => self.handle_flush(request).await,
                  None => {
                      info!("BatchOwner shutting down (handles dropped)");
                      break;
                  }
              }
          }

          submission = self.submit_rx.recv() => {
              match submission {
                  Some(submission) => self.handle_submission(submission),
                  None => {
                      info!("BatchOwner shutting down (handles dropped)");
                      break;
                  }
              }
          }
      }
    }

    self.stats.discarded = self.buffer.ops();
    if self.stats.discarded > 0 {
      warn!(
        discarded = self.stats.discarded,
        bytes = self.buffer.len(),
        "Discarding unflushed instructions"
      );
    }

    info!(
      accepted = self.stats.accepted,
      rejected = self.stats.rejected,
      flushes = self.stats.flushes,
      "BatchOwner stopped"
    );
    self.stats
  }

  // ========================================================================
  // Handlers
  // ========================================================================

  fn handle_submission(&mut self, submission: Submission) {
    let Submission { instruction, ack } = submission;

    let result = self.buffer.append(instruction.as_ref());
    match &result {
      Ok(()) => {
        self.stats.accepted += 1;
        trace!(
          id = instruction.id(),
          action = %instruction.action(),
          ops = self.buffer.ops(),
          "Instruction accepted"
        );
      }
      Err(e) => {
        self.stats.rejected += 1;
        warn!(id = instruction.id(), action = %instruction.action(), error = %e, "Instruction dropped");
      }
    }

    // Submitter gave up waiting; an accepted instruction stays in the batch
    let _ = ack.send(result);
  }

  async fn handle_flush(&mut self, request: FlushRequest) {
    let batch = self.buffer.take();
    self.stats.flushes += 1;
    debug!(ops = batch.ops(), bytes = batch.len(), "Swapped batch buffer");

    let reply = match self.mode {
      IssueMode::Inline => FlushReply::Issued(self.issuer.issue(batch).await),
      IssueMode::Detached => FlushReply::Detached {
        batch,
        issuer: Arc::clone(&self.issuer),
      },
    };

    if request.reply.send(reply).is_err() {
      warn!("Flush requester went away before the outcome was delivered");
    }
  }
}
