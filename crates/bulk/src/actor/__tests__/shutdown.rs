//! Shutdown scenarios: quit discards, closed handles, dropped handles.

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use crate::{
    actor::__tests__::helpers::{RecordingTransport, new_owner, spawn_owner},
    domain::{config::IssueMode, instruction::DeleteInstruction},
    error::BulkError,
  };

  /// Quit without a prior flush: nothing is sent and the buffer is discarded.
  #[tokio::test]
  async fn test_quit_discards_unflushed_batch() {
    let transport = RecordingTransport::new();
    let (handle, owner) = spawn_owner(transport.clone(), IssueMode::Inline);

    for id in 0..3 {
      handle.update(DeleteInstruction::new(id.to_string(), "people")).await.unwrap();
    }
    handle.quit();

    let stats = owner.await.expect("owner task");
    assert_eq!(stats.accepted, 3);
    assert_eq!(stats.discarded, 3);
    assert_eq!(stats.flushes, 0);
    assert!(transport.requests().is_empty());
  }

  /// Calls after quit fail with Closed instead of panicking.
  #[tokio::test]
  async fn test_calls_after_quit_are_closed() {
    let transport = RecordingTransport::new();
    let (handle, owner) = spawn_owner(transport.clone(), IssueMode::Inline);

    handle.quit();
    assert!(handle.is_closed());
    owner.await.unwrap();

    let err = handle
      .update(DeleteInstruction::new("late", "people"))
      .await
      .expect_err("update after quit");
    assert!(matches!(err, BulkError::Closed));

    let err = handle.send_batch().await.expect_err("flush after quit");
    assert!(matches!(err, BulkError::Closed));
    assert!(transport.requests().is_empty());
  }

  /// An update racing with quit either lands before it or reports Closed.
  #[tokio::test]
  async fn test_update_racing_quit_never_hangs() {
    let transport = RecordingTransport::new();
    let (handle, owner) = spawn_owner(transport.clone(), IssueMode::Inline);

    let racer = {
      let handle = handle.clone();
      tokio::spawn(async move { handle.update(DeleteInstruction::new("racer", "people")).await })
    };
    handle.quit();

    let outcome = tokio::time::timeout(Duration::from_secs(2), racer)
      .await
      .expect("update resolves after quit")
      .unwrap();
    assert!(matches!(outcome, Ok(()) | Err(BulkError::Closed)));

    owner.await.unwrap();
    assert!(transport.requests().is_empty());
  }

  /// Terminate wins over a flush and a submission already waiting in the channels.
  #[tokio::test]
  async fn test_quit_wins_over_queued_flush() {
    let transport = RecordingTransport::new();
    let (owner, handle) = new_owner(transport.clone(), IssueMode::Inline);

    let submitter = {
      let handle = handle.clone();
      tokio::spawn(async move { handle.update(DeleteInstruction::new("1", "people")).await })
    };
    let flusher = {
      let handle = handle.clone();
      tokio::spawn(async move { handle.send_batch().await })
    };
    // Let both calls reach their channels before the owner starts
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.quit();

    let stats = owner.run().await;

    let submitted = submitter.await.unwrap();
    let flushed = flusher.await.unwrap();
    assert!(matches!(submitted, Err(BulkError::Closed)), "update got {submitted:?}");
    assert!(matches!(flushed, Err(BulkError::Closed)), "flush got {flushed:?}");
    assert_eq!(stats.flushes, 0);
    assert_eq!(stats.accepted, 0);
    assert!(transport.requests().is_empty());
  }

  /// Dropping every handle ends the owner loop.
  #[tokio::test]
  async fn test_dropping_handles_stops_owner() {
    let transport = RecordingTransport::new();
    let (handle, owner) = spawn_owner(transport, IssueMode::Detached);

    let other = handle.clone();
    other.update(DeleteInstruction::new("1", "people")).await.unwrap();
    drop(other);
    drop(handle);

    let stats = tokio::time::timeout(Duration::from_secs(2), owner)
      .await
      .expect("owner stops once handles are gone")
      .unwrap();
    assert_eq!(stats.discarded, 1);
  }
}
