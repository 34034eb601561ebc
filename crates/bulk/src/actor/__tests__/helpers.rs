//! Test helpers for batch owner scenario tests.
//!
//! Provides a `RecordingTransport` that keeps every request it receives and
//! answers with a configurable status, body and delay.

use std::{
  sync::{Arc, Mutex},
  time::Duration,
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::{sync::Notify, task::JoinHandle};

use crate::{
  actor::{BatchOwner, BulkHandle, OwnerStats},
  domain::config::{BulkConfig, IssueMode},
  transport::{BulkRequest, BulkTransport, Issuer, TransportError, TransportResponse},
};

pub const TEST_URL: &str = "http://search.test:9200/_bulk";

#[derive(Clone)]
enum Reply {
  Respond(TransportResponse),
  Fail(String),
}

pub struct RecordingTransport {
  requests: Mutex<Vec<BulkRequest>>,
  reply: Mutex<Reply>,
  delay: Mutex<Option<Duration>>,
  /// Notified as each request starts executing
  pub started: Notify,
}

impl RecordingTransport {
  pub fn new() -> Arc<Self> {
    Arc::new(Self {
      requests: Mutex::new(Vec::new()),
      reply: Mutex::new(Reply::Respond(TransportResponse::new(200, "OK"))),
      delay: Mutex::new(None),
      started: Notify::new(),
    })
  }

  pub fn respond_with(&self, status: u16, reason: &str, body: &str) {
    *self.reply.lock().unwrap() = Reply::Respond(TransportResponse::new(status, reason).with_body(body));
  }

  pub fn fail_with(&self, message: &str) {
    *self.reply.lock().unwrap() = Reply::Fail(message.to_string());
  }

  pub fn set_delay(&self, delay: Duration) {
    *self.delay.lock().unwrap() = Some(delay);
  }

  pub fn requests(&self) -> Vec<BulkRequest> {
    self.requests.lock().unwrap().clone()
  }

  /// Body of the n-th request as text
  pub fn body(&self, n: usize) -> String {
    String::from_utf8(self.requests()[n].body.clone()).expect("bulk body is utf8")
  }
}

#[async_trait]
impl BulkTransport for RecordingTransport {
  fn name(&self) -> &str {
    "recording"
  }

  async fn execute(&self, request: BulkRequest) -> Result<TransportResponse, TransportError> {
    self.requests.lock().unwrap().push(request);
    self.started.notify_one();

    let delay = *self.delay.lock().unwrap();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }

    let reply = self.reply.lock().unwrap().clone();
    match reply {
      Reply::Respond(response) => Ok(response),
      Reply::Fail(message) => Err(TransportError::Network(message)),
    }
  }
}

/// Build an owner over `transport` without starting it
pub fn new_owner(transport: Arc<RecordingTransport>, mode: IssueMode) -> (BatchOwner, BulkHandle) {
  let config = BulkConfig {
    issue_mode: mode,
    ..Default::default()
  };
  let issuer = Arc::new(Issuer::new(TEST_URL, transport));
  BatchOwner::new(issuer, &config)
}

/// Spawn an owner over `transport` and return its handle and join handle
pub fn spawn_owner(transport: Arc<RecordingTransport>, mode: IssueMode) -> (BulkHandle, JoinHandle<OwnerStats>) {
  let (owner, handle) = new_owner(transport, mode);
  (handle, tokio::spawn(owner.run()))
}

/// Parse a bulk body into its JSON lines
pub fn json_lines(body: &str) -> Vec<Value> {
  body
    .lines()
    .map(|line| serde_json::from_str(line).expect("every bulk line is valid JSON"))
    .collect()
}

/// Ids of the metadata lines in a bulk body, in order
pub fn action_ids(body: &str) -> Vec<String> {
  json_lines(body)
    .into_iter()
    .filter_map(|line| {
      ["index", "delete"]
        .iter()
        .find_map(|action| line.get(*action).and_then(|meta| meta["_id"].as_str()).map(String::from))
    })
    .collect()
}
