use std::sync::Arc;

use tracing::debug;

use crate::{
  actor::{BatchOwner, BulkHandle},
  domain::config::BulkConfig,
  transport::{BulkTransport, HttpTransport, Issuer, TransportError},
};

/// Entry point for talking to one search service.
///
/// Resolves endpoint URLs against the configured base URL and spawns bulk
/// writers that share a single transport.
#[derive(Clone)]
pub struct Client {
  config: BulkConfig,
  transport: Arc<dyn BulkTransport>,
}

impl std::fmt::Debug for Client {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Client")
      .field("base_url", &self.config.base_url)
      .field("transport", &self.transport.name())
      .finish()
  }
}

impl Client {
  /// Client over HTTP, using the timeout from `config`
  pub fn new(config: BulkConfig) -> Result<Self, TransportError> {
    let transport = HttpTransport::new(config.request_timeout())?;
    Ok(Self::with_transport(config, Arc::new(transport)))
  }

  pub fn with_transport(config: BulkConfig, transport: Arc<dyn BulkTransport>) -> Self {
    Self { config, transport }
  }

  pub fn base_url(&self) -> &str {
    &self.config.base_url
  }

  /// Resolve `path` against the base URL
  pub fn url(&self, path: &str) -> String {
    format!(
      "{}/{}",
      self.config.base_url.trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }

  /// Spawn a bulk writer targeting `{base_url}/_bulk`.
  ///
  /// Must be called from within a tokio runtime. Each call gets its own
  /// owner task and batch buffer.
  pub fn bulk(&self) -> BulkHandle {
    let url = self.url("_bulk");
    debug!(url = %url, "Spawning bulk writer");
    let issuer = Issuer::new(url, Arc::clone(&self.transport)).with_item_checks(self.config.check_items);
    BatchOwner::spawn(Arc::new(issuer), &self.config)
  }
}
