//! Configuration for the bulk writer and CLI.
//!
//! Lookup order: explicit path > `ESBULK_CONFIG` > user config
//! (`$XDG_CONFIG_HOME/esbulk/config.toml` or the platform config dir) > defaults.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use serde::{Deserialize, Serialize};

// ============================================================================
// Bulk Configuration
// ============================================================================

/// Where the transport call runs when a batch is flushed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IssueMode {
  /// The owner loop issues the request itself. Submissions wait while the
  /// HTTP call is in flight and at most one flush is outstanding.
  #[default]
  Inline,
  /// The owner swaps buffers and hands the filled batch to the `send_batch`
  /// caller, which issues it on its own task.
  Detached,
}

/// Bulk writer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkConfig {
  /// Base URL of the service; the bulk endpoint is `{base_url}/_bulk`
  pub base_url: String,

  /// Submissions buffered ahead of the owner loop (default: 1).
  /// Submitters wait when the channel is full; nothing is dropped.
  pub submit_capacity: usize,

  /// Flush requests buffered ahead of the owner loop (default: 1)
  pub flush_capacity: usize,

  /// Inline or detached issue of flushed batches
  pub issue_mode: IssueMode,

  /// Inspect the per-item array of accepted bulk responses (default: true)
  pub check_items: bool,

  /// HTTP request timeout in seconds. No timeout when unset.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub request_timeout_secs: Option<u64>,
}

impl Default for BulkConfig {
  fn default() -> Self {
    Self {
      base_url: "http://localhost:9200".to_string(),
      submit_capacity: 1,
      flush_capacity: 1,
      issue_mode: IssueMode::Inline,
      check_items: true,
      request_timeout_secs: None,
    }
  }
}

impl BulkConfig {
  pub fn request_timeout(&self) -> Option<Duration> {
    self.request_timeout_secs.map(Duration::from_secs)
  }
}

// ============================================================================
// Logging Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  /// Default log level (error, warn, info, debug, trace). `RUST_LOG` wins.
  pub level: String,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
    }
  }
}

// ============================================================================
// Root Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  pub bulk: BulkConfig,
  pub log: LogConfig,
}

impl Config {
  /// Load configuration.
  ///
  /// An explicit path or `ESBULK_CONFIG` must exist and parse. The user config
  /// is optional; when absent the defaults are used.
  pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
    if let Some(path) = path {
      return Self::from_file(path);
    }

    if let Ok(path) = std::env::var("ESBULK_CONFIG") {
      return Self::from_file(Path::new(&path));
    }

    if let Some(user_config) = Self::user_config_path()
      && user_config.exists()
    {
      return Self::from_file(&user_config);
    }

    Ok(Self::default())
  }

  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Get the user-level config path
  pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
      return Some(PathBuf::from(path).join("esbulk").join("config.toml"));
    }

    dirs::config_dir().map(|p: PathBuf| p.join("esbulk").join("config.toml"))
  }

  pub fn to_toml(&self) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(self)?)
  }

  /// Generate a commented config file
  pub fn generate_template() -> String {
    let defaults = BulkConfig::default();
    format!(
      r#"# esbulk configuration
# Place in ~/.config/esbulk/config.toml or point ESBULK_CONFIG at it

[bulk]
# Service base URL; batches are POSTed to {{base_url}}/_bulk
base_url = "{base_url}"

# Submissions buffered ahead of the batch owner. Submitters wait when full.
submit_capacity = {submit_capacity}

# Flush requests buffered ahead of the batch owner
flush_capacity = {flush_capacity}

# inline   = the owner issues each flush itself (submissions wait during the HTTP call)
# detached = the caller of send_batch issues the flushed batch (submissions keep flowing)
issue_mode = "inline"

# Report per-item failures hidden inside 200/201 bulk responses
check_items = {check_items}

# HTTP request timeout in seconds (unset = no timeout)
# request_timeout_secs = 30

[log]
# error, warn, info, debug, trace (RUST_LOG overrides)
level = "info"
"#,
      base_url = defaults.base_url,
      submit_capacity = defaults.submit_capacity,
      flush_capacity = defaults.flush_capacity,
      check_items = defaults.check_items,
    )
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Failed to read config {}: {source}", .path.display())]
  Read { path: PathBuf, source: std::io::Error },
  #[error("Failed to parse config {}: {source}", .path.display())]
  Parse { path: PathBuf, source: toml::de::Error },
  #[error("Failed to serialize config: {0}")]
  Serialize(#[from] toml::ser::Error),
}
