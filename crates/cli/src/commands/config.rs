//! Config commands

use anyhow::{Context, Result, bail};
use esbulk::config::Config;
use std::path::Path;
use tracing::info;

/// Print the effective configuration as TOML
pub fn cmd_config_show(config: &Config) -> Result<()> {
  match Config::user_config_path() {
    Some(path) if path.exists() => println!("# User config: {}", path.display()),
    Some(path) => println!("# User config: {} (not present)", path.display()),
    None => println!("# No user config directory"),
  }
  println!();
  print!("{}", config.to_toml()?);
  Ok(())
}

/// Print the config template, or write it to `output`
pub fn cmd_config_init(output: Option<&Path>, force: bool) -> Result<()> {
  let template = Config::generate_template();

  let Some(path) = output else {
    print!("{template}");
    return Ok(());
  };

  if path.exists() && !force {
    bail!("Config file already exists: {} (use --force to overwrite)", path.display());
  }
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }
  std::fs::write(path, &template).with_context(|| format!("Failed to write {}", path.display()))?;

  info!(path = %path.display(), "Wrote config template");
  println!("Created config: {}", path.display());
  Ok(())
}
