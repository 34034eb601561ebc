//! esbulk - Stream documents into a search service through the `_bulk` API

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

use commands::{IndexOptions, cmd_config_init, cmd_config_show, cmd_delete, cmd_index};
use esbulk::config::Config;
use logging::init_cli_logging;

#[derive(Parser)]
#[command(name = "esbulk")]
#[command(about = "Serialized bulk writer for Elasticsearch-style _bulk endpoints")]
#[command(after_help = "\
QUICK START:
  esbulk config init              # Print a commented config template
  esbulk index docs.ndjson -i people
  cat docs.ndjson | esbulk index - -i people --id-field uid
  esbulk delete -i people 1 2 3

CONFIG LOCATIONS:
  $ESBULK_CONFIG
  ~/.config/esbulk/config.toml")]
struct Cli {
  /// Config file (default: $ESBULK_CONFIG, then the user config)
  #[arg(long, global = true, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the search service, overrides `bulk.base_url`
  #[arg(long, global = true, value_name = "URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

/// Subcommands for `esbulk config`
#[derive(Subcommand)]
pub enum ConfigCommand {
  /// Show the effective configuration
  Show,
  /// Print or write a commented config template
  Init {
    /// Write the template here instead of stdout
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
  },
}

#[derive(Subcommand)]
enum Commands {
  /// Index newline-delimited JSON documents
  Index {
    /// NDJSON file, or `-` for stdin
    source: String,
    /// Target index
    #[arg(short, long)]
    index: String,
    /// Document type written as `_type`
    #[arg(short = 't', long = "type")]
    doc_type: Option<String>,
    /// Document field holding the id
    #[arg(long, default_value = "id")]
    id_field: String,
    /// Document field holding the routing key
    #[arg(long)]
    routing_field: Option<String>,
    /// Documents per bulk request
    #[arg(short, long, default_value = "500")]
    batch_size: usize,
    /// Concurrent submitters
    #[arg(short, long, default_value = "4")]
    producers: usize,
  },
  /// Delete documents by id
  Delete {
    /// Target index
    #[arg(short, long)]
    index: String,
    /// Document type written as `_type`
    #[arg(short = 't', long = "type")]
    doc_type: Option<String>,
    /// Routing key for every delete
    #[arg(long)]
    routing: Option<String>,
    /// Ids to delete
    #[arg(required = true)]
    ids: Vec<String>,
  },
  /// Manage configuration
  Config {
    #[command(subcommand)]
    command: ConfigCommand,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  let mut config = Config::load(cli.config.as_deref())?;
  if let Some(url) = cli.url {
    config.bulk.base_url = url;
  }

  init_cli_logging(&config.log.level);

  match cli.command {
    Commands::Index {
      source,
      index,
      doc_type,
      id_field,
      routing_field,
      batch_size,
      producers,
    } => {
      let options = IndexOptions {
        index,
        doc_type,
        id_field,
        routing_field,
        batch_size,
        producers,
      };
      cmd_index(&config, &source, options).await
    }
    Commands::Delete {
      index,
      doc_type,
      routing,
      ids,
    } => cmd_delete(&config, &index, doc_type.as_deref(), routing.as_deref(), ids).await,
    Commands::Config { command } => match command {
      ConfigCommand::Show => cmd_config_show(&config),
      ConfigCommand::Init { output, force } => cmd_config_init(output.as_deref(), force),
    },
  }
}
