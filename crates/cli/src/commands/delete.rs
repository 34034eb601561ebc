//! Delete command

use anyhow::{Context, Result, bail};
use esbulk::{Client, DeleteInstruction, config::Config};
use futures::future::join_all;
use tracing::{error, warn};

/// Delete `ids` from `index` in a single bulk request
pub async fn cmd_delete(
  config: &Config,
  index: &str,
  doc_type: Option<&str>,
  routing: Option<&str>,
  ids: Vec<String>,
) -> Result<()> {
  let client = Client::new(config.bulk.clone()).context("Failed to build HTTP client")?;
  let bulk = client.bulk();

  let submissions = ids.into_iter().map(|id| {
    let mut instruction = DeleteInstruction::new(id, index);
    if let Some(doc_type) = doc_type {
      instruction = instruction.with_type(doc_type);
    }
    if let Some(routing) = routing {
      instruction = instruction.with_routing(routing);
    }
    let bulk = bulk.clone();
    async move { bulk.update(instruction).await }
  });

  let mut rejected = 0;
  for result in join_all(submissions).await {
    if let Err(e) = result {
      warn!(error = %e, "Delete rejected");
      rejected += 1;
    }
  }

  let outcome = bulk.send_batch().await;
  bulk.quit();

  match outcome {
    Ok(summary) => {
      println!("Deleted {} document(s) from {} (HTTP {})", summary.ops, index, summary.status);
      if rejected > 0 {
        bail!("{rejected} delete(s) could not be rendered");
      }
      Ok(())
    }
    Err(e) => {
      error!(error = %e, "Bulk delete failed");
      Err(e.into())
    }
  }
}
