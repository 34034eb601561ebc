//! Index command: stream NDJSON documents into bulk requests

use anyhow::{Context, Result, anyhow, bail};
use esbulk::{BulkError, BulkHandle, Client, UpdateInstruction, config::Config};
use futures::{StreamExt, stream};
use serde_json::{Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

/// How documents are turned into index instructions
#[derive(Debug, Clone)]
pub struct IndexOptions {
  pub index: String,
  pub doc_type: Option<String>,
  pub id_field: String,
  pub routing_field: Option<String>,
  pub batch_size: usize,
  pub producers: usize,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct LoadReport {
  submitted: usize,
  skipped: usize,
  rejected: usize,
  batches: usize,
  failed_batches: usize,
  failed_ops: usize,
}

/// Index every document in `source` (a path, or `-` for stdin)
pub async fn cmd_index(config: &Config, source: &str, options: IndexOptions) -> Result<()> {
  let reader: Box<dyn AsyncBufRead + Unpin + Send> = if source == "-" {
    Box::new(BufReader::new(tokio::io::stdin()))
  } else {
    let file = tokio::fs::File::open(source)
      .await
      .with_context(|| format!("Failed to open {source}"))?;
    Box::new(BufReader::new(file))
  };

  let client = Client::new(config.bulk.clone()).context("Failed to build HTTP client")?;
  let bulk = client.bulk();

  let report = load(&bulk, reader, &options).await;
  bulk.quit();
  let report = report?;

  println!(
    "Indexed {} document(s) into {} in {} batch(es)",
    report.submitted - report.failed_ops,
    options.index,
    report.batches
  );
  if report.skipped > 0 || report.rejected > 0 {
    println!("Skipped {} unreadable and {} rejected document(s)", report.skipped, report.rejected);
  }
  if report.failed_batches > 0 {
    bail!(
      "{} of {} batch(es) failed ({} document(s))",
      report.failed_batches,
      report.batches + report.failed_batches,
      report.failed_ops
    );
  }
  Ok(())
}

async fn load<R>(bulk: &BulkHandle, reader: R, options: &IndexOptions) -> Result<LoadReport>
where
  R: AsyncBufRead + Unpin,
{
  let batch_size = options.batch_size.max(1);
  let mut report = LoadReport::default();
  let mut pending = Vec::with_capacity(batch_size);
  let mut lines = reader.lines();
  let mut line_no = 0usize;

  while let Some(line) = lines.next_line().await.context("Failed to read input")? {
    line_no += 1;
    if line.trim().is_empty() {
      continue;
    }

    match document_to_instruction(&line, options) {
      Ok(instruction) => pending.push(instruction),
      Err(e) => {
        warn!(line = line_no, error = %e, "Skipping document");
        report.skipped += 1;
      }
    }

    if pending.len() >= batch_size {
      flush_chunk(bulk, &mut pending, options.producers, &mut report).await?;
    }
  }

  if !pending.is_empty() {
    flush_chunk(bulk, &mut pending, options.producers, &mut report).await?;
  }

  Ok(report)
}

/// Submit `pending` from up to `producers` concurrent submitters, then flush
async fn flush_chunk(
  bulk: &BulkHandle,
  pending: &mut Vec<UpdateInstruction>,
  producers: usize,
  report: &mut LoadReport,
) -> Result<()> {
  let results: Vec<_> = stream::iter(pending.drain(..))
    .map(|instruction| {
      let bulk = bulk.clone();
      async move { bulk.update(instruction).await }
    })
    .buffer_unordered(producers.max(1))
    .collect()
    .await;

  let mut accepted = 0;
  for result in results {
    match result {
      Ok(()) => accepted += 1,
      Err(e) if bulk.is_closed() => return Err(anyhow!(e).context("Bulk writer stopped")),
      Err(e) => {
        warn!(error = %e, "Document rejected");
        report.rejected += 1;
      }
    }
  }
  report.submitted += accepted;

  match bulk.send_batch().await {
    Ok(summary) => {
      report.batches += 1;
      debug!(ops = summary.ops, bytes = summary.bytes, took_ms = ?summary.took_ms, "Batch sent");
    }
    Err(e) => {
      let failed = match &e {
        BulkError::ItemFailures { failed, .. } => failed.len(),
        _ => accepted,
      };
      error!(ops = accepted, failed, error = %e, "Batch failed");
      report.failed_batches += 1;
      report.failed_ops += failed;
    }
  }
  info!(submitted = report.submitted, batches = report.batches, "Progress");
  Ok(())
}

/// Build an index instruction from one NDJSON line
fn document_to_instruction(line: &str, options: &IndexOptions) -> Result<UpdateInstruction> {
  let document: Value = serde_json::from_str(line).context("invalid JSON")?;
  let Value::Object(body) = document else {
    bail!("document is not a JSON object");
  };

  let id = field_as_string(&body, &options.id_field)
    .with_context(|| format!("missing or non-scalar id field '{}'", options.id_field))?;
  let routing = match &options.routing_field {
    Some(field) => Some(
      field_as_string(&body, field).with_context(|| format!("missing or non-scalar routing field '{field}'"))?,
    ),
    None => None,
  };

  let mut instruction = UpdateInstruction::new(id, options.index.as_str(), body);
  if let Some(doc_type) = &options.doc_type {
    instruction = instruction.with_type(doc_type.as_str());
  }
  if let Some(routing) = routing {
    instruction = instruction.with_routing(routing);
  }
  Ok(instruction)
}

fn field_as_string(body: &Map<String, Value>, field: &str) -> Option<String> {
  match body.get(field)? {
    Value::String(s) if !s.is_empty() => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}
