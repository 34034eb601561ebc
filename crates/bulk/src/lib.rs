//! Serialized bulk writer for Elasticsearch-style `_bulk` endpoints.
//!
//! Producers submit index/delete instructions through a [`BulkHandle`]; a
//! single [`BatchOwner`] task renders them into one batch buffer and, on
//! [`BulkHandle::send_batch`], swaps in a fresh buffer and issues the filled
//! one as a single request.

mod actor;
mod batch;
mod client;
mod domain;
mod error;
mod transport;

pub use actor::{BatchOwner, BulkHandle, OwnerStats};
pub use batch::{Batch, BatchBuffer};
pub use client::Client;
pub use domain::{
  config,
  instruction::{Action, DeleteInstruction, Instruction, Metadata, RenderError, UpdateInstruction},
};
pub use error::BulkError;
pub use transport::{
  BULK_CONTENT_TYPE, BulkRequest, BulkSummary, BulkTransport, HttpTransport, Issuer, TransportError,
  TransportResponse,
  response::{BulkResponse, ItemFailure},
};
