//! Single-owner batching
//!
//! The batch buffer is owned by one task, the [`BatchOwner`]. Producers and
//! flush callers hold a [`BulkHandle`] and communicate with the owner via
//! message passing only:
//!
//! - submissions arrive on a bounded `mpsc` channel and are acknowledged once
//!   rendered
//! - flush requests arrive on a second bounded channel and are answered with
//!   the outcome of the bulk request
//! - termination is a `CancellationToken`
//!
//! Channel capacities come from [`BulkConfig`](crate::config::BulkConfig).
//! A full channel makes submitters wait; nothing is dropped.

pub mod handle;
pub mod message;
mod owner;


pub use handle::BulkHandle;
pub use owner::{BatchOwner, OwnerStats};
