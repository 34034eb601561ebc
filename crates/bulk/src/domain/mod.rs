//! Domain types: bulk instructions and configuration.

pub mod config;
pub mod instruction;
