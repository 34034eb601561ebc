//! CLI command implementations

mod config;
mod delete;
mod index;

pub use config::{cmd_config_init, cmd_config_show};
pub use delete::cmd_delete;
pub use index::{IndexOptions, cmd_index};
