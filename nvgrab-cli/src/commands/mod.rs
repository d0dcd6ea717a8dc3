//! CLI command implementations

mod config;
mod info;
mod record;

pub use config::config;
pub use info::info;
pub use record::{record, RecordArgs};
