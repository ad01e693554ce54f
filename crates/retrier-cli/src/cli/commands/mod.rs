//! CLI command handlers, one per file.

mod config;
mod curve;
mod exec;

pub use config::run_config;
pub use curve::run_curve;
pub use exec::{run_exec, ExecOptions};
