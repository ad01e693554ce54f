//! `retrier config` – where the config lives and what it resolves to.

use anyhow::{Context, Result};
use retrier_core::config::{self, RetrierConfig};

pub fn run_config(cfg: &RetrierConfig) -> Result<()> {
    let path = config::config_path()?;
    let rendered = toml::to_string_pretty(cfg).context("render config")?;
    println!("# {}", path.display());
    print!("{}", rendered);
    Ok(())
}
