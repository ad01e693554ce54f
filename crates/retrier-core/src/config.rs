use crate::retry::{self, DelayFn, SigmoidParams};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Invalid values in a policy section.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite, non-negative number of seconds (got {value})")]
    InvalidSeconds { field: &'static str, value: f64 },
    #[error("max_attempts must be at least 1")]
    InvalidMaxAttempts,
}

fn seconds(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidSeconds { field, value })
}

/// Delay curve between attempts (`kind = "..."` in config.toml).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DelayConfig {
    /// Retry immediately.
    None,
    /// 100ms ± 50ms.
    #[default]
    Jitter,
    Constant { secs: f64 },
    /// `base_secs * 2^(attempt-1)`.
    Exponential { base_secs: f64 },
    /// S-curve capped at one second.
    Sigmoid {
        #[serde(default = "default_sigmoid_offset")]
        offset: f64,
        #[serde(default)]
        midpoint: f64,
        #[serde(default = "default_sigmoid_step")]
        step: f64,
    },
}

fn default_sigmoid_offset() -> f64 {
    SigmoidParams::default().offset
}

fn default_sigmoid_step() -> f64 {
    SigmoidParams::default().step
}

impl DelayConfig {
    /// Turn the config into a delay function, validating durations.
    pub fn build(&self) -> Result<DelayFn, ConfigError> {
        let delay: DelayFn = match *self {
            DelayConfig::None => Arc::new(retry::no_delay()),
            DelayConfig::Jitter => Arc::new(retry::jittered_delay()),
            DelayConfig::Constant { secs } => {
                Arc::new(retry::constant_delay(seconds("delay.secs", secs)?))
            }
            DelayConfig::Exponential { base_secs } => {
                Arc::new(retry::exponential_delay(seconds("delay.base_secs", base_secs)?))
            }
            DelayConfig::Sigmoid {
                offset,
                midpoint,
                step,
            } => Arc::new(retry::sigmoid_delay(SigmoidParams {
                offset,
                midpoint,
                step,
            })),
        };
        Ok(delay)
    }
}

/// `[timed]` section: time-budgeted policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedPolicyConfig {
    /// Total budget in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    /// Log every retryable error at info level.
    #[serde(default)]
    pub log_original_error: bool,
    /// Emit a duration sample per call under this instance name (None = no metric).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_instance: Option<String>,
    #[serde(default)]
    pub delay: DelayConfig,
    #[serde(default)]
    pub metric_tags: BTreeMap<String, String>,
}

fn default_timeout_secs() -> f64 {
    10.0
}

impl Default for TimedPolicyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            log_original_error: false,
            metric_instance: None,
            delay: DelayConfig::Jitter,
            metric_tags: BTreeMap::new(),
        }
    }
}

impl TimedPolicyConfig {
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        seconds("timeout_secs", self.timeout_secs)
    }
}

/// `[conditional]` section: attempt-capped policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalPolicyConfig {
    /// Stop once this many attempts have failed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_conditional_delay")]
    pub delay: DelayConfig,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_conditional_delay() -> DelayConfig {
    DelayConfig::Exponential { base_secs: 0.25 }
}

impl Default for ConditionalPolicyConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay: default_conditional_delay(),
        }
    }
}

/// Global configuration loaded from `~/.config/retrier/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RetrierConfig {
    #[serde(default)]
    pub timed: TimedPolicyConfig,
    #[serde(default)]
    pub conditional: ConditionalPolicyConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("retrier")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RetrierConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RetrierConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<RetrierConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: RetrierConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
