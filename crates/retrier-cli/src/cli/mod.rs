//! CLI for the retrier policies.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use retrier_core::config::{self, DelayConfig};

use commands::{run_config, run_curve, run_exec, ExecOptions};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "retrier")]
#[command(about = "Retry policies with backoff curves and time budgets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the delay for each attempt of a backoff curve.
    Curve {
        #[command(subcommand)]
        kind: CurveKind,

        /// Number of attempts to print.
        #[arg(long, default_value = "10", value_name = "N", global = true)]
        attempts: u32,

        /// Emit JSON instead of a table.
        #[arg(long, global = true)]
        json: bool,
    },

    /// Run a program, retrying while it exits non-zero.
    Exec {
        /// Time budget in seconds (overrides `[timed] timeout_secs`).
        #[arg(long, value_name = "SECS", conflicts_with = "max_attempts")]
        timeout: Option<f64>,

        /// Use the attempt-capped policy instead of the time budget.
        #[arg(long, value_name = "N")]
        max_attempts: Option<u32>,

        /// Program and arguments, after `--`.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Show the config file path and the effective configuration.
    Config,
}

/// Delay curves that `retrier curve` can print.
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum CurveKind {
    /// base * 2^(attempt-1).
    Exponential {
        #[arg(long, default_value_t = 0.25, value_name = "SECS")]
        base_secs: f64,
    },
    /// Logistic curve capped at one second.
    Sigmoid {
        #[arg(long, default_value_t = -5.0, allow_negative_numbers = true)]
        offset: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        midpoint: f64,
        #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
        step: f64,
    },
    /// 100ms ± 50ms (random on every run).
    Jitter,
}

impl CurveKind {
    pub fn delay_config(&self) -> DelayConfig {
        match *self {
            CurveKind::Exponential { base_secs } => DelayConfig::Exponential { base_secs },
            CurveKind::Sigmoid {
                offset,
                midpoint,
                step,
            } => DelayConfig::Sigmoid {
                offset,
                midpoint,
                step,
            },
            CurveKind::Jitter => DelayConfig::Jitter,
        }
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Curve {
                kind,
                attempts,
                json,
            } => run_curve(&kind, attempts, json)?,
            CliCommand::Exec {
                timeout,
                max_attempts,
                command,
            } => {
                let opts = ExecOptions {
                    timeout_secs: timeout,
                    max_attempts,
                };
                run_exec(&cfg, &command, &opts)?;
            }
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
