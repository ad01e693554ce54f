//! `retrier exec -- <program> [args...]` – run a program under a retry policy.

use anyhow::{bail, Result};
use retrier_core::config::{ConfigError, RetrierConfig};
use retrier_core::retry::{ConditionalRetryPolicy, RetryPolicy, TimedRetryPolicy};
use std::io;
use std::process::{Command, ExitStatus};

/// Why a single run of the program failed.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The program could not be started (not found, permission denied). Not retried.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    /// The program ran and exited unsuccessfully. Retried.
    #[error("{program} exited with {status}")]
    Exit { program: String, status: ExitStatus },
}

impl ExecError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExecError::Exit { .. })
    }
}

/// Overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    pub timeout_secs: Option<f64>,
    pub max_attempts: Option<u32>,
}

fn run_once(program: &str, args: &[String]) -> Result<(), ExecError> {
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| ExecError::Spawn {
            program: program.to_string(),
            source,
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(ExecError::Exit {
            program: program.to_string(),
            status,
        })
    }
}

/// Run `command` until it exits zero or the policy gives up.
pub fn run_exec(cfg: &RetrierConfig, command: &[String], opts: &ExecOptions) -> Result<()> {
    let Some((program, args)) = command.split_first() else {
        bail!("no program given");
    };

    match opts.max_attempts {
        Some(0) => return Err(ConfigError::InvalidMaxAttempts.into()),
        Some(max_attempts) => {
            let delay = cfg.conditional.delay.build()?;
            let policy = ConditionalRetryPolicy::new(move |attempt, e: &ExecError| {
                e.is_retryable() && attempt < max_attempts
            })
            .with_delay_fn(delay);
            policy.call(|| run_once(program, args))?;
        }
        None => {
            let mut section = cfg.timed.clone();
            if let Some(timeout) = opts.timeout_secs {
                section.timeout_secs = timeout;
            }
            let policy = TimedRetryPolicy::<ExecError>::from_config(&section)?
                .retry_if(ExecError::is_retryable);
            policy.call(|| run_once(program, args))?;
        }
    }

    tracing::info!(program = %program, "command succeeded");
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use retrier_core::config::DelayConfig;

    fn cfg() -> RetrierConfig {
        let mut cfg = RetrierConfig::default();
        cfg.timed.timeout_secs = 0.2;
        cfg.timed.delay = DelayConfig::Constant { secs: 0.01 };
        cfg.conditional.delay = DelayConfig::None;
        cfg
    }

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn succeeds_without_retry() {
        run_exec(&cfg(), &argv(&["true"]), &ExecOptions::default()).unwrap();
    }

    #[test]
    fn failing_program_exhausts_time_budget() {
        let err = run_exec(&cfg(), &argv(&["false"]), &ExecOptions::default()).unwrap_err();
        assert!(err.to_string().contains("could not successfully execute"));
    }

    #[test]
    fn failing_program_stops_at_max_attempts() {
        let opts = ExecOptions {
            max_attempts: Some(2),
            ..ExecOptions::default()
        };
        let err = run_exec(&cfg(), &argv(&["false"]), &opts).unwrap_err();
        let exec = err.downcast_ref::<ExecError>().expect("exec error");
        assert!(exec.is_retryable());
    }

    #[test]
    fn missing_program_is_not_retried() {
        let err = run_exec(
            &cfg(),
            &argv(&["retrier-test-no-such-program"]),
            &ExecOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed to start"));
    }

    #[test]
    fn zero_max_attempts_rejected() {
        let opts = ExecOptions {
            max_attempts: Some(0),
            ..ExecOptions::default()
        };
        assert!(run_exec(&cfg(), &argv(&["true"]), &opts).is_err());
    }

    #[test]
    fn empty_command_rejected() {
        assert!(run_exec(&cfg(), &[], &ExecOptions::default()).is_err());
    }
}
