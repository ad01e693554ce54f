//! `retrier curve <kind>` – print a delay curve.

use crate::cli::CurveKind;
use anyhow::{Context, Result};
use retrier_core::retry::DelayFn;
use serde::Serialize;
use std::time::Duration;

/// One row of the curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurvePoint {
    pub attempt: u32,
    pub delay_secs: f64,
    /// Total time slept once this delay has elapsed.
    pub cumulative_secs: f64,
}

pub fn curve_points(delay: &DelayFn, attempts: u32) -> Vec<CurvePoint> {
    let mut total = Duration::ZERO;
    (1..=attempts)
        .map(|attempt| {
            let d = delay(attempt);
            total = total.saturating_add(d);
            CurvePoint {
                attempt,
                delay_secs: d.as_secs_f64(),
                cumulative_secs: total.as_secs_f64(),
            }
        })
        .collect()
}

fn print_table(points: &[CurvePoint]) {
    println!("  {:>7}  {:>12}  {:>12}", "Attempt", "Delay(s)", "Total(s)");
    println!("  -------  ------------  ------------");
    for p in points {
        println!(
            "  {:>7}  {:>12.4}  {:>12.4}",
            p.attempt, p.delay_secs, p.cumulative_secs
        );
    }
}

pub fn run_curve(kind: &CurveKind, attempts: u32, json: bool) -> Result<()> {
    let delay = kind.delay_config().build()?;
    let points = curve_points(&delay, attempts);
    if json {
        let out = serde_json::to_string_pretty(&points).context("serialize curve")?;
        println!("{}", out);
    } else {
        print_table(&points);
    }
    Ok(())
}
