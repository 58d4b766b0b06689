//! Timing and aggregation harness.
//!
//! Every benchmark in this crate goes through the same three steps: wrap one
//! operation invocation between two monotonic clock reads ([`measure`]),
//! repeat it a fixed number of times ([`run_benchmark`] / [`run_with_reset`]),
//! and reduce the samples into a [`ResultSummary`] ([`summarize`]).
//!
//! Failures of the wrapped operation are logged and swallowed: the iteration
//! still contributes a real sample, and the loop never stops early.

use std::fmt::Display;
use std::time::{Duration, Instant};

use crate::error::StatsError;
use crate::schema::ResultSummary;

/// Decimal digits kept in reported statistics.
pub const PRECISION: i32 = 5;

/// Outcome and elapsed time of one timed invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Measured<T> {
    /// `None` when the operation failed.
    pub outcome: Option<T>,
    pub duration: Duration,
}

impl<T> Measured<T> {
    /// Elapsed time in seconds, the unit every sample is stored in.
    pub fn secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// When the untimed reset step runs relative to each timed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPhase {
    /// Before every timed call (e.g. truncate before insert).
    Before,
    /// After every timed call (e.g. restore a backup after delete).
    After,
}

/// Time one invocation of `op`.
///
/// The end timestamp is taken whether or not `op` succeeded, so a failing
/// call yields a genuine duration rather than a sentinel.
pub fn measure<T, E, F>(label: &str, op: F) -> Measured<T>
where
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    let start = Instant::now();
    let outcome = match op() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(operation = label, error = %e, "operation failed");
            None
        }
    };
    let duration = start.elapsed();
    Measured { outcome, duration }
}

/// Run `op` exactly `iterations` times, sequentially, returning one sample
/// (seconds) per call in call order.
pub fn run_benchmark<T, E, F>(label: &str, iterations: usize, mut op: F) -> Vec<f64>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    let mut samples = Vec::with_capacity(iterations);
    for i in 0..iterations {
        let m = measure(label, &mut op);
        tracing::debug!(operation = label, iteration = i, secs = m.secs(), "sample");
        samples.push(m.secs());
    }
    samples
}

/// Like [`run_benchmark`], but runs an untimed `reset` step around each timed
/// call so every iteration starts from the same precondition.
///
/// `op` and `reset` share mutable access to `ctx` (typically the backend).
/// Reset failures are logged and the loop carries on.
pub fn run_with_reset<C, T, E, R, RE, F>(
    label: &str,
    iterations: usize,
    ctx: &mut C,
    phase: ResetPhase,
    mut reset: R,
    mut op: F,
) -> Vec<f64>
where
    E: Display,
    RE: Display,
    R: FnMut(&mut C) -> Result<(), RE>,
    F: FnMut(&mut C) -> Result<T, E>,
{
    let mut run_reset = |ctx: &mut C| {
        if let Err(e) = reset(ctx) {
            tracing::error!(operation = label, error = %e, "reset step failed");
        }
    };

    let mut samples = Vec::with_capacity(iterations);
    for i in 0..iterations {
        if phase == ResetPhase::Before {
            run_reset(ctx);
        }
        let m = measure(label, || op(ctx));
        tracing::debug!(operation = label, iteration = i, secs = m.secs(), "sample");
        samples.push(m.secs());
        if phase == ResetPhase::After {
            run_reset(ctx);
        }
    }
    samples
}

/// Reduce samples into count, total, mean and Bessel-corrected variance,
/// each rounded to [`PRECISION`] decimals.
pub fn summarize(samples: &[f64]) -> Result<ResultSummary, StatsError> {
    let n = samples.len();
    if n < 2 {
        return Err(StatsError::InsufficientSamples(n));
    }

    let total: f64 = samples.iter().sum();
    let mean = total / n as f64;
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1) as f64;

    Ok(ResultSummary {
        iterations: n,
        total_execution_time: round_to(total, PRECISION),
        mean_time: round_to(mean, PRECISION),
        variance_time: round_to(variance, PRECISION),
    })
}

/// Round `value` to `digits` decimal places.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}
