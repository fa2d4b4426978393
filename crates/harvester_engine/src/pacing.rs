use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::{FailureKind, QueryError};

/// Jitter applied to each rate-limit backoff, drawn per attempt.
pub const RETRY_JITTER: RangeInclusive<f64> = 0.5..=1.5;
/// Jitter applied to the pause after a prefix's children are processed.
pub const PACING_JITTER: RangeInclusive<f64> = 0.8..=1.2;

/// `base * (attempt + 1) * jitter`, saturating instead of overflowing.
pub fn backoff_delay(base: Duration, attempt: u32, jitter: f64) -> Duration {
    scale(base, (f64::from(attempt) + 1.0) * jitter)
}

pub fn pacing_delay(base: Duration, jitter: f64) -> Duration {
    scale(base, jitter)
}

pub(crate) fn retry_jitter() -> f64 {
    rand::thread_rng().gen_range(RETRY_JITTER)
}

pub(crate) fn pacing_jitter() -> f64 {
    rand::thread_rng().gen_range(PACING_JITTER)
}

/// Sleeps for `delay` unless `cancel` fires first.
pub(crate) async fn pause(cancel: &CancellationToken, delay: Duration) -> Result<(), QueryError> {
    if delay.is_zero() {
        return check_cancelled(cancel);
    }
    tokio::select! {
        _ = cancel.cancelled() => Err(cancelled_error()),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

pub(crate) fn check_cancelled(cancel: &CancellationToken) -> Result<(), QueryError> {
    if cancel.is_cancelled() {
        Err(cancelled_error())
    } else {
        Ok(())
    }
}

fn cancelled_error() -> QueryError {
    QueryError::new(FailureKind::Cancelled, "harvest cancelled")
}

fn scale(base: Duration, factor: f64) -> Duration {
    if !(factor.is_finite() && factor > 0.0) {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(base.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}
