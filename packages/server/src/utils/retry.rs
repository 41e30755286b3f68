use std::future::Future;
use std::time::Duration;

use rand::Rng;
use sea_orm::DbErr;
use tracing::warn;

use crate::config::ScoringConfig;

/// Errors that may go away if the same idempotent read is tried again.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for DbErr {
    fn is_transient(&self) -> bool {
        matches!(self, DbErr::ConnectionAcquire(_) | DbErr::Conn(_))
    }
}

/// Calculate exponential backoff delay with jitter.
///
/// Formula: `min(base_ms * 2^(attempt-1) + jitter, max_ms)` (0-25% jitter)
pub fn calculate_backoff(attempt: u8, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exp_factor = 2u64.saturating_pow((attempt - 1) as u32);
    let delay_ms = base_ms.saturating_mul(exp_factor);

    let jitter = if delay_ms > 0 {
        rand::rng().random_range(0..=delay_ms / 4)
    } else {
        0
    };

    let total_delay = delay_ms.saturating_add(jitter).min(max_ms);
    Duration::from_millis(total_delay)
}

/// Run an idempotent read, retrying transient failures up to
/// `policy.read_retries` extra times. Never use this for writes.
pub async fn retry_read<T, E, F, Fut>(policy: &ScoringConfig, mut op: F) -> Result<T, E>
where
    E: Transient + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt: u8 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.read_retries => {
                attempt += 1;
                let delay = calculate_backoff(attempt, policy.retry_base_ms, policy.retry_max_ms);
                warn!(attempt, delay_ms = delay.as_millis() as u64, error = %e, "Retrying read");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
