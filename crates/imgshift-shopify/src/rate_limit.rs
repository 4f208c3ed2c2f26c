//! Retry with exponential back-off for Admin API and file-transfer calls.
//!
//! The wait before retry `n` is `backoff_base_ms * factor^(n-1)`, capped at
//! 60 s and jittered by ±25 %. A `Retry-After` hint on a 429 raises the wait
//! to at least the hinted duration.

use std::future::Future;
use std::time::Duration;

use imgshift_core::AppConfig;

use crate::error::ShopifyError;

const MAX_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_base_ms: 1_000,
            factor: 2,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no back-off.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_ms: 0,
            factor: 1,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
            factor: config.retry_backoff_factor,
        }
    }

    /// Un-jittered delay before retry number `attempt` (1-based), capped.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let multiplier = u64::from(self.factor.max(1)).saturating_pow(exponent);
        let ms = self
            .backoff_base_ms
            .saturating_mul(multiplier)
            .min(MAX_DELAY_MS);
        Duration::from_millis(ms)
    }
}

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// Rate limiting, 5xx responses and network-level failures are retried.
/// Authentication, not-found, GraphQL user errors and malformed payloads are
/// returned immediately.
pub(crate) fn is_retriable(err: &ShopifyError) -> bool {
    match err {
        ShopifyError::RateLimited { .. } | ShopifyError::Transient { .. } => true,
        ShopifyError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        ShopifyError::UnexpectedStatus { .. }
        | ShopifyError::Auth { .. }
        | ShopifyError::NotFound { .. }
        | ShopifyError::GraphQl { .. }
        | ShopifyError::Deserialize { .. }
        | ShopifyError::DataShape { .. }
        | ShopifyError::Fetch { .. }
        | ShopifyError::Upload { .. }
        | ShopifyError::PaginationLimit { .. }
        | ShopifyError::InvalidStoreUrl { .. } => false,
    }
}

/// Runs `operation`, retrying retriable failures according to `policy`.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, ShopifyError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ShopifyError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay = jittered(policy.delay_for(attempt)).max(retry_after(&err));
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient Shopify error, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn jittered(delay: Duration) -> Duration {
    let ms = delay.as_millis() as f64 * (rand::random::<f64>() * 0.5 + 0.75);
    Duration::from_millis(ms as u64)
}

fn retry_after(err: &ShopifyError) -> Duration {
    match err {
        ShopifyError::RateLimited {
            retry_after_secs: Some(secs),
            ..
        } => Duration::from_secs(*secs),
        _ => Duration::ZERO,
    }
}
