//! Caller-side retry with exponential backoff.

use std::future::Future;

use crate::config::RetryConfig;
use crate::context::Context;
use crate::error::{AdapterError, Disposition, ProviderError};

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget in `config` is spent.
///
/// Only failures whose sentinel class is retryable are repeated. A server
/// supplied `Retry-After` takes precedence over the computed backoff. The
/// backoff sleep itself observes `ctx`.
pub async fn retry<T, F, Fut>(
    ctx: &Context,
    config: &RetryConfig,
    mut op: F,
) -> Result<T, AdapterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AdapterError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        attempt += 1;

        if err.disposition() != Disposition::Retry
            || attempt >= max_attempts
            || ctx.err().is_some()
        {
            return Err(err);
        }

        let delay = server_delay(&err).unwrap_or_else(|| config.delay_for_attempt(attempt - 1));
        tracing::debug!(
            provider = err.provider(),
            op = %err.op(),
            attempt,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "retrying after retryable failure"
        );

        let slept = ctx
            .run(async {
                tokio::time::sleep(delay).await;
                Ok(())
            })
            .await;
        if let Err(cause) = slept {
            return Err(AdapterError::new(err.provider().to_owned(), err.op(), cause));
        }
    }
}

fn server_delay(err: &AdapterError) -> Option<std::time::Duration> {
    match err.find::<ProviderError>()? {
        ProviderError::RateLimited { retry_after } => *retry_after,
        _ => None,
    }
}
