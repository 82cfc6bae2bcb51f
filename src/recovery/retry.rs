//! Retry execution with configurable backoff
//!
//! The handler is stateless across calls; all policy lives in
//! [`RetryConfig`]. The only suspension point is the inter-attempt sleep,
//! which holds no lock and can be cut short by a [`Shutdown`] signal.

use super::types::{BackoffStrategy, RetryConfig};
use crate::error::{BoxError, ResilienceError, Result};
use crate::lifecycle::Shutdown;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error};

/// Executes a unit of work up to `max_attempts` times with backoff
pub struct RetryHandler {
    config: RetryConfig,
}

impl RetryHandler {
    /// Create a new retry handler
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(RetryConfig::default())
    }

    /// The configuration this handler applies
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Compute the delay scheduled after the given 0-based attempt
    ///
    /// Jitter, when enabled, adds up to 10% of the computed delay; the
    /// result never exceeds `max_delay` regardless of strategy or jitter.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_ms = self.config.base_delay.as_secs_f64() * 1000.0;
        let max_ms = self.config.max_delay.as_secs_f64() * 1000.0;

        let raw_ms = match self.config.strategy {
            BackoffStrategy::Fixed => base_ms,
            BackoffStrategy::Linear => base_ms * (f64::from(attempt) + 1.0),
            BackoffStrategy::Exponential => {
                base_ms * self.config.backoff_factor.powi(attempt.min(1_000) as i32)
            }
        };

        // Cap before applying jitter so the factor never overflows into
        // infinity; the final clamp below is what callers observe.
        let mut delay_ms = raw_ms.min(max_ms);
        if self.config.jitter {
            delay_ms += rand::random::<f64>() * (delay_ms * 0.1);
        }

        Duration::from_secs_f64(delay_ms.min(max_ms).max(0.0) / 1000.0)
    }

    /// Execute `work` with retries; no cancellation signal
    pub async fn execute<T, E, F, Fut>(&self, operation: &str, work: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<BoxError>,
    {
        self.execute_with_shutdown(operation, work, None).await
    }

    /// Execute `work` with retries, aborting delays when `shutdown` fires
    ///
    /// Success at any attempt returns immediately. A failure on the final
    /// attempt is wrapped in [`ResilienceError::RetryExhausted`] carrying
    /// the underlying error. Cancellation during an inter-attempt delay
    /// yields [`ResilienceError::Cancelled`] and no further attempts.
    pub async fn execute_with_shutdown<T, E, F, Fut>(
        &self,
        operation: &str,
        mut work: F,
        shutdown: Option<&Shutdown>,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<BoxError>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut shutdown_rx = shutdown.map(Shutdown::subscribe);

        for attempt in 0..max_attempts {
            match work().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(operation, attempt = attempt + 1, "call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => {
                    let err = err.into();

                    if attempt + 1 >= max_attempts {
                        error!(
                            operation,
                            attempts = max_attempts,
                            error = %err,
                            "retries exhausted"
                        );
                        return Err(ResilienceError::RetryExhausted {
                            operation: operation.to_string(),
                            attempts: max_attempts,
                            source: err,
                        });
                    }

                    let delay = self.delay_for_attempt(attempt);
                    debug!(
                        operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "call failed, retrying after delay"
                    );

                    match (&mut shutdown_rx, shutdown) {
                        (Some(rx), Some(signal)) => {
                            if signal.is_triggered() {
                                return Err(ResilienceError::cancelled(operation));
                            }
                            tokio::select! {
                                _ = tokio::time::sleep(delay) => {}
                                _ = rx.recv() => {
                                    debug!(operation, "retry delay cancelled by shutdown");
                                    return Err(ResilienceError::cancelled(operation));
                                }
                            }
                        }
                        _ => tokio::time::sleep(delay).await,
                    }
                }
            }
        }

        unreachable!("retry loop returns from the final attempt")
    }
}
