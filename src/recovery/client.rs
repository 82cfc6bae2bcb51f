//! Client facade composing circuit breaking and retries
//!
//! One [`ResilientClient`] owns the per-operation registry. It is an
//! explicit value handed to call sites by the composition root, not a
//! process-global, so tests get a fresh registry each.

use super::circuit_breaker::CircuitBreaker;
use super::retry::RetryHandler;
use super::types::CircuitBreakerMetrics;
use crate::config::ResilienceSettings;
use crate::error::{BoxError, ResilienceError, Result};
use crate::lifecycle::Shutdown;
use dashmap::DashMap;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

/// Facade wrapping remote calls with per-operation resilience
///
/// Breakers and retry handlers are created on first use of an operation
/// name and live as long as the client. Each call's outcome feeds back only
/// into its own operation's breaker; the retry loop's internal attempts are
/// invisible to the breaker, which sees one success or one failure per
/// `execute`.
pub struct ResilientClient {
    settings: ResilienceSettings,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    retry_handlers: DashMap<String, Arc<RetryHandler>>,
    shutdown: Shutdown,
}

impl ResilientClient {
    /// Create a client with default settings for every operation
    pub fn new() -> Self {
        Self::with_settings(ResilienceSettings::default())
    }

    /// Create a client from settings (global default + per-operation overrides)
    pub fn with_settings(settings: ResilienceSettings) -> Self {
        Self {
            settings,
            breakers: DashMap::new(),
            retry_handlers: DashMap::new(),
            shutdown: Shutdown::new(),
        }
    }

    /// Execute `work` under the named operation's breaker and retry policy
    ///
    /// When the breaker rejects the call, `work` is never invoked and
    /// [`ResilienceError::CircuitOpen`] is returned immediately.
    pub async fn execute<T, E, F, Fut>(&self, operation: &str, work: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<BoxError>,
    {
        let breaker = self.breaker(operation);
        let handler = self.retry_handler(operation);

        if !breaker.can_execute() {
            warn!(operation, "call rejected, circuit breaker open");
            return Err(ResilienceError::circuit_open(operation));
        }

        match handler
            .execute_with_shutdown(operation, work, Some(&self.shutdown))
            .await
        {
            Ok(value) => {
                breaker.record_success();
                Ok(value)
            }
            Err(err) => {
                breaker.record_failure();
                Err(err)
            }
        }
    }

    /// Snapshot of every operation used at least once
    ///
    /// Never errors and never suspends; safe to call from a health or
    /// metrics endpoint at any rate.
    pub fn statistics(&self) -> HashMap<String, CircuitBreakerMetrics> {
        self.breakers
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().metrics()))
            .collect()
    }

    /// Reset one operation's breaker; returns false if it was never used
    pub fn reset(&self, operation: &str) -> bool {
        match self.breakers.get(operation) {
            Some(breaker) => {
                breaker.reset();
                true
            }
            None => false,
        }
    }

    /// Cancel in-flight retry delays; subsequent delays also cancel
    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Handle to the client's shutdown coordinator
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    fn breaker(&self, operation: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(operation.to_string())
            .or_insert_with(|| {
                let config = self.settings.for_operation(operation).circuit_breaker();
                Arc::new(CircuitBreaker::new(operation, config))
            })
            .clone()
    }

    fn retry_handler(&self, operation: &str) -> Arc<RetryHandler> {
        self.retry_handlers
            .entry(operation.to_string())
            .or_insert_with(|| {
                let config = self.settings.for_operation(operation).retry();
                Arc::new(RetryHandler::new(config))
            })
            .clone()
    }
}

impl Default for ResilientClient {
    fn default() -> Self {
        Self::new()
    }
}
