//! Circuit breaker implementation for fault tolerance
//!
//! One breaker guards one logical operation name. Failures are isolated per
//! operation: a tripped breaker for one dependency never gates another.

use super::types::{CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState};
use parking_lot::Mutex;
use std::time::Instant;
use tracing::{debug, warn};

/// Mutable breaker record, guarded by a single mutex.
///
/// Critical sections are short and never await, so one lock per breaker is
/// enough; different operation names never contend.
struct BreakerInner {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    last_failure_time: Option<Instant>,
}

/// Per-operation circuit breaker
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker for the given operation name
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                last_failure_time: None,
            }),
        }
    }

    /// Create with default configuration
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::new(name, CircuitBreakerConfig::default())
    }

    /// Check whether a call may proceed
    ///
    /// In `Open`, the recovery timeout is measured against the most recent
    /// recorded failure; once it has elapsed the breaker moves to `HalfOpen`
    /// as a side effect and the call is admitted as a trial. Every caller
    /// that arrives while `HalfOpen` is admitted; limiting to a single
    /// concurrent probe would be a change to the `HalfOpen` arm below.
    pub fn can_execute(&self) -> bool {
        let mut inner = self.inner.lock();

        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let Some(last_failure) = inner.last_failure_time else {
                    // Open implies a recorded failure; treat a missing one
                    // as still cooling down rather than admitting traffic.
                    return false;
                };

                if last_failure.elapsed() >= self.config.recovery_timeout {
                    debug!(name = %self.name, "circuit breaker transitioning from open to half-open");
                    inner.state = CircuitState::HalfOpen;
                    inner.success_count = 0;
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => true,
        }
    }

    /// Record a successful call outcome
    pub fn record_success(&self) {
        let mut inner = self.inner.lock();

        match inner.state {
            CircuitState::Closed => {
                // A single success clears the failure tally.
                inner.failure_count = 0;
            }
            CircuitState::HalfOpen => {
                inner.success_count = inner.success_count.saturating_add(1);
                debug!(
                    name = %self.name,
                    successes = inner.success_count,
                    threshold = self.config.success_threshold,
                    "trial call succeeded in half-open state"
                );

                if inner.success_count >= self.config.success_threshold {
                    debug!(name = %self.name, "circuit breaker closing after recovery");
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    inner.success_count = 0;
                    inner.last_failure_time = None;
                }
            }
            // No call was admitted, so no success should arrive here.
            CircuitState::Open => {}
        }
    }

    /// Record a failed call outcome
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();

        inner.failure_count = inner.failure_count.saturating_add(1);
        inner.last_failure_time = Some(Instant::now());

        match inner.state {
            CircuitState::HalfOpen => {
                // The pre-existing tally already tripped the breaker once;
                // one failed trial is enough to re-open.
                warn!(name = %self.name, "trial call failed, circuit breaker re-opening");
                inner.state = CircuitState::Open;
            }
            CircuitState::Closed => {
                if inner.failure_count >= self.config.failure_threshold {
                    warn!(
                        name = %self.name,
                        failures = inner.failure_count,
                        threshold = self.config.failure_threshold,
                        "failure threshold reached, circuit breaker opening"
                    );
                    inner.state = CircuitState::Open;
                } else {
                    debug!(
                        name = %self.name,
                        failures = inner.failure_count,
                        threshold = self.config.failure_threshold,
                        "failure recorded"
                    );
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Get the operation name this breaker guards
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the current state
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Failures recorded since the last reset
    pub fn failure_count(&self) -> u32 {
        self.inner.lock().failure_count
    }

    /// Successes recorded in the current half-open phase
    pub fn success_count(&self) -> u32 {
        self.inner.lock().success_count
    }

    /// Get a consistent snapshot of state and counters
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        let inner = self.inner.lock();
        CircuitBreakerMetrics {
            state: inner.state,
            failure_count: inner.failure_count,
            success_count: inner.success_count,
        }
    }

    /// Force the breaker back to a pristine closed state
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.success_count = 0;
        inner.last_failure_time = None;
        debug!(name = %self.name, "circuit breaker reset");
    }
}
