//! Types and configurations for the resilience subsystem

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Circuit is closed, requests flow normally
    Closed,
    /// Circuit is open, requests are rejected
    Open,
    /// Circuit is half-open, allowing trial requests
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Failure count that trips the breaker
    pub failure_threshold: u32,
    /// Time the breaker stays open before allowing a trial call
    pub recovery_timeout: Duration,
    /// Consecutive successes in half-open required to close
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(60),
            success_threshold: 3,
        }
    }
}

/// Read-only snapshot of a circuit breaker, suitable for a metrics endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CircuitBreakerMetrics {
    /// Current circuit breaker state
    pub state: CircuitState,
    /// Failures recorded since the last reset
    pub failure_count: u32,
    /// Successes recorded in the current half-open phase
    pub success_count: u32,
}

/// Backoff strategy for computing inter-attempt delays
///
/// The set of strategies is closed; parameters (base delay, factor) live in
/// [`RetryConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// Same delay before every retry
    Fixed,
    /// Delay grows linearly with the attempt number
    Linear,
    /// Delay grows by `backoff_factor` per attempt
    Exponential,
}

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Hard ceiling on any computed delay
    pub max_delay: Duration,
    /// Delay growth strategy
    pub strategy: BackoffStrategy,
    /// Multiplier applied per attempt by the exponential strategy
    pub backoff_factor: f64,
    /// Whether to add up to 10% random noise to each delay
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            strategy: BackoffStrategy::Exponential,
            backoff_factor: 2.0,
            jitter: true,
        }
    }
}
