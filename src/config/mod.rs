//! Configuration management for the resilience subsystem
//!
//! Settings can come from a YAML file, from environment variables, or be
//! built in code. The recognized options are exactly the breaker and retry
//! knobs; unknown keys are rejected at parse time.

use crate::error::{ResilienceError, Result};
use crate::recovery::{BackoffStrategy, CircuitBreakerConfig, RetryConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Validation for configuration structures
pub trait Validate {
    /// Check invariants, returning a `Config` error naming the violation
    fn validate(&self) -> Result<()>;
}

/// Resilience settings for one logical operation
///
/// Durations are expressed in milliseconds in files and environment
/// variables; [`circuit_breaker`](Self::circuit_breaker) and
/// [`retry`](Self::retry) convert to the runtime config types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperationSettings {
    /// Failure count that trips the breaker
    pub failure_threshold: u32,
    /// Time the breaker stays open before a trial call, in milliseconds
    pub recovery_timeout_ms: u64,
    /// Consecutive half-open successes required to close
    pub success_threshold: u32,
    /// Maximum attempts per call, including the first
    pub max_attempts: u32,
    /// Base inter-attempt delay, in milliseconds
    pub base_delay_ms: u64,
    /// Ceiling on any inter-attempt delay, in milliseconds
    pub max_delay_ms: u64,
    /// Delay growth strategy
    pub strategy: BackoffStrategy,
    /// Multiplier for the exponential strategy
    pub backoff_factor: f64,
    /// Whether to add up to 10% random noise to delays
    pub jitter: bool,
}

impl Default for OperationSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout_ms: 60_000,
            success_threshold: 3,
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 60_000,
            strategy: BackoffStrategy::Exponential,
            backoff_factor: 2.0,
            jitter: true,
        }
    }
}

impl OperationSettings {
    /// Circuit breaker configuration derived from these settings
    pub fn circuit_breaker(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            recovery_timeout: Duration::from_millis(self.recovery_timeout_ms),
            success_threshold: self.success_threshold,
        }
    }

    /// Retry configuration derived from these settings
    pub fn retry(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            strategy: self.strategy,
            backoff_factor: self.backoff_factor,
            jitter: self.jitter,
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        fn parse<T: std::str::FromStr>(var: &str, value: &str) -> Result<T>
        where
            T::Err: std::fmt::Display,
        {
            value
                .parse()
                .map_err(|e| ResilienceError::config(format!("invalid {var}: {e}")))
        }

        if let Ok(v) = env::var("SAFECALL_FAILURE_THRESHOLD") {
            self.failure_threshold = parse("SAFECALL_FAILURE_THRESHOLD", &v)?;
        }
        if let Ok(v) = env::var("SAFECALL_RECOVERY_TIMEOUT_MS") {
            self.recovery_timeout_ms = parse("SAFECALL_RECOVERY_TIMEOUT_MS", &v)?;
        }
        if let Ok(v) = env::var("SAFECALL_SUCCESS_THRESHOLD") {
            self.success_threshold = parse("SAFECALL_SUCCESS_THRESHOLD", &v)?;
        }
        if let Ok(v) = env::var("SAFECALL_MAX_ATTEMPTS") {
            self.max_attempts = parse("SAFECALL_MAX_ATTEMPTS", &v)?;
        }
        if let Ok(v) = env::var("SAFECALL_BASE_DELAY_MS") {
            self.base_delay_ms = parse("SAFECALL_BASE_DELAY_MS", &v)?;
        }
        if let Ok(v) = env::var("SAFECALL_MAX_DELAY_MS") {
            self.max_delay_ms = parse("SAFECALL_MAX_DELAY_MS", &v)?;
        }
        if let Ok(v) = env::var("SAFECALL_STRATEGY") {
            self.strategy = match v.as_str() {
                "fixed" => BackoffStrategy::Fixed,
                "linear" => BackoffStrategy::Linear,
                "exponential" => BackoffStrategy::Exponential,
                other => {
                    return Err(ResilienceError::config(format!(
                        "invalid SAFECALL_STRATEGY: {other}"
                    )));
                }
            };
        }
        if let Ok(v) = env::var("SAFECALL_BACKOFF_FACTOR") {
            self.backoff_factor = parse("SAFECALL_BACKOFF_FACTOR", &v)?;
        }
        if let Ok(v) = env::var("SAFECALL_JITTER") {
            self.jitter = parse("SAFECALL_JITTER", &v)?;
        }
        Ok(())
    }
}

impl Validate for OperationSettings {
    fn validate(&self) -> Result<()> {
        if self.max_attempts < 1 {
            return Err(ResilienceError::config("max_attempts must be at least 1"));
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(ResilienceError::config(format!(
                "base_delay_ms ({}) must not exceed max_delay_ms ({})",
                self.base_delay_ms, self.max_delay_ms
            )));
        }
        if self.failure_threshold < 1 {
            return Err(ResilienceError::config(
                "failure_threshold must be at least 1",
            ));
        }
        if self.success_threshold < 1 {
            return Err(ResilienceError::config(
                "success_threshold must be at least 1",
            ));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor <= 0.0 {
            return Err(ResilienceError::config(format!(
                "backoff_factor must be a positive finite number, got {}",
                self.backoff_factor
            )));
        }
        Ok(())
    }
}

/// Subsystem-wide settings: a global default plus per-operation overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResilienceSettings {
    /// Settings applied to any operation without an explicit entry
    pub default: OperationSettings,
    /// Per-operation-name overrides
    pub operations: HashMap<String, OperationSettings>,
}

impl ResilienceSettings {
    /// Load settings from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("loading resilience settings from {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ResilienceError::config(format!("failed to read config file: {e}")))?;

        let settings: Self = serde_yaml::from_str(&content)
            .map_err(|e| ResilienceError::config(format!("failed to parse config: {e}")))?;

        settings.validate()?;
        debug!("resilience settings loaded");
        Ok(settings)
    }

    /// Load settings from environment variables
    ///
    /// Starts from the defaults and applies `SAFECALL_*` overrides to the
    /// default operation settings.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();
        settings.default.apply_env_overrides()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Settings for the given operation name, falling back to the default
    pub fn for_operation(&self, name: &str) -> &OperationSettings {
        self.operations.get(name).unwrap_or(&self.default)
    }
}

impl Validate for ResilienceSettings {
    fn validate(&self) -> Result<()> {
        self.default.validate()?;
        for (name, op) in &self.operations {
            op.validate()
                .map_err(|e| ResilienceError::config(format!("operation '{name}': {e}")))?;
        }
        Ok(())
    }
}
