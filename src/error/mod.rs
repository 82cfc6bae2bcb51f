//! Error handling for the resilience subsystem
//!
//! This module defines all error types surfaced to callers. Underlying
//! operation failures are never swallowed: exhaustion carries the last
//! failure as its source.

use thiserror::Error;

/// Boxed error type accepted from wrapped operations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for the resilience subsystem
pub type Result<T> = std::result::Result<T, ResilienceError>;

/// Main error type for the resilience subsystem
#[derive(Error, Debug)]
pub enum ResilienceError {
    /// The operation's circuit breaker is open; the call was not attempted
    #[error("circuit breaker open for operation '{operation}'")]
    CircuitOpen {
        /// Logical operation name whose breaker rejected the call
        operation: String,
    },

    /// All configured attempts failed; carries the last underlying failure
    #[error("operation '{operation}' failed after {attempts} attempts")]
    RetryExhausted {
        /// Logical operation name
        operation: String,
        /// Total number of attempts made
        attempts: u32,
        /// The failure from the final attempt
        #[source]
        source: BoxError,
    },

    /// The inter-attempt delay was interrupted by shutdown
    #[error("operation '{operation}' cancelled during retry delay")]
    Cancelled {
        /// Logical operation name
        operation: String,
    },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),
}

/// Helper functions for creating specific errors
impl ResilienceError {
    pub fn circuit_open<S: Into<String>>(operation: S) -> Self {
        Self::CircuitOpen {
            operation: operation.into(),
        }
    }

    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Whether the error means the call never reached the dependency
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::CircuitOpen { .. })
    }
}
