//! Resilient external-call subsystem
//!
//! Control flow for a wrapped call:
//!
//! ```text
//! caller → ResilientClient::execute(name, work)
//!        → CircuitBreaker::can_execute gate
//!        → RetryHandler (attempts + backoff)
//!        → CircuitBreaker::record_success / record_failure
//!        → result or error back to the caller
//! ```

mod circuit_breaker;
mod client;
mod retry;
mod types;

pub use circuit_breaker::CircuitBreaker;
pub use client::ResilientClient;
pub use retry::RetryHandler;
pub use types::{
    BackoffStrategy, CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState, RetryConfig,
};
