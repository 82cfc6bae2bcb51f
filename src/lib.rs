//! # safecall
//!
//! Resilient execution layer for external calls: per-operation circuit
//! breakers, configurable retry/backoff, and a client facade that composes
//! both around any fallible async operation.
//!
//! ## Features
//!
//! - **Per-operation isolation**: one circuit breaker per logical operation
//!   name; a failing dependency never gates the others
//! - **Fail fast**: an open breaker rejects calls without touching the
//!   dependency, and heals itself after a recovery timeout
//! - **Configurable backoff**: fixed, linear, or exponential delays with
//!   optional jitter and a hard ceiling
//! - **Transport agnostic**: wraps any zero-argument fallible async closure;
//!   HTTP, gRPC, or local work all look the same
//! - **Observable**: a statistics snapshot per operation, ready for a
//!   health or metrics endpoint
//! - **Shutdown aware**: in-flight backoff delays can be cancelled, so
//!   process shutdown is never held up by a retry schedule
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use safecall::ResilientClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ResilientClient::new();
//!
//!     // Any fallible async closure works; the operation name keys the
//!     // breaker and retry policy.
//!     let profile: String = client
//!         .execute("fda_lookup", || async {
//!             fetch_ingredient_profile("niacinamide").await
//!         })
//!         .await?;
//!
//!     println!("profile: {profile}");
//!     Ok(())
//! }
//!
//! async fn fetch_ingredient_profile(
//!     _name: &str,
//! ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
//!     Ok("safe".to_string())
//! }
//! ```
//!
//! ## Configured per operation
//!
//! ```rust,no_run
//! use safecall::{ResilienceSettings, ResilientClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = ResilienceSettings::from_file("config/resilience.yaml").await?;
//!     let client = ResilientClient::with_settings(settings);
//!
//!     // Expose breaker states on a health endpoint.
//!     let snapshot = serde_json::to_string(&client.statistics())?;
//!     println!("{snapshot}");
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod recovery;

// Re-export main types
pub use config::{OperationSettings, ResilienceSettings, Validate};
pub use error::{BoxError, ResilienceError, Result};
pub use lifecycle::Shutdown;
pub use recovery::{
    BackoffStrategy, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState,
    ResilientClient, RetryConfig, RetryHandler,
};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
