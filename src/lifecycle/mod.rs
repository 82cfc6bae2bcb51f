//! Lifecycle management for the resilience subsystem
//!
//! Retry delays are the subsystem's only suspension point; the shutdown
//! coordinator lets the embedding application cut those delays short so a
//! process shutdown is not held hostage by a backoff schedule.

pub mod shutdown;

pub use shutdown::Shutdown;
