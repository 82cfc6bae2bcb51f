//! Common test utilities for safecall
//!
//! Shared infrastructure for integration tests: fast settings factories and
//! a counting flaky-call helper.

use safecall::{OperationSettings, ResilienceSettings};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// Install a test subscriber once per process; respects `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Settings tuned for test speed: millisecond delays, no jitter.
pub fn fast_settings(failure_threshold: u32, max_attempts: u32) -> ResilienceSettings {
    ResilienceSettings {
        default: OperationSettings {
            failure_threshold,
            recovery_timeout_ms: 50,
            success_threshold: 1,
            max_attempts,
            base_delay_ms: 1,
            max_delay_ms: 10,
            jitter: false,
            ..OperationSettings::default()
        },
        operations: HashMap::new(),
    }
}

/// A dependency that fails a fixed number of times before succeeding,
/// counting every invocation.
#[derive(Clone)]
pub struct FlakyCall {
    calls: Arc<AtomicU32>,
    failures_before_success: u32,
}

impl FlakyCall {
    pub fn new(failures_before_success: u32) -> Self {
        Self {
            calls: Arc::new(AtomicU32::new(0)),
            failures_before_success,
        }
    }

    /// Invocations so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// One invocation of the flaky dependency.
    pub async fn invoke(&self) -> Result<&'static str, &'static str> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures_before_success {
            Err("transient failure")
        } else {
            Ok("payload")
        }
    }
}
