//! Client behavior across breaker, retry, and statistics

use crate::common::{fast_settings, init_tracing, FlakyCall};
use safecall::{CircuitState, ResilienceError, ResilientClient};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

#[tokio::test]
async fn test_flaky_dependency_recovers_within_retry_budget() {
    init_tracing();
    let client = ResilientClient::with_settings(fast_settings(5, 3));
    let flaky = FlakyCall::new(2);

    let dependency = flaky.clone();
    let result = client
        .execute("ingredient_lookup", move || {
            let dependency = dependency.clone();
            async move { dependency.invoke().await }
        })
        .await;

    let payload = assert_ok!(result);
    assert_eq!(payload, "payload");
    // Two failures plus the success, all inside one execute.
    assert_eq!(flaky.calls(), 3);

    let stats = client.statistics();
    assert_eq!(stats["ingredient_lookup"].state, CircuitState::Closed);
    assert_eq!(stats["ingredient_lookup"].failure_count, 0);
}

#[tokio::test]
async fn test_persistent_failure_trips_breaker_and_stops_traffic() {
    let client = ResilientClient::with_settings(fast_settings(2, 2));
    let flaky = FlakyCall::new(u32::MAX);

    for _ in 0..2 {
        let dependency = flaky.clone();
        let result = client
            .execute("ewg_lookup", move || {
                let dependency = dependency.clone();
                async move { dependency.invoke().await }
            })
            .await;
        assert!(matches!(result, Err(ResilienceError::RetryExhausted { .. })));
    }

    let reached_before_open = flaky.calls();
    assert_eq!(reached_before_open, 4);

    let dependency = flaky.clone();
    let rejected = client
        .execute("ewg_lookup", move || {
            let dependency = dependency.clone();
            async move { dependency.invoke().await }
        })
        .await;

    assert!(matches!(rejected, Err(ResilienceError::CircuitOpen { .. })));
    // The rejected call never reached the dependency.
    assert_eq!(flaky.calls(), reached_before_open);
}

#[tokio::test]
async fn test_breaker_open_error_names_the_operation() {
    let client = ResilientClient::with_settings(fast_settings(1, 1));

    let _ = client
        .execute("ollama_analyze", || async { Err::<(), _>("down") })
        .await;

    let rejected = client
        .execute("ollama_analyze", || async { Ok::<_, &str>(()) })
        .await;

    let err = rejected.unwrap_err();
    assert!(err.to_string().contains("ollama_analyze"));
}

#[tokio::test]
async fn test_operations_recover_independently() {
    let client = ResilientClient::with_settings(fast_settings(1, 1));

    let _ = client
        .execute("fda_lookup", || async { Err::<(), _>("down") })
        .await;
    assert_eq!(client.statistics()["fda_lookup"].state, CircuitState::Open);

    // The failing operation heals after its recovery timeout; the healthy
    // one was never affected.
    let healthy = client
        .execute("pubchem_lookup", || async { Ok::<_, &str>(1) })
        .await;
    assert!(healthy.is_ok());

    tokio::time::sleep(Duration::from_millis(80)).await;
    let healed = client
        .execute("fda_lookup", || async { Ok::<_, &str>(2) })
        .await;
    assert_eq!(healed.unwrap(), 2);
    assert_eq!(client.statistics()["fda_lookup"].state, CircuitState::Closed);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_registry_entry() {
    let client = Arc::new(ResilientClient::with_settings(fast_settings(5, 1)));

    let mut handles = Vec::new();
    for i in 0..16 {
        let client = client.clone();
        // Four distinct operation names, four callers each.
        let name = format!("operation_{}", i % 4);
        handles.push(tokio::spawn(async move {
            client
                .execute(&name, || async { Ok::<_, &str>(()) })
                .await
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    let stats = client.statistics();
    assert_eq!(stats.len(), 4);
    for metrics in stats.values() {
        assert_eq!(metrics.state, CircuitState::Closed);
        assert_eq!(metrics.failure_count, 0);
    }
}

#[tokio::test]
async fn test_statistics_snapshot_is_json_object() {
    let client = ResilientClient::with_settings(fast_settings(5, 1));
    let _ = client
        .execute("fda_lookup", || async { Ok::<_, &str>(()) })
        .await;
    let _ = client
        .execute("pubchem_lookup", || async { Err::<(), _>("down") })
        .await;

    let json = serde_json::to_value(client.statistics()).expect("serializable");
    assert_eq!(json["fda_lookup"]["state"], "closed");
    assert_eq!(json["pubchem_lookup"]["failure_count"], 1);
    assert!(json.get("never_used").is_none());
}
