//! Configuration loading from files and the environment

use safecall::{BackoffStrategy, ResilienceError, ResilienceSettings};

#[tokio::test]
async fn test_load_settings_from_yaml_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("resilience.yaml");
    tokio::fs::write(
        &path,
        r#"
default:
  failure_threshold: 4
  max_attempts: 2
operations:
  ollama_analyze:
    max_attempts: 5
    strategy: linear
    jitter: false
"#,
    )
    .await
    .expect("write config");

    let settings = ResilienceSettings::from_file(&path).await.expect("load");
    assert_eq!(settings.default.failure_threshold, 4);
    assert_eq!(settings.default.max_attempts, 2);

    let op = settings.for_operation("ollama_analyze");
    assert_eq!(op.max_attempts, 5);
    assert_eq!(op.strategy, BackoffStrategy::Linear);
    assert!(!op.jitter);
    // Fields absent from the file keep their defaults.
    assert_eq!(op.failure_threshold, 5);
}

#[tokio::test]
async fn test_missing_file_is_a_config_error() {
    let result = ResilienceSettings::from_file("/nonexistent/resilience.yaml").await;
    assert!(matches!(result, Err(ResilienceError::Config(_))));
}

#[tokio::test]
async fn test_malformed_yaml_is_a_config_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("resilience.yaml");
    tokio::fs::write(&path, "default: [not, a, mapping]")
        .await
        .expect("write config");

    let result = ResilienceSettings::from_file(&path).await;
    assert!(matches!(result, Err(ResilienceError::Config(_))));
}

#[tokio::test]
async fn test_invalid_values_rejected_at_load() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("resilience.yaml");
    tokio::fs::write(
        &path,
        r#"
default:
  max_attempts: 0
"#,
    )
    .await
    .expect("write config");

    let err = ResilienceSettings::from_file(&path).await.unwrap_err();
    assert!(err.to_string().contains("max_attempts"));
}

// One test owns every SAFECALL_* variable; splitting these across parallel
// test threads would let one phase observe another's environment.
#[test]
fn test_env_overrides_default_operation() {
    std::env::set_var("SAFECALL_MAX_ATTEMPTS", "7");
    std::env::set_var("SAFECALL_STRATEGY", "fixed");

    let settings = ResilienceSettings::from_env().expect("load from env");
    assert_eq!(settings.default.max_attempts, 7);
    assert_eq!(settings.default.strategy, BackoffStrategy::Fixed);

    std::env::set_var("SAFECALL_FAILURE_THRESHOLD", "many");
    let err = ResilienceSettings::from_env().unwrap_err();
    assert!(err.to_string().contains("SAFECALL_FAILURE_THRESHOLD"));

    std::env::remove_var("SAFECALL_MAX_ATTEMPTS");
    std::env::remove_var("SAFECALL_STRATEGY");
    std::env::remove_var("SAFECALL_FAILURE_THRESHOLD");
}
