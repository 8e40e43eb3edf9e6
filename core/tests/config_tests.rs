// tests/config_tests.rs
mod common;

use common::*;
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use strata::{PipelineConfig, RequestContext, RetrySettings, StrataError};

fn clear_env(prefix: &str) {
  std::env::remove_var(format!("{}_RETRY_COUNT", prefix));
  std::env::remove_var(format!("{}_RETRY_DELAY_MS", prefix));
}

#[tokio::test]
#[serial]
async fn test_full_config_builds_expected_chain() {
  setup_tracing();
  let log = LogRecorder::default();
  let output = OutputRecorder::default();
  let timings = Arc::new(AtomicUsize::new(0));
  let timings_seen = timings.clone();

  let config: PipelineConfig<String, Names, TestError> = PipelineConfig::new()
    .with_retry(RetrySettings::new(2, Duration::ZERO))
    .with_timer(move |_elapsed| {
      timings_seen.fetch_add(1, Ordering::SeqCst);
    })
    .with_output(output.callback())
    .with_masking(mask_names)
    .with_logger(log.logger())
    .with_tracing();

  let base = flaky_base(2, names(&["Ada"]));
  let op = config.build(base.op.clone());
  let env = op.call(RequestContext::new(), "ada".to_string()).await;

  assert_eq!(env.result, Ok(names(&["A****"])));
  assert_eq!(env.retry_count(), Some(2));
  assert!(env.is_masked());
  assert!(env.duration().is_some());
  assert_eq!(timings.load(Ordering::SeqCst), 1);
  assert_eq!(output.snapshot().len(), 1);
  assert_eq!(log.count_starting_with("[START]"), 1);
}

#[tokio::test]
#[serial]
async fn test_absent_callbacks_omit_decorators() {
  setup_tracing();
  let config: PipelineConfig<String, Names, TestError> = PipelineConfig::new().with_masking(mask_names);
  assert_eq!(config.decorators().len(), 1);

  let base = always_failing_base();
  let env = config.build(base.op.clone()).call(RequestContext::new(), "q".to_string()).await;

  // No retry, no timer configured: only the base error comes back.
  assert!(env.metadata.is_empty());
  assert_eq!(base.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
#[serial]
async fn test_retry_if_limits_retries_to_accepted_errors() {
  setup_tracing();
  let config: PipelineConfig<String, Names, TestError> = PipelineConfig::new()
    .with_retry(RetrySettings::new(3, Duration::ZERO))
    .with_retry_if(|e: &TestError| !matches!(e, TestError::Base(msg) if msg == "not found"));

  let base = always_failing_base();
  let env = config.build(base.op.clone()).call(RequestContext::new(), "q".to_string()).await;

  assert_eq!(env.retry_count(), Some(0));
  assert_eq!(base.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
#[serial]
async fn test_tracing_logger_config_runs() {
  setup_tracing();
  let config: PipelineConfig<String, Names, TestError> =
    PipelineConfig::new().with_tracing_logger().with_timing().with_tracing();

  let base = flaky_base(0, names(&["Zed"]));
  let env = config
    .build(base.op.clone())
    .call(RequestContext::new().with_operation("find_by_name"), "zed".to_string())
    .await;
  assert_eq!(env.result, Ok(names(&["Zed"])));
  assert!(env.duration().is_some());
}

#[test]
#[serial]
fn test_retry_settings_from_env() {
  clear_env("STRATA_TEST");
  std::env::set_var("STRATA_TEST_RETRY_COUNT", "4");
  std::env::set_var("STRATA_TEST_RETRY_DELAY_MS", " 250 ");

  let settings = RetrySettings::from_env("STRATA_TEST").unwrap();
  assert_eq!(settings.max_retries, 4);
  assert_eq!(settings.delay(), Duration::from_millis(250));
  clear_env("STRATA_TEST");
}

#[test]
#[serial]
fn test_retry_settings_from_env_defaults_when_unset() {
  clear_env("STRATA_UNSET");
  let settings = RetrySettings::from_env("STRATA_UNSET").unwrap();
  assert_eq!(settings, RetrySettings::default());
}

#[test]
#[serial]
fn test_retry_settings_from_env_rejects_garbage() {
  clear_env("STRATA_BAD");
  std::env::set_var("STRATA_BAD_RETRY_COUNT", "many");

  match RetrySettings::from_env("STRATA_BAD") {
    Err(StrataError::Configuration { key, message }) => {
      assert_eq!(key, "STRATA_BAD_RETRY_COUNT");
      assert!(message.contains("many"));
    }
    other => panic!("Expected configuration error, got {:?}", other),
  }
  clear_env("STRATA_BAD");
}

#[test]
fn test_retry_settings_deserialize_with_defaults() {
  let settings: RetrySettings = serde_json::from_str(r#"{ "max_retries": 2 }"#).unwrap();
  assert_eq!(settings.max_retries, 2);
  assert_eq!(settings.delay(), Duration::from_millis(100));

  let settings: RetrySettings = serde_json::from_str(r#"{ "max_retries": 1, "delay_ms": 250 }"#).unwrap();
  assert_eq!(settings, RetrySettings::new(1, Duration::from_millis(250)));
}
