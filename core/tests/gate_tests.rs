// tests/gate_tests.rs
mod common;

use common::*;
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use strata::{
  chain, gate, mask_output, output_result, retry, timer, Concern, Decorator, Envelope, Operation, RequestContext,
};

#[tokio::test]
#[serial]
async fn test_masking_disabled_for_one_call_only() {
  setup_tracing();
  let base = flaky_base(0, names(&["Erin"]));
  let op = chain(base.op.clone(), vec![mask_output(mask_names).gated(Concern::Masking)]);

  let ctx = RequestContext::new();
  let (unmasked, masked) = tokio::join!(
    op.call(ctx.disable_masking(), "erin".to_string()),
    op.call(ctx.clone(), "erin".to_string())
  );

  assert_eq!(unmasked.result, Ok(names(&["Erin"])));
  assert!(!unmasked.is_masked());
  assert_eq!(masked.result, Ok(names(&["E****"])));
  assert!(masked.is_masked());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn test_composed_operation_is_shared_across_tasks() {
  setup_tracing();
  let base = flaky_base(0, names(&["Finn"]));
  let op = chain(
    base.op.clone(),
    vec![timer().gated(Concern::Timing), mask_output(mask_names).gated(Concern::Masking)],
  );

  let mut handles = Vec::new();
  for i in 0..16 {
    let op = op.clone();
    handles.push(tokio::spawn(async move {
      let ctx = if i % 2 == 0 {
        RequestContext::new()
      } else {
        RequestContext::new().disable_masking()
      };
      (i, op.call(ctx, "finn".to_string()).await)
    }));
  }

  for handle in handles {
    let (i, env) = handle.await.unwrap();
    assert!(env.duration().is_some());
    if i % 2 == 0 {
      assert_eq!(env.result, Ok(names(&["F****"])));
    } else {
      assert_eq!(env.result, Ok(names(&["Finn"])));
    }
  }
  assert_eq!(base.attempts.load(Ordering::SeqCst), 16);
}

#[tokio::test]
#[serial]
async fn test_disabled_decorator_has_no_side_effects() {
  setup_tracing();
  let output = OutputRecorder::default();
  let base = always_failing_base();
  let op = chain(
    base.op.clone(),
    vec![
      output_result(output.callback()).gated(Concern::OutputResult),
      retry(3, Duration::ZERO).gated(Concern::Retry),
    ],
  );

  let env = op
    .call(RequestContext::new().disable_output_result().disable_retry(), "q".to_string())
    .await;

  assert!(env.is_err());
  assert!(env.retry_count().is_none());
  assert!(output.snapshot().is_empty());
  assert_eq!(base.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
#[serial]
async fn test_disabling_one_concern_keeps_downstream_running() {
  setup_tracing();
  let base = flaky_base(1, names(&["Gus"]));
  let op = chain(
    base.op.clone(),
    vec![
      timer().gated(Concern::Timing),
      mask_output(mask_names).gated(Concern::Masking),
      retry(2, Duration::ZERO).gated(Concern::Retry),
    ],
  );

  let env = op.call(RequestContext::new().disable_timing(), "gus".to_string()).await;

  assert!(env.duration().is_none());
  assert!(env.is_masked());
  assert_eq!(env.retry_count(), Some(1));
  assert_eq!(env.result, Ok(names(&["G****"])));
}

#[tokio::test]
#[serial]
async fn test_enable_after_disable_restores_decorator() {
  setup_tracing();
  let base = flaky_base(0, names(&["Hana"]));
  let op = chain(base.op.clone(), vec![mask_output(mask_names).gated(Concern::Masking)]);

  let ctx = RequestContext::new().disable_all().enable_masking();
  let env = op.call(ctx, "hana".to_string()).await;
  assert!(env.is_masked());
}

#[tokio::test]
#[serial]
async fn test_ungated_decorator_ignores_flags() {
  setup_tracing();
  let base = flaky_base(0, names(&["Ivo"]));
  let op = chain(base.op.clone(), vec![timer()]);

  let env = op.call(RequestContext::new().disable_all(), "ivo".to_string()).await;
  assert!(env.duration().is_some());
}

#[tokio::test]
#[serial]
async fn test_custom_predicate_gate() {
  setup_tracing();
  let hits = Arc::new(AtomicUsize::new(0));
  let counter = hits.clone();
  let counting: Decorator<u32, u32, TestError> = Decorator::new("counting", move |next: Operation<u32, u32, TestError>| {
    let counter = counter.clone();
    Operation::new(move |ctx, n| {
      counter.fetch_add(1, Ordering::SeqCst);
      next.call(ctx, n)
    })
  });

  // Bypass the decorator for calls labelled "health_check".
  let gated = gate(counting, Arc::new(|ctx: &RequestContext| ctx.operation() == "health_check"));
  let op = chain(Operation::new(|_ctx, n: u32| async move { Envelope::ok(n) }), vec![gated]);

  op.call(RequestContext::new().with_operation("health_check"), 1).await;
  op.call(RequestContext::new().with_operation("find_by_rating"), 2).await;
  op.call(RequestContext::new(), 3).await;

  assert_eq!(hits.load(Ordering::SeqCst), 2);
}
