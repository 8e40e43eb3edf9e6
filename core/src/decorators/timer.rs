// strata/src/decorators/timer.rs

use crate::core::envelope::{MetaValue, DURATION};
use crate::core::{Decorator, Operation, RequestContext};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Receives the elapsed time of every timed call.
pub type TimerObserver = Arc<dyn Fn(Duration) + Send + Sync + 'static>;

/// Measures the whole downstream chain and records it under `duration`.
///
/// The measurement is written on both the success and the failure path.
pub fn timer<In, Out, Err>() -> Decorator<In, Out, Err>
where
  In: Send + 'static,
  Out: Send + 'static,
  Err: Send + 'static,
{
  build(None)
}

/// Like [`timer`], and additionally hands each measurement to `observer`.
pub fn timer_reporting<In, Out, Err>(observer: impl Fn(Duration) + Send + Sync + 'static) -> Decorator<In, Out, Err>
where
  In: Send + 'static,
  Out: Send + 'static,
  Err: Send + 'static,
{
  build(Some(Arc::new(observer)))
}

pub(crate) fn build<In, Out, Err>(observer: Option<TimerObserver>) -> Decorator<In, Out, Err>
where
  In: Send + 'static,
  Out: Send + 'static,
  Err: Send + 'static,
{
  Decorator::new("timer", move |next: Operation<In, Out, Err>| {
    let observer = observer.clone();
    Operation::from_boxed(move |ctx: RequestContext, input: In| {
      let next = next.clone();
      let observer = observer.clone();
      Box::pin(async move {
        let start = Instant::now();
        let mut envelope = next.call(ctx, input).await;
        let elapsed = start.elapsed();
        envelope.insert_meta(DURATION, MetaValue::Duration(elapsed));
        if let Some(observe) = observer {
          observe(elapsed);
        }
        envelope
      })
    })
  })
}
