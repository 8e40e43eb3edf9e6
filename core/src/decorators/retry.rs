// strata/src/decorators/retry.rs

use crate::core::envelope::{MetaValue, RETRY_COUNT};
use crate::core::{Decorator, Operation, RequestContext};
use crate::error::StrataError;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tracing::{event, Level};

type RetryPredicate<Err> = Arc<dyn Fn(&Err) -> bool + Send + Sync + 'static>;

/// Fixed retry policy: at most `max_retries` extra attempts, a constant `delay`
/// between them.
///
/// By default every error is retried. `retry_if` narrows that to the errors the
/// predicate accepts; anything else is returned after the attempt that produced it.
pub struct RetryPolicy<Err> {
  max_retries: u32,
  delay: Duration,
  retry_if: Option<RetryPredicate<Err>>,
}

impl<Err> Clone for RetryPolicy<Err> {
  fn clone(&self) -> Self {
    Self {
      max_retries: self.max_retries,
      delay: self.delay,
      retry_if: self.retry_if.clone(),
    }
  }
}

impl<Err> std::fmt::Debug for RetryPolicy<Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RetryPolicy")
      .field("max_retries", &self.max_retries)
      .field("delay", &self.delay)
      .field("retry_if_present", &self.retry_if.is_some())
      .finish()
  }
}

impl<Err> RetryPolicy<Err>
where
  Err: std::error::Error + From<StrataError> + Send + Sync + 'static,
{
  pub fn new(max_retries: u32, delay: Duration) -> Self {
    Self {
      max_retries,
      delay,
      retry_if: None,
    }
  }

  pub fn retry_if(mut self, predicate: impl Fn(&Err) -> bool + Send + Sync + 'static) -> Self {
    self.retry_if = Some(Arc::new(predicate));
    self
  }

  pub fn max_retries(&self) -> u32 {
    self.max_retries
  }

  pub fn delay(&self) -> Duration {
    self.delay
  }

  fn is_retryable(&self, err: &Err) -> bool {
    self.retry_if.as_ref().map_or(true, |accept| accept(err))
  }

  pub fn into_decorator<In, Out>(self) -> Decorator<In, Out, Err>
  where
    In: Clone + Send + 'static,
    Out: Send + 'static,
  {
    let policy = Arc::new(self);
    Decorator::new("retry", move |next: Operation<In, Out, Err>| {
      let policy = Arc::clone(&policy);
      Operation::from_boxed(move |ctx: RequestContext, input: In| {
        let next = next.clone();
        let policy = Arc::clone(&policy);
        Box::pin(async move {
          let mut retries: u32 = 0;
          loop {
            let mut envelope = next.call(ctx.clone(), input.clone()).await;

            let should_retry = match &envelope.result {
              Ok(_) => false,
              Err(e) => retries < policy.max_retries && policy.is_retryable(e),
            };

            if !should_retry {
              if let Err(e) = &envelope.result {
                if retries > 0 {
                  event!(Level::ERROR, retries, error = %e, "Giving up after retries.");
                }
              }
              envelope.insert_meta(RETRY_COUNT, MetaValue::Count(retries));
              return envelope;
            }

            if let Err(e) = &envelope.result {
              log_retry(retries + 1, policy.delay, e);
            }

            if let Err(cancelled) = wait_before_retry(&ctx, policy.delay).await {
              event!(Level::WARN, retries, "Retry wait aborted by cancellation.");
              envelope.result = Err(Err::from(cancelled));
              envelope.insert_meta(RETRY_COUNT, MetaValue::Count(retries));
              return envelope;
            }
            retries += 1;
          }
        })
      })
    })
  }
}

fn log_retry(attempt: u32, delay: Duration, err: &dyn Display) {
  event!(Level::WARN, attempt, delay = ?delay, error = %err, "Attempt failed, retrying.");
}

/// Sleeps for `delay` unless the request is (or becomes) cancelled first.
async fn wait_before_retry(ctx: &RequestContext, delay: Duration) -> Result<(), StrataError> {
  let token = ctx.cancellation_token();
  if token.is_cancelled() {
    return Err(StrataError::Cancelled);
  }
  if delay.is_zero() {
    return Ok(());
  }
  tokio::select! {
    _ = token.cancelled() => Err(StrataError::Cancelled),
    _ = tokio::time::sleep(delay) => Ok(()),
  }
}

/// Retries the downstream chain on any error, at most `max_retries` times,
/// waiting `delay` between attempts. Records the retries performed under
/// `retry_count` and returns the last attempt's envelope.
pub fn retry<In, Out, Err>(max_retries: u32, delay: Duration) -> Decorator<In, Out, Err>
where
  In: Clone + Send + 'static,
  Out: Send + 'static,
  Err: std::error::Error + From<StrataError> + Send + Sync + 'static,
{
  RetryPolicy::new(max_retries, delay).into_decorator()
}
