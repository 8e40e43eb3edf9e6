// strata/src/decorators/output.rs

use crate::core::{Decorator, Metadata, Operation, RequestContext};
use std::sync::Arc;

/// Observes every completed call: the output (if any), the metadata collected
/// so far, and the error (if any).
pub type OutputCallback<Out, Err> = Arc<dyn Fn(Option<&Out>, &Metadata, Option<&Err>) + Send + Sync + 'static>;

/// Invokes `callback` once per call after the downstream chain completes.
/// Neither the data nor the error is altered.
pub fn output_result<In, Out, Err>(
  callback: impl Fn(Option<&Out>, &Metadata, Option<&Err>) + Send + Sync + 'static,
) -> Decorator<In, Out, Err>
where
  In: Send + 'static,
  Out: Send + 'static,
  Err: Send + 'static,
{
  let callback: OutputCallback<Out, Err> = Arc::new(callback);
  Decorator::new("output_result", move |next: Operation<In, Out, Err>| {
    let callback = Arc::clone(&callback);
    Operation::from_boxed(move |ctx: RequestContext, input: In| {
      let next = next.clone();
      let callback = Arc::clone(&callback);
      Box::pin(async move {
        let envelope = next.call(ctx, input).await;
        callback(envelope.data(), &envelope.metadata, envelope.error());
        envelope
      })
    })
  })
}
