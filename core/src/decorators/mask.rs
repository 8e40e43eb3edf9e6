// strata/src/decorators/mask.rs

use crate::core::envelope::{MetaValue, MASKED};
use crate::core::{Decorator, Envelope, Operation, RequestContext};
use std::sync::Arc;

pub type MaskFn<Out> = Arc<dyn Fn(Out) -> Out + Send + Sync + 'static>;

/// Transforms successful output through `mask` and marks the envelope `masked`.
/// Failures are passed through unmasked and unmarked.
pub fn mask_output<In, Out, Err>(mask: impl Fn(Out) -> Out + Send + Sync + 'static) -> Decorator<In, Out, Err>
where
  In: Send + 'static,
  Out: Send + 'static,
  Err: Send + 'static,
{
  let mask: MaskFn<Out> = Arc::new(mask);
  Decorator::new("mask_output", move |next: Operation<In, Out, Err>| {
    let mask = Arc::clone(&mask);
    Operation::from_boxed(move |ctx: RequestContext, input: In| {
      let next = next.clone();
      let mask = Arc::clone(&mask);
      Box::pin(async move {
        let Envelope { result, mut metadata } = next.call(ctx, input).await;
        let result = match result {
          Ok(data) => {
            metadata.insert(MASKED.to_string(), MetaValue::Flag(true));
            Ok(mask(data))
          }
          Err(e) => Err(e),
        };
        Envelope { result, metadata }
      })
    })
  })
}
