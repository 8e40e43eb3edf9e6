// strata/src/decorators/span.rs

use crate::core::{Decorator, Operation, RequestContext};
use tracing::Instrument;

/// Runs the downstream chain inside a `tracing` span named after the
/// operation label. Writes no metadata and never touches the result.
///
/// This is the hook point for richer tracing; exporting spans is left to
/// whatever subscriber the host installs.
pub fn tracing_span<In, Out, Err>() -> Decorator<In, Out, Err>
where
  In: Send + 'static,
  Out: Send + 'static,
  Err: Send + 'static,
{
  Decorator::new("tracing", move |next: Operation<In, Out, Err>| {
    Operation::from_boxed(move |ctx: RequestContext, input: In| {
      let span = tracing::info_span!("strata.operation", operation = %ctx.operation());
      Box::pin(next.call(ctx, input).instrument(span))
    })
  })
}
