// strata/src/core/decorator.rs

//! Defines `Decorator<In, Out, Err>` (an `Operation -> Operation` transformation)
//! and the `gate` combinator that makes a decorator switchable per call.

use crate::core::context::{Concern, RequestContext};
use crate::core::operation::Operation;
use std::sync::Arc;
use tracing::{event, Level};

type DecoratorFn<In, Out, Err> = dyn Fn(Operation<In, Out, Err>) -> Operation<In, Out, Err> + Send + Sync;

/// Predicate deciding, per call, whether a gated decorator is bypassed.
pub type DisabledPredicate = Arc<dyn Fn(&RequestContext) -> bool + Send + Sync + 'static>;

/// Wraps the *next* operation of a chain into a new operation of the same shape.
///
/// Decorators are composed by function wrapping: `apply` runs once, when the chain
/// is built, and the operation it returns carries whatever configuration the
/// decorator captured. Nothing is looked up per call.
pub struct Decorator<In, Out, Err> {
  name: &'static str,
  wrap: Arc<DecoratorFn<In, Out, Err>>,
}

impl<In, Out, Err> Clone for Decorator<In, Out, Err> {
  fn clone(&self) -> Self {
    Self {
      name: self.name,
      wrap: Arc::clone(&self.wrap),
    }
  }
}

impl<In, Out, Err> std::fmt::Debug for Decorator<In, Out, Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Decorator").field("name", &self.name).finish()
  }
}

impl<In, Out, Err> Decorator<In, Out, Err> {
  /// The concern this decorator implements, used in diagnostics.
  pub fn name(&self) -> &'static str {
    self.name
  }
}

impl<In, Out, Err> Decorator<In, Out, Err>
where
  In: Send + 'static,
  Out: Send + 'static,
  Err: Send + 'static,
{
  pub fn new(
    name: &'static str,
    wrap: impl Fn(Operation<In, Out, Err>) -> Operation<In, Out, Err> + Send + Sync + 'static,
  ) -> Self {
    Self {
      name,
      wrap: Arc::new(wrap),
    }
  }

  pub fn apply(&self, next: Operation<In, Out, Err>) -> Operation<In, Out, Err> {
    event!(Level::DEBUG, decorator = self.name, "Applying decorator.");
    (self.wrap)(next)
  }

  /// Makes this decorator bypassable per call. See [`gate`].
  pub fn gate(self, disabled: impl Fn(&RequestContext) -> bool + Send + Sync + 'static) -> Self {
    gate(self, Arc::new(disabled))
  }

  /// Gates this decorator on the context flag for `concern`.
  pub fn gated(self, concern: Concern) -> Self {
    self.gate(move |ctx: &RequestContext| ctx.is_disabled(concern))
  }
}

/// Produces a decorator that, per call, either runs `decorator` or skips it.
///
/// `decorator(next)` is built once, at composition time. On each call the
/// predicate is evaluated against the request context: when it returns `true`
/// the call goes straight to `next`, so none of the decorator's behavior or side
/// effects happen for that call. Everything downstream of `next` still runs.
pub fn gate<In, Out, Err>(decorator: Decorator<In, Out, Err>, disabled: DisabledPredicate) -> Decorator<In, Out, Err>
where
  In: Send + 'static,
  Out: Send + 'static,
  Err: Send + 'static,
{
  let name = decorator.name;
  Decorator::new(name, move |next: Operation<In, Out, Err>| {
    let wrapped = decorator.apply(next.clone());
    let disabled = Arc::clone(&disabled);
    Operation::from_boxed(move |ctx: RequestContext, input: In| {
      if disabled(&ctx) {
        event!(Level::TRACE, decorator = name, "Decorator bypassed for this call.");
        next.call(ctx, input)
      } else {
        wrapped.call(ctx, input)
      }
    })
  })
}
