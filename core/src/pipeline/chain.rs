// strata/src/pipeline/chain.rs

//! Ordered composition of decorators around a base operation.

use crate::core::{Decorator, Operation};
use tracing::{event, Level};

/// Composes `decorators` around `base`.
///
/// The last decorator wraps `base` first and the first decorator wraps last, so
/// `decorators[0]` is outermost: its pre-logic runs first and its post-logic runs
/// last. Placement sets scope. A retry placed innermost re-runs only `base`,
/// while one placed outermost re-runs every decorator beneath it on each attempt.
/// No ordering is enforced here.
pub fn chain<In, Out, Err>(
  base: Operation<In, Out, Err>,
  decorators: impl IntoIterator<Item = Decorator<In, Out, Err>>,
) -> Operation<In, Out, Err>
where
  In: Send + 'static,
  Out: Send + 'static,
  Err: Send + 'static,
{
  let decorators: Vec<_> = decorators.into_iter().collect();
  event!(
    Level::DEBUG,
    decorators = ?decorators.iter().map(Decorator::name).collect::<Vec<_>>(),
    "Building operation chain."
  );
  decorators.iter().rev().fold(base, |next, decorator| decorator.apply(next))
}

/// Accumulates decorators, outermost first, and materializes them once.
///
/// `build` consumes the builder. A different chain needs a new builder.
pub struct ChainBuilder<In, Out, Err> {
  decorators: Vec<Decorator<In, Out, Err>>,
}

impl<In, Out, Err> Default for ChainBuilder<In, Out, Err> {
  fn default() -> Self {
    Self { decorators: Vec::new() }
  }
}

impl<In, Out, Err> std::fmt::Debug for ChainBuilder<In, Out, Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ChainBuilder")
      .field("decorators", &self.decorators.iter().map(|d| d.name()).collect::<Vec<_>>())
      .finish()
  }
}

impl<In, Out, Err> ChainBuilder<In, Out, Err>
where
  In: Send + 'static,
  Out: Send + 'static,
  Err: Send + 'static,
{
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends `decorator` inside everything added so far.
  pub fn add(&mut self, decorator: Decorator<In, Out, Err>) -> &mut Self {
    self.decorators.push(decorator);
    self
  }

  pub fn with(mut self, decorator: Decorator<In, Out, Err>) -> Self {
    self.decorators.push(decorator);
    self
  }

  pub fn len(&self) -> usize {
    self.decorators.len()
  }

  pub fn is_empty(&self) -> bool {
    self.decorators.is_empty()
  }

  /// Decorator names, outermost first.
  pub fn concerns(&self) -> Vec<&'static str> {
    self.decorators.iter().map(|d| d.name()).collect()
  }

  pub fn build(self, base: Operation<In, Out, Err>) -> Operation<In, Out, Err> {
    chain(base, self.decorators)
  }
}

impl<In, Out, Err> Extend<Decorator<In, Out, Err>> for ChainBuilder<In, Out, Err> {
  fn extend<I: IntoIterator<Item = Decorator<In, Out, Err>>>(&mut self, iter: I) {
    self.decorators.extend(iter);
  }
}
