// strata/src/core/operation.rs

//! Defines `Operation<In, Out, Err>`, the unit of work every decorator wraps.

use crate::core::context::RequestContext;
use crate::core::envelope::Envelope;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type OperationFn<In, Out, Err> =
  dyn Fn(RequestContext, In) -> BoxFuture<'static, Envelope<Out, Err>> + Send + Sync;

/// An asynchronous unit of work: `(context, input) -> Envelope<Out, Err>`.
///
/// An `Operation` is a shared function value. Cloning it clones an `Arc`, and a
/// single instance may be called any number of times, concurrently, from many
/// tasks. It holds no per-call state; the context and input are owned by the call.
pub struct Operation<In, Out, Err> {
  inner: Arc<OperationFn<In, Out, Err>>,
}

impl<In, Out, Err> Clone for Operation<In, Out, Err> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<In, Out, Err> std::fmt::Debug for Operation<In, Out, Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Operation")
      .field("input_type", &std::any::type_name::<In>())
      .field("output_type", &std::any::type_name::<Out>())
      .field("error_type", &std::any::type_name::<Err>())
      .finish()
  }
}

impl<In, Out, Err> Operation<In, Out, Err>
where
  In: Send + 'static,
  Out: Send + 'static,
  Err: Send + 'static,
{
  /// Creates an operation from an async closure producing a full envelope.
  pub fn new<F, Fut>(f: F) -> Self
  where
    F: Fn(RequestContext, In) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Envelope<Out, Err>> + Send + 'static,
  {
    Self::from_boxed(move |ctx: RequestContext, input: In| -> BoxFuture<'static, Envelope<Out, Err>> {
      Box::pin(f(ctx, input))
    })
  }

  /// Binds a plain fallible async function (typically a repository method) as
  /// an operation with empty metadata.
  pub fn from_fallible<F, Fut, E>(f: F) -> Self
  where
    F: Fn(RequestContext, In) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Out, E>> + Send + 'static,
    E: Into<Err>,
  {
    Self::new(move |ctx, input| {
      let fut = f(ctx, input);
      async move { Envelope::from_result(fut.await.map_err(Into::into)) }
    })
  }

  /// Used by decorators whose closures already produce boxed futures.
  pub(crate) fn from_boxed(
    f: impl Fn(RequestContext, In) -> BoxFuture<'static, Envelope<Out, Err>> + Send + Sync + 'static,
  ) -> Self {
    Self { inner: Arc::new(f) }
  }

  /// Invokes the operation.
  pub fn call(&self, ctx: RequestContext, input: In) -> BoxFuture<'static, Envelope<Out, Err>> {
    (self.inner)(ctx, input)
  }
}
