// src/lib.rs

//! Strata: per-call switchable decorators for asynchronous operations.
//!
//! Strata wraps an async unit of work (an [`Operation`]) in an ordered set of
//! cross-cutting concerns:
//!  - Timing (`duration` metadata, optional observer).
//!  - Logging of input, collected metadata, and output or error.
//!  - A `tracing` span around the downstream call.
//!  - Fixed-delay retry that honors request cancellation (`retry_count` metadata).
//!  - An output callback for observation/metrics.
//!  - Masking of successful output (`masked` metadata).
//!
//! Each decorator can be gated on a [`Concern`]; a [`RequestContext`] derived with
//! e.g. `ctx.disable_masking()` then skips that decorator for a single call, as if
//! it were not in the chain.

pub mod core;
pub mod decorators;
pub mod error;
pub mod pipeline;

// --- Re-exports for the Public API ---

pub use crate::core::context::{Concern, FeatureFlags, RequestContext};
pub use crate::core::decorator::{gate, Decorator, DisabledPredicate};
pub use crate::core::envelope::{Envelope, MetaValue, Metadata, DURATION, MASKED, RETRY_COUNT};
pub use crate::core::operation::{BoxFuture, Operation};

pub use crate::decorators::{
  logging, mask_output, output_result, retry, timer, timer_reporting, tracing_logger, tracing_span, RetryPolicy,
};

pub use crate::pipeline::{chain, ChainBuilder, PipelineConfig, RetrySettings};

pub use crate::error::{StrataError, StrataResult};

// Re-exported so callers can cancel a RequestContext without naming tokio-util.
pub use tokio_util::sync::CancellationToken;

/*
    Typical use:
    1. Bind a repository method as the base: `Operation::from_fallible(|ctx, name| repo.find_by_name(ctx, name))`.
    2. Pick decorators, outermost first, either by hand
       (`ChainBuilder::new().with(logging(..).gated(Concern::Logging))...`)
       or through `PipelineConfig`.
    3. Build once at startup; keep the resulting `Operation`.
    4. Per call: `op.call(RequestContext::new().disable_masking(), input).await`.
*/
