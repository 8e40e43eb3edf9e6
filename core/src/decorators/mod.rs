// strata/src/decorators/mod.rs

//! The concrete decorators shipped with Strata.
//!
//! None of these gate themselves. Attach a gate with `.gated(Concern::…)` (or
//! let `PipelineConfig` do it) to make a decorator switchable per call.

pub mod logging;
pub mod mask;
pub mod output;
pub mod retry;
pub mod span;
pub mod timer;

pub use logging::{logging, tracing_logger, Logger};
pub use mask::{mask_output, MaskFn};
pub use output::{output_result, OutputCallback};
pub use retry::{retry, RetryPolicy};
pub use span::tracing_span;
pub use timer::{timer, timer_reporting, TimerObserver};
