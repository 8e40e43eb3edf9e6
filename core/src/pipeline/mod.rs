// strata/src/pipeline/mod.rs

//! Composition: the `chain` function, the `ChainBuilder`, and the declarative
//! `PipelineConfig` that picks decorators for a chain.

pub mod chain;
pub mod config;

pub use chain::{chain, ChainBuilder};
pub use config::{PipelineConfig, RetrySettings};
