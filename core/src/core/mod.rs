pub mod context;
pub mod decorator;
pub mod envelope;
pub mod operation;

// Re-export key types for easier access from other modules (and lib.rs)
pub use context::{Concern, FeatureFlags, RequestContext};
pub use decorator::{gate, Decorator, DisabledPredicate};
pub use envelope::{Envelope, MetaValue, Metadata};
pub use operation::{BoxFuture, Operation};
