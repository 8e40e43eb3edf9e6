// strata/src/core/context.rs

//! The per-call `RequestContext` and the closed vocabulary of concerns it can toggle.
//!
//! A context is an immutable value. Every `disable_*` / `enable_*` call returns a
//! derived context and leaves the receiver untouched, so one caller can switch off
//! masking for a single call while other calls on the same composed operation keep it.

use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const DEFAULT_OPERATION_LABEL: &str = "operation";

/// A cross-cutting behavior that a gated decorator can be switched on or off for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concern {
  Logging,
  Timing,
  OutputResult,
  Masking,
  Tracing,
  Retry,
}

impl Concern {
  pub const ALL: [Concern; 6] = [
    Concern::Logging,
    Concern::Timing,
    Concern::OutputResult,
    Concern::Masking,
    Concern::Tracing,
    Concern::Retry,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Concern::Logging => "logging",
      Concern::Timing => "timing",
      Concern::OutputResult => "output_result",
      Concern::Masking => "masking",
      Concern::Tracing => "tracing",
      Concern::Retry => "retry",
    }
  }
}

impl fmt::Display for Concern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Per-call overrides, one slot per concern.
///
/// `None` means "not overridden": the gate's default applies, which is enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
  logging: Option<bool>,
  timing: Option<bool>,
  output_result: Option<bool>,
  masking: Option<bool>,
  tracing: Option<bool>,
  retry: Option<bool>,
}

impl FeatureFlags {
  fn slot(&mut self, concern: Concern) -> &mut Option<bool> {
    match concern {
      Concern::Logging => &mut self.logging,
      Concern::Timing => &mut self.timing,
      Concern::OutputResult => &mut self.output_result,
      Concern::Masking => &mut self.masking,
      Concern::Tracing => &mut self.tracing,
      Concern::Retry => &mut self.retry,
    }
  }

  /// Returns the explicit override for `concern`, if any.
  pub fn get(&self, concern: Concern) -> Option<bool> {
    match concern {
      Concern::Logging => self.logging,
      Concern::Timing => self.timing,
      Concern::OutputResult => self.output_result,
      Concern::Masking => self.masking,
      Concern::Tracing => self.tracing,
      Concern::Retry => self.retry,
    }
  }

  pub fn set(&mut self, concern: Concern, enabled: bool) {
    *self.slot(concern) = Some(enabled);
  }

  pub fn is_disabled(&self, concern: Concern) -> bool {
    self.get(concern) == Some(false)
  }
}

/// Request-scoped state handed to every operation in a chain.
///
/// Cloning is cheap: the flags are `Copy`, the label is shared and the
/// cancellation token is reference counted. Derived contexts share the
/// cancellation token of the context they were derived from.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
  flags: FeatureFlags,
  cancellation: CancellationToken,
  operation: Option<Arc<str>>,
}

impl RequestContext {
  pub fn new() -> Self {
    Self::default()
  }

  /// Ties this context to an externally owned cancellation token.
  pub fn with_cancellation(&self, token: CancellationToken) -> Self {
    let mut next = self.clone();
    next.cancellation = token;
    next
  }

  /// Labels the call; used by the logging and tracing decorators.
  pub fn with_operation(&self, label: impl Into<Arc<str>>) -> Self {
    let mut next = self.clone();
    next.operation = Some(label.into());
    next
  }

  pub fn operation(&self) -> &str {
    self.operation.as_deref().unwrap_or(DEFAULT_OPERATION_LABEL)
  }

  pub fn cancellation_token(&self) -> &CancellationToken {
    &self.cancellation
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancellation.is_cancelled()
  }

  pub fn flags(&self) -> FeatureFlags {
    self.flags
  }

  pub fn is_disabled(&self, concern: Concern) -> bool {
    self.flags.is_disabled(concern)
  }

  pub fn disable(&self, concern: Concern) -> Self {
    self.toggled(concern, false)
  }

  pub fn enable(&self, concern: Concern) -> Self {
    self.toggled(concern, true)
  }

  fn toggled(&self, concern: Concern, enabled: bool) -> Self {
    let mut next = self.clone();
    next.flags.set(concern, enabled);
    next
  }

  pub fn disable_logging(&self) -> Self {
    self.disable(Concern::Logging)
  }

  pub fn disable_timing(&self) -> Self {
    self.disable(Concern::Timing)
  }

  pub fn disable_output_result(&self) -> Self {
    self.disable(Concern::OutputResult)
  }

  pub fn disable_masking(&self) -> Self {
    self.disable(Concern::Masking)
  }

  pub fn disable_tracing(&self) -> Self {
    self.disable(Concern::Tracing)
  }

  pub fn disable_retry(&self) -> Self {
    self.disable(Concern::Retry)
  }

  pub fn enable_logging(&self) -> Self {
    self.enable(Concern::Logging)
  }

  pub fn enable_timing(&self) -> Self {
    self.enable(Concern::Timing)
  }

  pub fn enable_output_result(&self) -> Self {
    self.enable(Concern::OutputResult)
  }

  pub fn enable_masking(&self) -> Self {
    self.enable(Concern::Masking)
  }

  pub fn enable_tracing(&self) -> Self {
    self.enable(Concern::Tracing)
  }

  pub fn enable_retry(&self) -> Self {
    self.enable(Concern::Retry)
  }

  /// Disables every concern by chaining the individual toggles.
  pub fn disable_all(&self) -> Self {
    Concern::ALL.iter().fold(self.clone(), |ctx, concern| ctx.disable(*concern))
  }

  pub fn enable_all(&self) -> Self {
    Concern::ALL.iter().fold(self.clone(), |ctx, concern| ctx.enable(*concern))
  }
}
