// strata/src/pipeline/config.rs

//! Declarative selection of the decorators that make up a chain.

use crate::core::{Concern, Decorator, Metadata, Operation, RequestContext};
use crate::decorators::{self, Logger, MaskFn, OutputCallback, RetryPolicy, TimerObserver};
use crate::error::{StrataError, StrataResult};
use crate::pipeline::chain::chain;
use serde::{Deserialize, Deserializer};
use std::env;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::{event, Level};

const DEFAULT_RETRY_DELAY_MS: u64 = 100;

/// Retry count and fixed delay, loadable from structured config or the environment.
///
/// Structured config and the environment give the delay in whole milliseconds
/// (`delay_ms`); `new` keeps any `Duration` as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
  pub max_retries: u32,
  #[serde(rename = "delay_ms", deserialize_with = "delay_from_millis")]
  pub delay: Duration,
}

fn delay_from_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
  u64::deserialize(deserializer).map(Duration::from_millis)
}

impl Default for RetrySettings {
  fn default() -> Self {
    Self {
      max_retries: 0,
      delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
    }
  }
}

impl RetrySettings {
  pub fn new(max_retries: u32, delay: Duration) -> Self {
    Self { max_retries, delay }
  }

  pub fn delay(&self) -> Duration {
    self.delay
  }

  /// Reads `{PREFIX}_RETRY_COUNT` and `{PREFIX}_RETRY_DELAY_MS`.
  ///
  /// Unset variables keep their defaults; set but unparsable ones are an error.
  pub fn from_env(prefix: &str) -> StrataResult<Self> {
    let mut settings = Self::default();

    let parse_var = |suffix: &str| -> StrataResult<Option<u64>> {
      let key = format!("{}_{}", prefix, suffix);
      match env::var(&key) {
        Ok(raw) => raw
          .trim()
          .parse::<u64>()
          .map(Some)
          .map_err(|e| StrataError::Configuration {
            key,
            message: format!("expected a non-negative integer, got '{}': {}", raw, e),
          }),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(StrataError::Configuration {
          key,
          message: e.to_string(),
        }),
      }
    };

    if let Some(count) = parse_var("RETRY_COUNT")? {
      settings.max_retries = u32::try_from(count).map_err(|e| StrataError::Configuration {
        key: format!("{}_RETRY_COUNT", prefix),
        message: e.to_string(),
      })?;
    }
    if let Some(delay_ms) = parse_var("RETRY_DELAY_MS")? {
      settings.delay = Duration::from_millis(delay_ms);
    }

    event!(Level::DEBUG, prefix, ?settings, "Retry settings loaded from environment.");
    Ok(settings)
  }
}

/// Which decorators a chain gets, and with which collaborators.
///
/// Every included decorator is gated on its concern flag. A collaborator that is
/// not configured leaves its decorator out of the chain entirely. Retry is
/// included only when `max_retries > 0`.
///
/// Built order, outermost first: tracing, logging, timer, output result, mask,
/// retry. Retry therefore sits right above the base operation, and logging and
/// the output callback run once per call no matter how many attempts are made.
pub struct PipelineConfig<In, Out, Err> {
  retry: RetrySettings,
  retry_if: Option<Arc<dyn Fn(&Err) -> bool + Send + Sync + 'static>>,
  timing: bool,
  timer_observer: Option<TimerObserver>,
  output: Option<OutputCallback<Out, Err>>,
  mask: Option<MaskFn<Out>>,
  logger: Option<Logger>,
  tracing: bool,
  _input: std::marker::PhantomData<fn(In)>,
}

impl<In, Out, Err> Default for PipelineConfig<In, Out, Err> {
  fn default() -> Self {
    Self {
      retry: RetrySettings::default(),
      retry_if: None,
      timing: false,
      timer_observer: None,
      output: None,
      mask: None,
      logger: None,
      tracing: false,
      _input: std::marker::PhantomData,
    }
  }
}

impl<In, Out, Err> Debug for PipelineConfig<In, Out, Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PipelineConfig")
      .field("retry", &self.retry)
      .field("retry_if_present", &self.retry_if.is_some())
      .field("timing", &self.timing)
      .field("output_present", &self.output.is_some())
      .field("mask_present", &self.mask.is_some())
      .field("logger_present", &self.logger.is_some())
      .field("tracing", &self.tracing)
      .finish()
  }
}

impl<In, Out, Err> PipelineConfig<In, Out, Err>
where
  In: Clone + Debug + Send + 'static,
  Out: Debug + Send + 'static,
  Err: std::error::Error + From<StrataError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_retry(mut self, settings: RetrySettings) -> Self {
    self.retry = settings;
    self
  }

  /// Only errors accepted by `predicate` are retried.
  pub fn with_retry_if(mut self, predicate: impl Fn(&Err) -> bool + Send + Sync + 'static) -> Self {
    self.retry_if = Some(Arc::new(predicate));
    self
  }

  /// Includes the timer, recording `duration` metadata only.
  pub fn with_timing(mut self) -> Self {
    self.timing = true;
    self
  }

  /// Includes the timer and reports every measurement to `observer`.
  pub fn with_timer(mut self, observer: impl Fn(Duration) + Send + Sync + 'static) -> Self {
    self.timing = true;
    self.timer_observer = Some(Arc::new(observer));
    self
  }

  pub fn with_output(mut self, callback: impl Fn(Option<&Out>, &Metadata, Option<&Err>) + Send + Sync + 'static) -> Self {
    self.output = Some(Arc::new(callback));
    self
  }

  pub fn with_masking(mut self, mask: impl Fn(Out) -> Out + Send + Sync + 'static) -> Self {
    self.mask = Some(Arc::new(mask));
    self
  }

  pub fn with_logger(mut self, logger: impl Fn(&RequestContext, &str) + Send + Sync + 'static) -> Self {
    self.logger = Some(Arc::new(logger));
    self
  }

  /// Includes logging through [`decorators::tracing_logger`].
  pub fn with_tracing_logger(mut self) -> Self {
    self.logger = Some(decorators::tracing_logger());
    self
  }

  pub fn with_tracing(mut self) -> Self {
    self.tracing = true;
    self
  }

  pub fn retry_settings(&self) -> RetrySettings {
    self.retry
  }

  /// The gated decorators this configuration selects, outermost first.
  pub fn decorators(&self) -> Vec<Decorator<In, Out, Err>> {
    let mut selected = Vec::new();

    if self.tracing {
      selected.push(decorators::tracing_span().gated(Concern::Tracing));
    }
    if let Some(logger) = &self.logger {
      let logger = Arc::clone(logger);
      selected.push(decorators::logging(move |ctx: &RequestContext, msg: &str| logger(ctx, msg)).gated(Concern::Logging));
    }
    if self.timing {
      selected.push(decorators::timer::build(self.timer_observer.clone()).gated(Concern::Timing));
    }
    if let Some(callback) = &self.output {
      let callback = Arc::clone(callback);
      selected.push(
        decorators::output_result(move |data: Option<&Out>, meta: &Metadata, err: Option<&Err>| callback(data, meta, err))
          .gated(Concern::OutputResult),
      );
    }
    if let Some(mask) = &self.mask {
      let mask = Arc::clone(mask);
      selected.push(decorators::mask_output(move |data: Out| mask(data)).gated(Concern::Masking));
    }
    if self.retry.max_retries > 0 {
      let mut policy = RetryPolicy::new(self.retry.max_retries, self.retry.delay());
      if let Some(predicate) = &self.retry_if {
        let predicate = Arc::clone(predicate);
        policy = policy.retry_if(move |e: &Err| predicate(e));
      }
      selected.push(policy.into_decorator().gated(Concern::Retry));
    }

    selected
  }

  /// Builds the configured chain around `base`.
  pub fn build(&self, base: Operation<In, Out, Err>) -> Operation<In, Out, Err> {
    chain(base, self.decorators())
  }
}
