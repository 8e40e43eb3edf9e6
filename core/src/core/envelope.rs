// strata/src/core/envelope.rs

//! The result envelope returned by every operation, and the metadata vocabulary
//! decorators write into it.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Elapsed time measured by the timer decorator.
pub const DURATION: &str = "duration";
/// Number of retries actually performed by the retry decorator.
pub const RETRY_COUNT: &str = "retry_count";
/// Present (and `true`) only when the masking decorator transformed the output.
pub const MASKED: &str = "masked";

/// A diagnostic value recorded by a decorator.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
  Duration(Duration),
  Count(u32),
  Flag(bool),
  Text(String),
}

impl MetaValue {
  pub fn as_duration(&self) -> Option<Duration> {
    match self {
      MetaValue::Duration(d) => Some(*d),
      _ => None,
    }
  }

  pub fn as_count(&self) -> Option<u32> {
    match self {
      MetaValue::Count(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_flag(&self) -> Option<bool> {
    match self {
      MetaValue::Flag(b) => Some(*b),
      _ => None,
    }
  }
}

impl fmt::Display for MetaValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MetaValue::Duration(d) => write!(f, "{:?}", d),
      MetaValue::Count(n) => write!(f, "{}", n),
      MetaValue::Flag(b) => write!(f, "{}", b),
      MetaValue::Text(s) => f.write_str(s),
    }
  }
}

pub type Metadata = HashMap<String, MetaValue>;

/// What an operation hands back: its outcome plus whatever metadata the
/// decorators around it accumulated.
///
/// Metadata survives failure, so a failed call still reports e.g. how long it
/// took and how many retries were spent.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T, E> {
  pub result: Result<T, E>,
  pub metadata: Metadata,
}

impl<T, E> Envelope<T, E> {
  pub fn ok(data: T) -> Self {
    Self::from_result(Ok(data))
  }

  pub fn err(error: E) -> Self {
    Self::from_result(Err(error))
  }

  pub fn from_result(result: Result<T, E>) -> Self {
    Self {
      result,
      metadata: Metadata::new(),
    }
  }

  pub fn with_meta(mut self, key: impl Into<String>, value: MetaValue) -> Self {
    self.insert_meta(key, value);
    self
  }

  pub fn insert_meta(&mut self, key: impl Into<String>, value: MetaValue) {
    self.metadata.insert(key.into(), value);
  }

  pub fn meta(&self, key: &str) -> Option<&MetaValue> {
    self.metadata.get(key)
  }

  pub fn is_ok(&self) -> bool {
    self.result.is_ok()
  }

  pub fn is_err(&self) -> bool {
    self.result.is_err()
  }

  pub fn data(&self) -> Option<&T> {
    self.result.as_ref().ok()
  }

  pub fn error(&self) -> Option<&E> {
    self.result.as_ref().err()
  }

  pub fn duration(&self) -> Option<Duration> {
    self.meta(DURATION).and_then(MetaValue::as_duration)
  }

  pub fn retry_count(&self) -> Option<u32> {
    self.meta(RETRY_COUNT).and_then(MetaValue::as_count)
  }

  pub fn is_masked(&self) -> bool {
    self.meta(MASKED).and_then(MetaValue::as_flag).unwrap_or(false)
  }

  pub fn into_result(self) -> Result<T, E> {
    self.result
  }

  pub fn into_parts(self) -> (Result<T, E>, Metadata) {
    (self.result, self.metadata)
  }
}
