// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use parking_lot::Mutex;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use strata::{Envelope, Metadata, Operation, RequestContext, StrataError};
use tracing::Level;

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("{0}")]
  Base(String),

  #[error("Strata framework error: {0}")]
  Strata(String), // Stored as String for Eq comparison
}

impl From<StrataError> for TestError {
  fn from(e: StrataError) -> Self {
    TestError::Strata(e.to_string())
  }
}

pub type Names = Vec<String>;

pub fn names(items: &[&str]) -> Names {
  items.iter().map(|s| s.to_string()).collect()
}

/// Replaces every name with its first letter followed by `****`.
pub fn mask_names(items: Names) -> Names {
  items
    .into_iter()
    .map(|n| match n.chars().next() {
      Some(first) => format!("{}****", first),
      None => n,
    })
    .collect()
}

// --- Base operations ---

/// A base operation that fails `failures` times (with "not found") and then
/// returns `data`. Counts every attempt.
pub struct FlakyBase {
  pub attempts: Arc<AtomicUsize>,
  pub op: Operation<String, Names, TestError>,
}

pub fn flaky_base(failures: usize, data: Names) -> FlakyBase {
  let attempts = Arc::new(AtomicUsize::new(0));
  let counter = attempts.clone();
  let op = Operation::new(move |_ctx: RequestContext, _query: String| {
    let n = counter.fetch_add(1, Ordering::SeqCst);
    let data = data.clone();
    async move {
      if n < failures {
        Envelope::err(TestError::Base("not found".to_string()))
      } else {
        Envelope::ok(data)
      }
    }
  });
  FlakyBase { attempts, op }
}

pub fn always_failing_base() -> FlakyBase {
  flaky_base(usize::MAX, Names::new())
}

// --- Recording collaborators ---

#[derive(Clone, Default)]
pub struct LogRecorder {
  pub lines: Arc<Mutex<Vec<String>>>,
}

impl LogRecorder {
  pub fn logger(&self) -> impl Fn(&RequestContext, &str) + Send + Sync + 'static {
    let lines = self.lines.clone();
    move |_ctx: &RequestContext, msg: &str| lines.lock().push(msg.to_string())
  }

  pub fn snapshot(&self) -> Vec<String> {
    self.lines.lock().clone()
  }

  pub fn count_starting_with(&self, prefix: &str) -> usize {
    self.lines.lock().iter().filter(|l| l.starts_with(prefix)).count()
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputCall {
  pub data: Option<Names>,
  pub metadata: Metadata,
  pub error: Option<TestError>,
}

#[derive(Clone, Default)]
pub struct OutputRecorder {
  pub calls: Arc<Mutex<Vec<OutputCall>>>,
}

impl OutputRecorder {
  pub fn callback(&self) -> impl Fn(Option<&Names>, &Metadata, Option<&TestError>) + Send + Sync + 'static {
    let calls = self.calls.clone();
    move |data: Option<&Names>, metadata: &Metadata, error: Option<&TestError>| {
      calls.lock().push(OutputCall {
        data: data.cloned(),
        metadata: metadata.clone(),
        error: error.cloned(),
      })
    }
  }

  pub fn snapshot(&self) -> Vec<OutputCall> {
    self.calls.lock().clone()
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
