// strata/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Framework-level failures raised by the pipeline itself.
///
/// Base operations report failures in their own error type `Err`. Decorators never
/// wrap or enrich those; the only place the pipeline has to invent an error is when
/// it aborts on its own (e.g. a retry wait cut short by cancellation). Every
/// operation error type therefore has to be `From<StrataError>`.
#[derive(Debug, Error)]
pub enum StrataError {
  #[error("Operation cancelled while waiting to retry")]
  Cancelled,

  #[error("Configuration error for '{key}': {message}")]
  Configuration { key: String, message: String },

  #[error("Error in base operation or collaborator. Source: {source}")]
  OperationFailed {
    #[source]
    source: AnyhowError,
  },
}

impl From<AnyhowError> for StrataError {
  fn from(err: AnyhowError) -> Self {
    // Avoid OperationFailed(OperationFailed(..)) style nesting on round trips.
    match err.downcast::<StrataError>() {
      Ok(strata_err) => strata_err,
      Err(source) => StrataError::OperationFailed { source },
    }
  }
}

pub type StrataResult<T, E = StrataError> = std::result::Result<T, E>;
