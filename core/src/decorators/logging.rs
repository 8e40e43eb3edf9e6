// strata/src/decorators/logging.rs

use crate::core::{Decorator, Operation, RequestContext};
use std::fmt::{Debug, Display};
use std::sync::Arc;
use tracing::{event, Level};

/// A logging collaborator: receives the call's context and one formatted line.
pub type Logger = Arc<dyn Fn(&RequestContext, &str) + Send + Sync + 'static>;

/// The default logger, forwarding each line to `tracing` at INFO.
pub fn tracing_logger() -> Logger {
  Arc::new(|ctx: &RequestContext, msg: &str| {
    event!(target: "strata::logging", Level::INFO, operation = ctx.operation(), "{}", msg);
  })
}

/// Logs the start of every call (operation label and input), then the collected
/// metadata and either the output or the error.
///
/// Errors are logged and passed through untouched.
pub fn logging<In, Out, Err>(logger: impl Fn(&RequestContext, &str) + Send + Sync + 'static) -> Decorator<In, Out, Err>
where
  In: Debug + Send + 'static,
  Out: Debug + Send + 'static,
  Err: Display + Send + 'static,
{
  let logger: Logger = Arc::new(logger);
  Decorator::new("logging", move |next: Operation<In, Out, Err>| {
    let logger = Arc::clone(&logger);
    Operation::from_boxed(move |ctx: RequestContext, input: In| {
      let next = next.clone();
      let logger = Arc::clone(&logger);

      Box::pin(async move {
        let op_name = ctx.operation().to_string();
        logger(&ctx, &format!("[START] {}\n  input: {:?}", op_name, input));
        let log_ctx = ctx.clone();
        let envelope = next.call(ctx, input).await;

        if !envelope.metadata.is_empty() {
          logger(&log_ctx, "[META] collected metadata:");
          let mut entries: Vec<_> = envelope.metadata.iter().collect();
          entries.sort_by(|a, b| a.0.cmp(b.0));
          for (key, value) in entries {
            logger(&log_ctx, &format!("  - {}: {}", key, value));
          }
        }

        match &envelope.result {
          Ok(data) => logger(&log_ctx, &format!("[END] {} SUCCESS\n  output: {:?}", op_name, data)),
          Err(e) => logger(&log_ctx, &format!("[END] {} FAILED\n  error: {}", op_name, e)),
        }
        envelope
      })
    })
  })
}
