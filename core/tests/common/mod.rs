// tests/common/mod.rs
#![allow(dead_code)]

use orderdesk_flow::{ContextData, FlowError, Handler, PipelineControl};
use once_cell::sync::Lazy;
use tracing::Level;

/// Context used by most engine tests: a small reservation ledger.
#[derive(Clone, Debug, Default)]
pub struct LedgerContext {
  pub reserved: i32,
  pub journal: String,
  pub steps_executed: Vec<String>,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  /// Engine errors, kept as their Debug text so the enum stays comparable.
  #[error("flow error: {0}")]
  Flow(String),

  #[error("handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(fe: FlowError) -> Self {
    TestError::Flow(format!("{:?}", fe))
  }
}

/// Records the step, reserves one unit and appends `note` to the journal.
/// Returns `Stop` when the context asks to stop at `step_name`.
pub fn reserve_handler(step_name: &'static str, note: &'static str) -> Handler<LedgerContext, TestError> {
  Box::new(move |ctx: ContextData<LedgerContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.reserved += 1;
      guard.journal.push_str(note);
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(step = step_name, reserved = guard.reserved, "reserve handler ran");
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn failing_handler(step_name: &'static str, message: &'static str) -> Handler<LedgerContext, TestError> {
  Box::new(move |ctx: ContextData<LedgerContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Handler(message.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
