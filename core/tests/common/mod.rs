// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use corchain::{CancellationToken, ChainContext, ChainExecutor, ContextData, FnStep, Step, StepTiming};
use std::sync::Arc;
use tracing::Level;

// --- Common Context Struct ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub aborted: bool,
  pub counter: i32,
  /// Every step, compensation and hook appends to this journal, in call order.
  pub events: Vec<String>,
  pub timings: Vec<StepTiming>,
}

impl ChainContext for TestContext {
  fn is_aborted(&self) -> bool {
    self.aborted
  }

  fn set_aborted(&mut self, aborted: bool) {
    self.aborted = aborted;
  }
}

impl TestContext {
  pub fn record(&mut self, event: impl Into<String>) {
    self.events.push(event.into());
  }
}

pub type TestStep = Arc<dyn Step<TestContext, TestError>>;
pub type TestExecutor = ChainExecutor<TestContext, TestError>;

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Test step failed: {0}")]
  Step(String),

  #[error("Test hook failed: {0}")]
  Hook(String),

  #[error("Test compensation failed: {0}")]
  Compensation(String),

  #[error("Test step observed cancellation")]
  Cancelled,
}

// --- Common Step Creators ---

/// Increments the counter and journals `handle:<name>`.
pub fn recording_step(name: &'static str) -> TestStep {
  Arc::new(FnStep::new(name, move |ctx: ContextData<TestContext>, _cancel: CancellationToken| async move {
    {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.record(format!("handle:{}", name));
    }
    tracing::debug!(target: "test_steps", step = name, "executed");
    Ok::<_, TestError>(ctx)
  }))
}

/// Like `recording_step`, plus a compensation journaling `compensate:<name>`.
pub fn compensating_step(name: &'static str) -> TestStep {
  Arc::new(
    FnStep::new(name, move |ctx: ContextData<TestContext>, _cancel: CancellationToken| async move {
      {
        let mut guard = ctx.write();
        guard.counter += 1;
        guard.record(format!("handle:{}", name));
      }
      Ok::<_, TestError>(ctx)
    })
    .with_compensation(move |ctx: ContextData<TestContext>, _cancel: CancellationToken| async move {
      {
        let mut guard = ctx.write();
        guard.counter -= 1;
        guard.record(format!("compensate:{}", name));
      }
      Ok::<(), TestError>(())
    }),
  )
}

/// Journals `handle:<name>` and then fails with `TestError::Step(message)`.
pub fn failing_step(name: &'static str, message: &'static str) -> TestStep {
  Arc::new(FnStep::new(name, move |ctx: ContextData<TestContext>, _cancel: CancellationToken| async move {
    ctx.write().record(format!("handle:{}", name));
    tracing::warn!(target: "test_steps", step = name, "failing with: '{}'", message);
    Err::<ContextData<TestContext>, TestError>(TestError::Step(message.to_string()))
  }))
}

/// A failing step that also declares a compensation.
pub fn failing_compensating_step(name: &'static str, message: &'static str) -> TestStep {
  Arc::new(
    FnStep::new(name, move |ctx: ContextData<TestContext>, _cancel: CancellationToken| async move {
      ctx.write().record(format!("handle:{}", name));
      Err::<ContextData<TestContext>, TestError>(TestError::Step(message.to_string()))
    })
    .with_compensation(move |ctx: ContextData<TestContext>, _cancel: CancellationToken| async move {
      ctx.write().record(format!("compensate:{}", name));
      Ok::<(), TestError>(())
    }),
  )
}

/// A step whose compensation itself fails.
pub fn step_with_failing_compensation(name: &'static str) -> TestStep {
  Arc::new(
    FnStep::new(name, move |ctx: ContextData<TestContext>, _cancel: CancellationToken| async move {
      ctx.write().record(format!("handle:{}", name));
      Ok::<_, TestError>(ctx)
    })
    .with_compensation(move |ctx: ContextData<TestContext>, _cancel: CancellationToken| async move {
      ctx.write().record(format!("compensate:{}", name));
      Err::<(), TestError>(TestError::Compensation(name.to_string()))
    }),
  )
}

/// Journals `handle:<name>` and raises the abort flag.
pub fn aborting_step(name: &'static str) -> TestStep {
  Arc::new(FnStep::new(name, move |ctx: ContextData<TestContext>, _cancel: CancellationToken| async move {
    ctx.write().record(format!("handle:{}", name));
    ctx.abort();
    Ok::<_, TestError>(ctx)
  }))
}

/// Registers pre_run, post_run, after_each_step and finally hooks that journal
/// `pre_run`, `post_run`, `after:<step name>` and `finally`.
pub fn with_recording_hooks(executor: TestExecutor) -> TestExecutor {
  executor
    .pre_run(|ctx: ContextData<TestContext>, _cancel: CancellationToken| async move {
      ctx.write().record("pre_run");
      Ok::<(), TestError>(())
    })
    .post_run(|ctx: ContextData<TestContext>, _cancel: CancellationToken| async move {
      ctx.write().record("post_run");
      Ok::<(), TestError>(())
    })
    .after_each_step(
      |ctx: ContextData<TestContext>, timing: StepTiming, _cancel: CancellationToken| async move {
        {
          let mut guard = ctx.write();
          guard.record(format!("after:{}", timing.name));
          guard.timings.push(timing);
        }
        Ok::<(), TestError>(())
      },
    )
    .finally(|ctx: ContextData<TestContext>, _cancel: CancellationToken| async move {
      ctx.write().record("finally");
      Ok::<(), TestError>(())
    })
}

pub fn events_of(ctx: &ContextData<TestContext>) -> Vec<String> {
  ctx.read().events.clone()
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
