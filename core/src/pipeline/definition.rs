// corchain/src/pipeline/definition.rs

//! Contains the `ChainExecutor<TData, Err>` struct definition and the methods
//! for registering and inspecting its steps.

use crate::core::context::{ChainContext, ExceptionHook, Hook, StepHook};
use crate::core::step::Step;
use crate::error::ChainError;
use std::sync::Arc;

/// An ordered chain of steps plus its lifecycle hooks.
///
/// `TData` is the caller's context type and must implement `ChainContext`.
/// `Err` is the error type shared by steps and hooks; the executor never inspects
/// it and returns faults to the caller as the very same value.
///
/// The executor only holds configuration. Every call to `run` keeps its own
/// compensation queue, so one executor can serve concurrent calls as long as each
/// call gets its own context.
pub struct ChainExecutor<TData, Err = ChainError>
where
  TData: ChainContext,
  Err: std::error::Error + Send + Sync + 'static,
{
  pub(crate) name: String,

  /// Steps in registration order.
  pub(crate) steps: Vec<Arc<dyn Step<TData, Err>>>,

  pub(crate) pre_run: Option<Hook<TData, Err>>,
  pub(crate) post_run: Option<Hook<TData, Err>>,
  pub(crate) after_each_step: Option<StepHook<TData, Err>>,
  pub(crate) finally: Option<Hook<TData, Err>>,
  pub(crate) on_exception: Option<ExceptionHook<TData, Err>>,
}

impl<TData, Err> ChainExecutor<TData, Err>
where
  TData: ChainContext,
  Err: std::error::Error + Send + Sync + 'static,
{
  /// Creates an empty executor named `"chain"`.
  pub fn new() -> Self {
    Self::named("chain")
  }

  /// Creates an empty executor whose name is recorded on its tracing spans.
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      steps: Vec::new(),
      pre_run: None,
      post_run: None,
      after_each_step: None,
      finally: None,
      on_exception: None,
    }
  }

  /// Appends an ordered batch of steps after the ones already registered.
  pub fn add_steps<I>(mut self, steps: I) -> Self
  where
    I: IntoIterator<Item = Arc<dyn Step<TData, Err>>>,
  {
    self.steps.extend(steps);
    self
  }

  /// Appends a single step.
  pub fn add_step<S>(mut self, step: S) -> Self
  where
    S: Step<TData, Err> + 'static,
  {
    self.steps.push(Arc::new(step));
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  /// Names of the registered steps, in registration order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|step| step.name()).collect()
  }
}

impl<TData, Err> Default for ChainExecutor<TData, Err>
where
  TData: ChainContext,
  Err: std::error::Error + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<TData, Err> std::fmt::Debug for ChainExecutor<TData, Err>
where
  TData: ChainContext,
  Err: std::error::Error + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ChainExecutor")
      .field("name", &self.name)
      .field("steps", &self.step_names())
      .field("pre_run_present", &self.pre_run.is_some())
      .field("post_run_present", &self.post_run.is_some())
      .field("after_each_step_present", &self.after_each_step.is_some())
      .field("finally_present", &self.finally.is_some())
      .field("on_exception_present", &self.on_exception.is_some())
      .finish()
  }
}
