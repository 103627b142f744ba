// corchain/src/pipeline/hooks.rs

//! Contains the fluent setters for the executor's five lifecycle hooks.
//!
//! Every slot holds at most one callable; registering a hook of a kind that is
//! already set replaces it. All setters consume and return the executor so that
//! assembly reads as one chain:
//!
//! ```ignore
//! let executor = ChainExecutor::<Order, AppError>::named("checkout")
//!   .add_steps(steps)
//!   .pre_run(|ctx, _cancel| async move { Ok(()) })
//!   .finally(|ctx, _cancel| async move { Ok(()) });
//! ```

use tracing::{event, Level};

use crate::core::context::{BoxFuture, ChainContext, ExceptionHook, Hook, StepHook};
use crate::core::context_data::ContextData;
use crate::core::control::{FaultAction, StepTiming};
use crate::pipeline::definition::ChainExecutor;
use std::future::Future;
use tokio_util::sync::CancellationToken;

fn box_hook<TData, Err, F, Fut>(hook_fn: F) -> Hook<TData, Err>
where
  TData: ChainContext,
  Err: Send + 'static,
  F: Fn(ContextData<TData>, CancellationToken) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<(), Err>> + Send + 'static,
{
  Box::new(
    move |ctx: ContextData<TData>, cancel: CancellationToken| -> BoxFuture<'static, Result<(), Err>> {
      Box::pin(hook_fn(ctx, cancel))
    },
  )
}

impl<TData, Err> ChainExecutor<TData, Err>
where
  TData: ChainContext,
  Err: std::error::Error + Send + Sync + 'static,
{
  /// Registers the hook invoked once before the first step.
  ///
  /// A fault here means no step runs; the fault goes straight to the fault path
  /// (with an empty compensation queue).
  pub fn pre_run<F, Fut>(mut self, hook_fn: F) -> Self
  where
    F: Fn(ContextData<TData>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Err>> + Send + 'static,
  {
    self.pre_run = Some(box_hook(hook_fn));
    event!(Level::TRACE, chain = %self.name, "pre_run hook set.");
    self
  }

  /// Registers the hook invoked once after the step loop when no fault occurred.
  ///
  /// It also runs when the loop ended early because a step raised the abort flag.
  pub fn post_run<F, Fut>(mut self, hook_fn: F) -> Self
  where
    F: Fn(ContextData<TData>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Err>> + Send + 'static,
  {
    self.post_run = Some(box_hook(hook_fn));
    event!(Level::TRACE, chain = %self.name, "post_run hook set.");
    self
  }

  /// Registers the hook invoked after every step whose handle succeeded, with the
  /// step's index, name and elapsed time.
  pub fn after_each_step<F, Fut>(mut self, hook_fn: F) -> Self
  where
    F: Fn(ContextData<TData>, StepTiming, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Err>> + Send + 'static,
  {
    let step_hook: StepHook<TData, Err> = Box::new(
      move |ctx: ContextData<TData>,
            timing: StepTiming,
            cancel: CancellationToken|
            -> BoxFuture<'static, Result<(), Err>> { Box::pin(hook_fn(ctx, timing, cancel)) },
    );
    self.after_each_step = Some(step_hook);
    event!(Level::TRACE, chain = %self.name, "after_each_step hook set.");
    self
  }

  /// Registers the hook invoked exactly once per call, after the outcome is known,
  /// whether the call succeeded, recovered, or is about to return a fault.
  pub fn finally<F, Fut>(mut self, hook_fn: F) -> Self
  where
    F: Fn(ContextData<TData>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Err>> + Send + 'static,
  {
    self.finally = Some(box_hook(hook_fn));
    event!(Level::TRACE, chain = %self.name, "finally hook set.");
    self
  }

  /// Registers the hook that decides what happens to a fault raised by a step or by
  /// the pre-run, per-step-after or post-run hooks.
  ///
  /// The hook runs after the compensation queue has been drained. Returning
  /// `FaultAction::Suppress` makes the call return the current context; returning
  /// `FaultAction::Rethrow` hands the original fault back to the caller. Because the
  /// fault is borrowed, the returned future must be boxed:
  ///
  /// ```ignore
  /// executor.on_exception(|ctx, err, _cancel| Box::pin(async move {
  ///   tracing::warn!(error = %err, "checkout failed");
  ///   FaultAction::Suppress
  /// }))
  /// ```
  pub fn on_exception<F>(mut self, hook_fn: F) -> Self
  where
    F: for<'a> Fn(ContextData<TData>, &'a Err, CancellationToken) -> BoxFuture<'a, FaultAction>
      + Send
      + Sync
      + 'static,
  {
    let exception_hook: ExceptionHook<TData, Err> = Box::new(hook_fn);
    self.on_exception = Some(exception_hook);
    event!(Level::TRACE, chain = %self.name, "on_exception hook set.");
    self
  }
}
