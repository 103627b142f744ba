// corchain/src/pipeline/execution.rs

//! Contains `ChainExecutor::run()` and its convenience wrappers, responsible for
//! driving the steps, the lifecycle hooks, compensation and fault interception.

use crate::core::context::ChainContext;
use crate::core::context_data::ContextData;
use crate::core::control::{ChainOutcome, ChainRun, FaultAction, StepTiming};
use crate::core::step::Step;
use crate::pipeline::definition::ChainExecutor;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> ChainExecutor<TData, Err>
where
  TData: ChainContext,
  Err: std::error::Error + Send + Sync + 'static,
{
  /// Runs every step with a token that is never cancelled.
  pub async fn execute(&self, ctx: ContextData<TData>) -> Result<ContextData<TData>, Err> {
    self.execute_with(ctx, CancellationToken::new(), &[]).await
  }

  /// Runs the steps whose registration index appears in `steps` (all of them when
  /// `steps` is empty) and returns the final context.
  pub async fn execute_with(
    &self,
    ctx: ContextData<TData>,
    cancel: CancellationToken,
    steps: &[usize],
  ) -> Result<ContextData<TData>, Err> {
    self.run(ctx, cancel, steps).await.map(ChainRun::into_context)
  }

  /// Executes the chain against `ctx`.
  ///
  /// Order of events for one call:
  /// 1. `pre_run` hook.
  /// 2. For each selected step, in registration order: stop if the abort flag is
  ///    raised; queue the step's compensation if it has one; time its `handle`;
  ///    call `after_each_step` with the timing.
  /// 3. `post_run` hook.
  ///
  /// A fault in 1-3 drains the compensation queue in queue order, then goes to the
  /// `on_exception` hook, which either suppresses it (`Ok` with
  /// `ChainOutcome::Recovered`) or lets the original `Err` value through. The
  /// `finally` hook runs last on every path.
  ///
  /// Index values in `steps` that name no registered step are ignored. The
  /// cancellation token is handed to every step and hook; the executor itself never
  /// checks it.
  #[instrument(
    name = "ChainExecutor::run",
    skip_all,
    fields(
      chain = %self.name,
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
      selected = ?steps,
    ),
    err(Display)
  )]
  pub async fn run(
    &self,
    ctx: ContextData<TData>,
    cancel: CancellationToken,
    steps: &[usize],
  ) -> Result<ChainRun<TData>, Err> {
    event!(Level::DEBUG, "Chain execution starting.");

    let mut working = ctx;
    let mut compensations: Vec<&Arc<dyn Step<TData, Err>>> = Vec::new();

    let settled = match self.drive(&mut working, &cancel, steps, &mut compensations).await {
      Ok(outcome) => Ok(outcome),
      Err(fault) => {
        event!(
          Level::ERROR,
          error = %fault,
          queued_compensations = compensations.len(),
          "Chain faulted."
        );
        self.compensate(&compensations, &working, &cancel).await;
        self.intercept(fault, &working, &cancel).await
      }
    };

    let settled = self.run_finally(settled, &working, &cancel).await;

    settled.map(|outcome| {
      event!(Level::DEBUG, ?outcome, "Chain execution finished.");
      ChainRun {
        context: working,
        outcome,
      }
    })
  }

  /// Pre-run hook, step loop and post-run hook. Returns at the first fault with
  /// `queue` holding every compensation queued so far.
  async fn drive<'s>(
    &'s self,
    working: &mut ContextData<TData>,
    cancel: &CancellationToken,
    selection: &[usize],
    queue: &mut Vec<&'s Arc<dyn Step<TData, Err>>>,
  ) -> Result<ChainOutcome, Err> {
    if let Some(pre_run) = &self.pre_run {
      event!(Level::DEBUG, "Invoking pre_run hook.");
      pre_run(working.clone(), cancel.clone()).await?;
    }

    let mut outcome = ChainOutcome::Completed;

    for (step_idx, step) in self.steps.iter().enumerate() {
      if !selection.is_empty() && !selection.contains(&step_idx) {
        event!(Level::TRACE, step_index = step_idx, "Step not selected.");
        continue;
      }

      if working.is_aborted() {
        event!(
          Level::INFO,
          step_index = step_idx,
          step_name = step.name(),
          "Abort flag raised; no further steps will run."
        );
        outcome = ChainOutcome::Aborted;
        break;
      }

      if step.has_compensation() {
        queue.push(step);
      }

      let step_span = span!(
        Level::INFO,
        "chain_step",
        step_name = step.name(),
        step_index = step_idx
      );

      let started = Instant::now();
      let handled = step
        .handle(working.clone(), cancel.clone())
        .instrument(step_span)
        .await;
      let elapsed = started.elapsed();

      *working = match handled {
        Ok(next) => next,
        Err(e) => {
          event!(Level::ERROR, step_index = step_idx, step_name = step.name(), error = %e, "Step failed.");
          return Err(e);
        }
      };
      event!(Level::TRACE, step_index = step_idx, step_name = step.name(), ?elapsed, "Step finished.");

      if let Some(after_each_step) = &self.after_each_step {
        let timing = StepTiming {
          index: step_idx,
          name: step.name().to_string(),
          elapsed,
        };
        after_each_step(working.clone(), timing, cancel.clone()).await?;
      }
    }

    if let Some(post_run) = &self.post_run {
      event!(Level::DEBUG, "Invoking post_run hook.");
      post_run(working.clone(), cancel.clone()).await?;
    }

    Ok(outcome)
  }

  /// Drains the compensation queue in queue order. A failing compensation is logged
  /// and the remaining ones still run.
  async fn compensate(
    &self,
    queue: &[&Arc<dyn Step<TData, Err>>],
    ctx: &ContextData<TData>,
    cancel: &CancellationToken,
  ) {
    for step in queue {
      event!(Level::DEBUG, step_name = step.name(), "Running compensation.");
      if let Err(e) = step.compensate(ctx.clone(), cancel.clone()).await {
        event!(Level::WARN, step_name = step.name(), error = %e, "Compensation failed.");
      }
    }
  }

  /// Offers `fault` to the on-exception hook. Without a hook the fault propagates.
  async fn intercept(
    &self,
    fault: Err,
    ctx: &ContextData<TData>,
    cancel: &CancellationToken,
  ) -> Result<ChainOutcome, Err> {
    let Some(on_exception) = &self.on_exception else {
      return Err(fault);
    };

    let action = on_exception(ctx.clone(), &fault, cancel.clone()).await;
    match action {
      FaultAction::Suppress => {
        event!(Level::INFO, error = %fault, "Fault suppressed by on_exception hook.");
        Ok(ChainOutcome::Recovered)
      }
      FaultAction::Rethrow => Err(fault),
    }
  }

  /// Runs the finally hook. Its own fault only surfaces when the call had
  /// otherwise succeeded; an already propagating fault takes precedence.
  async fn run_finally(
    &self,
    settled: Result<ChainOutcome, Err>,
    ctx: &ContextData<TData>,
    cancel: &CancellationToken,
  ) -> Result<ChainOutcome, Err> {
    let Some(finally) = &self.finally else {
      return settled;
    };

    event!(Level::DEBUG, "Invoking finally hook.");
    match (finally(ctx.clone(), cancel.clone()).await, settled) {
      (Ok(()), settled) => settled,
      (Err(finally_err), Ok(_)) => {
        event!(Level::ERROR, error = %finally_err, "finally hook failed.");
        Err(finally_err)
      }
      (Err(finally_err), Err(fault)) => {
        event!(
          Level::ERROR,
          error = %finally_err,
          original_error = %fault,
          "finally hook failed while a fault was propagating; keeping the original fault."
        );
        Err(fault)
      }
    }
  }
}
