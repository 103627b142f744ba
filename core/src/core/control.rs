// corchain/src/core/control.rs

//! Defines the signals exchanged between the executor and its hooks, and the
//! outcome of a chain execution.

use crate::core::context_data::ContextData;
use std::time::Duration;

/// Decision returned by the on-exception hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultAction {
  /// Hand the original fault back to the caller, unchanged.
  Rethrow,
  /// Absorb the fault; the call returns the current context as if it had succeeded.
  Suppress,
}

/// How a chain execution that returned a context came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOutcome {
  /// Every selected step ran.
  Completed,
  /// A step raised the context's abort flag and the remaining steps were not issued.
  Aborted,
  /// A fault occurred and the on-exception hook suppressed it.
  Recovered,
}

/// Result of `ChainExecutor::run`: the final context together with its outcome.
#[derive(Debug)]
pub struct ChainRun<TData: Send + Sync + 'static> {
  pub context: ContextData<TData>,
  pub outcome: ChainOutcome,
}

impl<TData: Send + Sync + 'static> ChainRun<TData> {
  pub fn into_context(self) -> ContextData<TData> {
    self.context
  }
}

/// Timing of one successfully completed step, passed to the per-step-after hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTiming {
  /// Registration index of the step.
  pub index: usize,
  pub name: String,
  /// Wall-clock time spent in the step's handle, measured on a monotonic clock.
  pub elapsed: Duration,
}
