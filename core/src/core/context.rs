// corchain/src/core/context.rs

//! Defines the `ChainContext` contract every context type must satisfy, and the
//! boxed callable types the executor stores for its lifecycle hooks.

use crate::core::context_data::ContextData;
use crate::core::control::{FaultAction, StepTiming};
use std::future::Future;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// Capability every chain context must provide: an abort flag.
///
/// A step that wants the chain to end early (without faulting) raises the flag;
/// the executor checks it before issuing each step. All other fields belong to the
/// implementing type.
pub trait ChainContext: Send + Sync + 'static {
  fn is_aborted(&self) -> bool;

  fn set_aborted(&mut self, aborted: bool);
}

/// An owned, `Send` future borrowing at most for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Type alias for a lifecycle hook (pre-run, post-run and finally).
///
/// A hook receives a clone of the working `ContextData<TData>` handle and the
/// call's cancellation token, and resolves to `Result<(), Err>`.
pub type Hook<TData, Err> =
  Box<dyn Fn(ContextData<TData>, CancellationToken) -> BoxFuture<'static, Result<(), Err>> + Send + Sync>;

/// Type alias for the per-step-after hook, which also receives the step's timing.
pub type StepHook<TData, Err> = Box<
  dyn Fn(ContextData<TData>, StepTiming, CancellationToken) -> BoxFuture<'static, Result<(), Err>> + Send + Sync,
>;

/// Type alias for the on-exception hook.
///
/// It borrows the fault for as long as its future runs and decides whether the
/// executor suppresses it or hands it back to the caller. It has no error channel
/// of its own.
pub type ExceptionHook<TData, Err> = Box<
  dyn for<'a> Fn(ContextData<TData>, &'a Err, CancellationToken) -> BoxFuture<'a, FaultAction> + Send + Sync,
>;
