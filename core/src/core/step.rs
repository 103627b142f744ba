// corchain/src/core/step.rs

//! Defines the `Step` contract and `FnStep`, a step assembled from closures.

use crate::core::context::{BoxFuture, ChainContext, Hook};
use crate::core::context_data::ContextData;
use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// One unit of chain-of-responsibility processing.
///
/// `handle` receives the working context handle and returns the handle the chain
/// continues with (usually the same one). A step with a rollback action reports it
/// through `has_compensation`; the executor queues such steps *before* their
/// `handle` runs, so a step that faults is compensated along with the ones before it.
#[async_trait]
pub trait Step<TData, Err>: Send + Sync
where
  TData: ChainContext,
  Err: Send + 'static,
{
  /// Name used in tracing spans and in `StepTiming`.
  fn name(&self) -> &str {
    std::any::type_name::<Self>()
  }

  async fn handle(&self, ctx: ContextData<TData>, cancel: CancellationToken) -> Result<ContextData<TData>, Err>;

  fn has_compensation(&self) -> bool {
    false
  }

  /// Rollback action, invoked only when a fault occurs later in the same call.
  async fn compensate(&self, ctx: ContextData<TData>, cancel: CancellationToken) -> Result<(), Err> {
    let _ = (ctx, cancel);
    Ok(())
  }
}

type StepHandler<TData, Err> = Box<
  dyn Fn(ContextData<TData>, CancellationToken) -> BoxFuture<'static, Result<ContextData<TData>, Err>> + Send + Sync,
>;

/// A `Step` built from an async closure and an optional compensating closure.
pub struct FnStep<TData, Err>
where
  TData: ChainContext,
  Err: Send + 'static,
{
  name: String,
  handler: StepHandler<TData, Err>,
  compensation: Option<Hook<TData, Err>>,
}

impl<TData, Err> FnStep<TData, Err>
where
  TData: ChainContext,
  Err: Send + 'static,
{
  pub fn new<F, Fut>(name: impl Into<String>, handler_fn: F) -> Self
  where
    F: Fn(ContextData<TData>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ContextData<TData>, Err>> + Send + 'static,
  {
    let handler: StepHandler<TData, Err> = Box::new(
      move |ctx: ContextData<TData>, cancel: CancellationToken| -> BoxFuture<'static, Result<ContextData<TData>, Err>> {
        Box::pin(handler_fn(ctx, cancel))
      },
    );
    Self {
      name: name.into(),
      handler,
      compensation: None,
    }
  }

  /// Attaches a compensating action. A later call replaces an earlier one.
  pub fn with_compensation<F, Fut>(mut self, compensate_fn: F) -> Self
  where
    F: Fn(ContextData<TData>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Err>> + Send + 'static,
  {
    let compensation: Hook<TData, Err> = Box::new(
      move |ctx: ContextData<TData>, cancel: CancellationToken| -> BoxFuture<'static, Result<(), Err>> {
        Box::pin(compensate_fn(ctx, cancel))
      },
    );
    self.compensation = Some(compensation);
    self
  }
}

#[async_trait]
impl<TData, Err> Step<TData, Err> for FnStep<TData, Err>
where
  TData: ChainContext,
  Err: Send + 'static,
{
  fn name(&self) -> &str {
    &self.name
  }

  async fn handle(&self, ctx: ContextData<TData>, cancel: CancellationToken) -> Result<ContextData<TData>, Err> {
    (self.handler)(ctx, cancel).await
  }

  fn has_compensation(&self) -> bool {
    self.compensation.is_some()
  }

  async fn compensate(&self, ctx: ContextData<TData>, cancel: CancellationToken) -> Result<(), Err> {
    match &self.compensation {
      Some(compensate_fn) => compensate_fn(ctx, cancel).await,
      None => Ok(()),
    }
  }
}

impl<TData, Err> std::fmt::Debug for FnStep<TData, Err>
where
  TData: ChainContext,
  Err: Send + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FnStep")
      .field("name", &self.name)
      .field("compensation_present", &self.compensation.is_some())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::ChainError;

  #[derive(Debug, Default)]
  struct Ledger {
    aborted: bool,
    entries: Vec<&'static str>,
  }

  impl ChainContext for Ledger {
    fn is_aborted(&self) -> bool {
      self.aborted
    }

    fn set_aborted(&mut self, aborted: bool) {
      self.aborted = aborted;
    }
  }

  struct Plain;

  #[async_trait]
  impl Step<Ledger, ChainError> for Plain {
    async fn handle(&self, ctx: ContextData<Ledger>, _cancel: CancellationToken) -> Result<ContextData<Ledger>, ChainError> {
      ctx.write().entries.push("plain");
      Ok(ctx)
    }
  }

  #[tokio::test]
  async fn trait_defaults_have_no_compensation() {
    let step = Plain;
    assert!(!step.has_compensation());
    assert!(step.name().ends_with("Plain"));

    let ctx = ContextData::new(Ledger::default());
    step.compensate(ctx.clone(), CancellationToken::new()).await.unwrap();
    assert!(ctx.read().entries.is_empty());
  }

  #[tokio::test]
  async fn fn_step_runs_handler_and_compensation() {
    let step = FnStep::<Ledger, ChainError>::new("reserve", |ctx: ContextData<Ledger>, _cancel| async move {
      ctx.write().entries.push("reserved");
      Ok(ctx)
    })
    .with_compensation(|ctx: ContextData<Ledger>, _cancel| async move {
      ctx.write().entries.push("released");
      Ok(())
    });

    assert_eq!(step.name(), "reserve");
    assert!(step.has_compensation());

    let ctx = ContextData::new(Ledger::default());
    let returned = step.handle(ctx.clone(), CancellationToken::new()).await.unwrap();
    assert!(returned.ptr_eq(&ctx));
    step.compensate(ctx.clone(), CancellationToken::new()).await.unwrap();
    assert_eq!(ctx.read().entries, vec!["reserved", "released"]);
  }
}
