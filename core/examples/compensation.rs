// corchain/examples/compensation.rs

use corchain::{CancellationToken, ChainContext, ChainExecutor, ContextData, FaultAction, FnStep};
use tracing::{error, info};

// 1. A custom application error type
#[derive(Debug, thiserror::Error)]
enum CheckoutError {
  #[error("Payment declined: {0}")]
  PaymentDeclined(String),
}

// 2. Context for a checkout chain
#[derive(Clone, Debug, Default)]
struct CheckoutContext {
  aborted: bool,
  stock_reserved: bool,
  order_created: bool,
  card_limit: u32,
  total: u32,
}

impl ChainContext for CheckoutContext {
  fn is_aborted(&self) -> bool {
    self.aborted
  }

  fn set_aborted(&mut self, aborted: bool) {
    self.aborted = aborted;
  }
}

fn checkout_chain() -> ChainExecutor<CheckoutContext, CheckoutError> {
  ChainExecutor::<CheckoutContext, CheckoutError>::named("checkout")
    .add_step(
      FnStep::new(
        "reserve_stock",
        |ctx: ContextData<CheckoutContext>, _cancel: CancellationToken| async move {
          info!("Reserving stock");
          ctx.write().stock_reserved = true;
          Ok::<_, CheckoutError>(ctx)
        },
      )
      .with_compensation(|ctx: ContextData<CheckoutContext>, _cancel: CancellationToken| async move {
        info!("Releasing reserved stock");
        ctx.write().stock_reserved = false;
        Ok::<(), CheckoutError>(())
      }),
    )
    .add_step(FnStep::new(
      "create_order",
      |ctx: ContextData<CheckoutContext>, _cancel: CancellationToken| async move {
        info!("Creating order");
        ctx.write().order_created = true;
        Ok::<_, CheckoutError>(ctx)
      },
    ))
    .add_step(FnStep::new(
      "charge_card",
      |ctx: ContextData<CheckoutContext>, _cancel: CancellationToken| async move {
        let (total, limit) = {
          let data = ctx.read();
          (data.total, data.card_limit)
        };
        if total > limit {
          return Err(CheckoutError::PaymentDeclined(format!("{} exceeds limit {}", total, limit)));
        }
        info!(total, "Card charged");
        Ok(ctx)
      },
    ))
    .on_exception(|_ctx: ContextData<CheckoutContext>, err: &CheckoutError, _cancel: CancellationToken| {
      Box::pin(async move {
        error!(error = %err, "Checkout failed; stock has been released");
        FaultAction::Rethrow
      })
    })
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Compensation Example ---");

  let chain = checkout_chain();

  info!("\nScenario 1: payment succeeds");
  let ctx = ContextData::new(CheckoutContext {
    card_limit: 100,
    total: 40,
    ..Default::default()
  });
  let ctx = chain.execute(ctx).await.expect("checkout should succeed");
  assert!(ctx.read().stock_reserved);

  info!("\nScenario 2: payment declined, stock reservation is compensated");
  let ctx = ContextData::new(CheckoutContext {
    card_limit: 100,
    total: 400,
    ..Default::default()
  });
  match chain.execute(ctx.clone()).await {
    Ok(_) => error!("Checkout unexpectedly succeeded"),
    Err(e) => {
      info!("Checkout failed as expected: {}", e);
      assert!(matches!(e, CheckoutError::PaymentDeclined(_)));
    }
  }
  let data = ctx.read();
  assert!(!data.stock_reserved);
  // create_order has no compensation, so its effect stays.
  assert!(data.order_created);
}
