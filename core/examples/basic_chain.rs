// corchain/examples/basic_chain.rs

use corchain::{CancellationToken, ChainContext, ChainError, ChainExecutor, ChainOutcome, ContextData, FnStep, StepTiming};
use tracing::info;

// 1. Define the context for the chain. The abort flag is the only mandatory part.
#[derive(Clone, Debug, Default)]
struct BasicContext {
  aborted: bool,
  message_log: Vec<String>,
  counter: i32,
}

impl ChainContext for BasicContext {
  fn is_aborted(&self) -> bool {
    self.aborted
  }

  fn set_aborted(&mut self, aborted: bool) {
    self.aborted = aborted;
  }
}

#[tokio::main]
async fn main() -> Result<(), ChainError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Chain Example ---");

  // 2. Assemble the executor: three steps plus a timing hook and a finally hook.
  let executor = ChainExecutor::<BasicContext>::named("basic")
    .add_step(FnStep::new(
      "alpha",
      |ctx: ContextData<BasicContext>, _cancel: CancellationToken| async move {
        {
          let mut data = ctx.write();
          data.counter += 1;
          let msg = format!("Alpha executed: counter = {}", data.counter);
          data.message_log.push(msg);
        }
        Ok::<_, ChainError>(ctx)
      },
    ))
    .add_step(FnStep::new(
      "beta",
      |ctx: ContextData<BasicContext>, _cancel: CancellationToken| async move {
        {
          let mut data = ctx.write();
          data.counter *= 2;
          let msg = format!("Beta executed: counter = {}", data.counter);
          data.message_log.push(msg);
        }
        Ok::<_, ChainError>(ctx)
      },
    ))
    .add_step(FnStep::new(
      "gamma",
      |ctx: ContextData<BasicContext>, _cancel: CancellationToken| async move {
        {
          let mut data = ctx.write();
          data.counter -= 1;
          let msg = format!("Gamma executed: counter = {}", data.counter);
          data.message_log.push(msg);
        }
        Ok::<_, ChainError>(ctx)
      },
    ))
    .after_each_step(
      |_ctx: ContextData<BasicContext>, timing: StepTiming, _cancel: CancellationToken| async move {
        info!(step = %timing.name, elapsed = ?timing.elapsed, "step finished");
        Ok::<(), ChainError>(())
      },
    )
    .finally(|ctx: ContextData<BasicContext>, _cancel: CancellationToken| async move {
      info!(counter = ctx.read().counter, "chain finished");
      Ok::<(), ChainError>(())
    });

  // 3. Run every step. Expected: (5+1)*2 - 1 = 11
  let ctx = ContextData::new(BasicContext {
    counter: 5,
    ..Default::default()
  });
  let run = executor.run(ctx, CancellationToken::new(), &[]).await?;
  assert_eq!(run.outcome, ChainOutcome::Completed);
  {
    let data = run.context.read();
    for log_entry in &data.message_log {
      info!("- {}", log_entry);
    }
    assert_eq!(data.counter, 11);
  }

  // 4. Run only alpha and gamma. Expected: 5 + 1 - 1 = 5
  let ctx = ContextData::new(BasicContext {
    counter: 5,
    ..Default::default()
  });
  let ctx = executor.execute_with(ctx, CancellationToken::new(), &[0, 2]).await?;
  assert_eq!(ctx.read().counter, 5);
  assert_eq!(ctx.read().message_log.len(), 2);

  Ok(())
}
