// src/lib.rs

//! corchain: an ASYNC chain-of-responsibility executor for Rust.
//!
//! A `ChainExecutor` owns an ordered list of steps that transform a shared context
//! one after another, plus optional lifecycle hooks:
//!  - `pre_run` / `post_run` around the whole chain.
//!  - `after_each_step`, receiving each step's wall-clock timing.
//!  - Compensating actions declared by steps, drained in order when a fault occurs.
//!  - `on_exception`, which may suppress a fault or let the original one through.
//!  - `finally`, invoked exactly once per call on every path.
//!  - Early exit through the context's abort flag, and per-call step selection by index.

pub mod core;
pub mod error;
pub mod pipeline;

// --- Re-exports for the Public API ---

pub use crate::core::context::{BoxFuture, ChainContext};
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{ChainOutcome, ChainRun, FaultAction, StepTiming};
pub use crate::core::step::{FnStep, Step};

pub use crate::pipeline::definition::ChainExecutor;

pub use crate::error::{ChainError, ChainResult};

// Steps and callers need the same cancellation token type the executor threads through.
pub use tokio_util::sync::CancellationToken;

/*
    Core Workflow:
    1. Define a context struct `MyCtx` and implement `ChainContext` for it (the abort flag).
    2. Implement `Step<MyCtx, MyErr>` for your steps, or build them with `FnStep::new(..)`
       and `.with_compensation(..)`.
    3. Assemble a `ChainExecutor::<MyCtx, MyErr>::named("..")` with `.add_steps(..)`
       and any of the hook setters.
    4. Wrap the initial state in `ContextData::new(..)` and call
       `executor.execute(ctx).await`, or `executor.execute_with(ctx, token, &[0, 2]).await`
       to pass a cancellation token and run only some steps.
*/
