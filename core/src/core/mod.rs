pub mod context;
pub mod context_data;
pub mod control;
pub mod step;

// Re-export key types for easier access from other corchain modules (and lib.rs)
pub use context::{BoxFuture, ChainContext};
pub use context_data::ContextData;
pub use control::{ChainOutcome, ChainRun, FaultAction, StepTiming};
pub use step::{FnStep, Step};
