// corchain/src/pipeline/mod.rs

//! Defines the `ChainExecutor<TData, Err>` struct, its assembly, hook registration
//! and execution logic.

pub mod definition;
pub mod execution;
pub mod hooks;

// Re-export the main executor struct
pub use definition::ChainExecutor;
