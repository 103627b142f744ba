// corchain/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// A ready-made error type for chains whose steps do not bring their own.
///
/// `ChainExecutor<TData>` defaults its error parameter to this type. The executor
/// itself never constructs a `ChainError`; it only moves the caller's error values
/// through the fault path untouched.
#[derive(Debug, Error)]
pub enum ChainError {
  #[error("Step '{step_name}' failed. Source: {source}")]
  Step {
    step_name: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Hook '{hook}' failed. Source: {source}")]
  Hook {
    hook: &'static str,
    #[source]
    source: AnyhowError,
  },

  #[error("Compensation for step '{step_name}' failed. Source: {source}")]
  Compensation {
    step_name: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Error in user-provided handler or external operation. Source: {source}")]
  Handler {
    #[source]
    source: AnyhowError,
  },

  #[error("Step '{step_name}' observed cancellation")]
  Cancelled { step_name: String },

  #[error("Internal chain error: {0}")]
  Internal(String),
}

impl ChainError {
  pub fn step(step_name: impl Into<String>, source: impl Into<AnyhowError>) -> Self {
    ChainError::Step {
      step_name: step_name.into(),
      source: source.into(),
    }
  }

  pub fn hook(hook: &'static str, source: impl Into<AnyhowError>) -> Self {
    ChainError::Hook {
      hook,
      source: source.into(),
    }
  }

  pub fn cancelled(step_name: impl Into<String>) -> Self {
    ChainError::Cancelled {
      step_name: step_name.into(),
    }
  }
}

impl From<AnyhowError> for ChainError {
  fn from(err: AnyhowError) -> Self {
    // An anyhow error that already carries a ChainError is unwrapped instead of
    // nesting it as Handler(ChainError(..)).
    match err.downcast::<ChainError>() {
      Ok(chain_err) => chain_err,
      Err(other) => ChainError::Handler { source: other },
    }
  }
}

pub type ChainResult<T, E = ChainError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn anyhow_wrapping_a_chain_error_is_unwrapped() {
    let inner = ChainError::cancelled("reserve");
    let converted = ChainError::from(AnyhowError::new(inner));
    match converted {
      ChainError::Cancelled { step_name } => assert_eq!(step_name, "reserve"),
      other => panic!("Expected ChainError::Cancelled, got {:?}", other),
    }
  }

  #[test]
  fn plain_anyhow_becomes_handler_error() {
    let converted = ChainError::from(anyhow::anyhow!("disk full"));
    assert!(matches!(converted, ChainError::Handler { .. }));
    assert!(converted.to_string().contains("disk full"));
  }

  #[test]
  fn step_error_display_names_the_step() {
    let err = ChainError::step("charge_card", anyhow::anyhow!("declined"));
    assert_eq!(err.to_string(), "Step 'charge_card' failed. Source: declined");
  }
}
