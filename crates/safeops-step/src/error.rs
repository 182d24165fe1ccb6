use thiserror::Error;

/// Errors raised by a step body.
#[derive(Debug, Error)]
pub enum StepError {
  /// A required argument was not supplied.
  #[error("missing required argument: {name}")]
  MissingArgument { name: String },

  /// An argument had the wrong type or an unusable value.
  #[error("invalid argument '{name}': {message}")]
  InvalidArgument { name: String, message: String },

  /// The step failed for its own reasons.
  #[error("{message}")]
  Failed { message: String },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl StepError {
  /// Create a step failure with a message.
  pub fn failed(message: impl Into<String>) -> Self {
    Self::Failed {
      message: message.into(),
    }
  }

  pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
    Self::InvalidArgument {
      name: name.into(),
      message: message.into(),
    }
  }
}

/// Errors raised while binding or calling a step.
#[derive(Debug, Error)]
pub enum InvokeError {
  /// No step is registered under `module.function`.
  #[error("step '{module}.{function}' not found")]
  StepNotFound { module: String, function: String },

  /// An input and an output declare the same argument name.
  #[error("argument '{name}' is declared as both input and output of step '{step_name}'")]
  ConflictingArgument { step_name: String, name: String },

  /// The step body returned an error.
  #[error("{source}")]
  StepExecutionFailed {
    step_name: String,
    #[source]
    source: StepError,
  },
}
