use std::path::PathBuf;

use thiserror::Error;

use crate::reference::ReferenceError;

/// Errors raised while loading a workflow. All of them mean the definition is
/// malformed and nothing can run.
#[derive(Debug, Error)]
pub enum WorkflowError {
  /// The document is not a workflow: invalid JSON, a required field is
  /// missing or a field has the wrong shape.
  #[error("malformed workflow: {message}")]
  Malformed { message: String },

  /// A step argument looks like a reference but does not follow any of the
  /// reference grammars.
  #[error("malformed workflow: step '{step}', argument '{argument}': {source}")]
  InvalidReference {
    step: String,
    argument: String,
    #[source]
    source: ReferenceError,
  },

  /// The workflow file could not be read.
  #[error("malformed workflow: failed to read '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl WorkflowError {
  pub fn malformed(message: impl Into<String>) -> Self {
    Self::Malformed {
      message: message.into(),
    }
  }
}
