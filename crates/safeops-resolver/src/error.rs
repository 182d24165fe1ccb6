use std::path::PathBuf;

use safeops_artifact::Missing;
use thiserror::Error;

/// Errors that can occur while resolving step inputs.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// `{workflow.inputs.<key>}` named a key the caller did not supply.
  #[error("missing workflow input '{key}'")]
  MissingWorkflowInput { key: String },

  /// `{steps.<step>.outputs.<key>}` could not be found in the output table.
  #[error("unresolved output '{key}' of step '{step}': {reason}")]
  UnresolvedStepOutput {
    step: String,
    key: String,
    reason: Missing,
  },

  /// The artifact behind a step output could not be read.
  #[error("failed to read output '{key}' of step '{step}' from '{path}': {source}")]
  ArtifactRead {
    step: String,
    key: String,
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
