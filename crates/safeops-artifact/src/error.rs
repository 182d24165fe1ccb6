use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while placing or recording artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
  /// The output directory could not be created.
  #[error("failed to create output directory '{path}': {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A step tried to record its outputs twice.
  #[error("outputs for step '{step}' are already recorded")]
  AlreadyRecorded { step: String },

  /// The ephemeral run directory could not be removed.
  #[error("failed to remove run directory '{path}': {source}")]
  Cleanup {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
