use safeops_artifact::ArtifactError;
use safeops_resolver::ResolveError;
use safeops_step::InvokeError;
use safeops_workflow::WorkflowError;
use thiserror::Error;

/// Step name reported when a failure cannot be attributed to a step.
pub const UNKNOWN_STEP: &str = "Unknown";

/// Any failure that halts a pipeline run.
#[derive(Debug, Error)]
pub enum EngineError {
  #[error(transparent)]
  Workflow(#[from] WorkflowError),

  #[error(transparent)]
  Resolve(#[from] ResolveError),

  #[error(transparent)]
  Artifact(#[from] ArtifactError),

  #[error(transparent)]
  Invoke(#[from] InvokeError),
}

/// A halted run, attributed to the step that was executing.
#[derive(Debug, Error)]
#[error("Error during step '{}': {}", .step.as_deref().unwrap_or(UNKNOWN_STEP), .source)]
pub struct RunError {
  /// The failing step, or `None` if the run failed before any step started.
  pub step: Option<String>,
  #[source]
  pub source: EngineError,
}

impl RunError {
  pub fn in_step(step: impl Into<String>, source: impl Into<EngineError>) -> Self {
    Self {
      step: Some(step.into()),
      source: source.into(),
    }
  }

  pub fn before_start(source: impl Into<EngineError>) -> Self {
    Self {
      step: None,
      source: source.into(),
    }
  }

  /// The name reported in the failure message.
  pub fn step_name(&self) -> &str {
    self.step.as_deref().unwrap_or(UNKNOWN_STEP)
  }
}
