//! Step input resolution.
//!
//! Turns each parsed [`Reference`] into the concrete value handed to a step:
//!
//! - `{workflow.inputs.<key>}` → the caller-supplied run input
//! - `{workflow.log_dir}` → the log directory as a string, or `null`
//! - `{workflow.all_steps}` → every step name, in declaration order
//! - `{steps.<step>.outputs.<key>}` → a recorded output of an earlier step
//!
//! Step outputs are consumed in one of two ways, chosen by the name of the
//! consuming argument. An argument ending in `_path` or `_file` receives the
//! artifact path; any other argument receives the artifact's text, trimmed.
//! This lets a step take a large report by path and a small scalar inline.

use safeops_artifact::{RecordedOutput, RunContext};
use safeops_workflow::{Reference, StepSpec, Workflow};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ResolveError;

/// Caller-supplied run inputs, e.g. `{"path": "/repo"}`.
pub type RunInputs = Map<String, Value>;

const PATH_SUFFIXES: [&str; 2] = ["_path", "_file"];

/// Whether an input argument takes a step output as a path rather than as
/// the artifact's contents.
pub fn wants_path(argument: &str) -> bool {
  PATH_SUFFIXES
    .iter()
    .any(|suffix| argument.ends_with(suffix))
}

/// Resolves step inputs against the current run.
///
/// Borrows the run state read-only; the only side effect is reading
/// artifacts for content-mode step outputs.
pub struct InputResolver<'a> {
  workflow: &'a Workflow,
  inputs: &'a RunInputs,
  context: &'a RunContext,
}

impl<'a> InputResolver<'a> {
  pub fn new(workflow: &'a Workflow, inputs: &'a RunInputs, context: &'a RunContext) -> Self {
    Self {
      workflow,
      inputs,
      context,
    }
  }

  /// Resolve every input of a step, keeping declaration order.
  pub async fn resolve_step(&self, step: &StepSpec) -> Result<Map<String, Value>, ResolveError> {
    let mut resolved = Map::new();
    for (argument, reference) in &step.inputs {
      let value = self.resolve(argument, reference).await?;
      resolved.insert(argument.clone(), value);
    }
    Ok(resolved)
  }

  /// Resolve a single input value for the argument named `argument`.
  pub async fn resolve(&self, argument: &str, reference: &Reference) -> Result<Value, ResolveError> {
    match reference {
      Reference::Literal(value) => Ok(value.clone()),

      Reference::WorkflowInput(key) => {
        self
          .inputs
          .get(key)
          .cloned()
          .ok_or_else(|| ResolveError::MissingWorkflowInput { key: key.clone() })
      }

      Reference::LogDir => Ok(
        self
          .context
          .log_dir()
          .map(|dir| Value::String(dir.to_string_lossy().into_owned()))
          .unwrap_or(Value::Null),
      ),

      Reference::AllSteps => Ok(Value::Array(
        self
          .workflow
          .steps
          .iter()
          .map(|s| Value::String(s.name.clone()))
          .collect(),
      )),

      Reference::StepOutput { step, key } => {
        let recorded = self
          .context
          .outputs()
          .get(step, key)
          .map_err(|reason| ResolveError::UnresolvedStepOutput {
            step: step.clone(),
            key: key.clone(),
            reason,
          })?;

        if wants_path(argument) {
          Ok(recorded.to_value())
        } else {
          self.read_content(step, key, recorded).await
        }
      }
    }
  }

  async fn read_content(
    &self,
    step: &str,
    key: &str,
    recorded: &RecordedOutput,
  ) -> Result<Value, ResolveError> {
    let Some(path) = recorded.path() else {
      return Ok(recorded.to_value());
    };

    let content =
      tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ResolveError::ArtifactRead {
          step: step.to_string(),
          key: key.to_string(),
          path: path.to_path_buf(),
          source,
        })?;

    debug!(step = %step, key = %key, bytes = content.len(), "artifact content read");
    Ok(Value::String(content.trim().to_string()))
  }
}
