use std::collections::HashMap;
use std::path::PathBuf;

use safeops_workflow::{OutputTarget, StepSpec};
use serde_json::{Map, Value};
use tracing::debug;

use crate::context::RunContext;
use crate::error::ArtifactError;
use crate::table::RecordedOutput;

/// Output arguments of one step, resolved and ready to record.
#[derive(Debug, Clone, Default)]
pub struct AllocatedOutputs {
  arguments: Map<String, Value>,
  recorded: Vec<(String, RecordedOutput)>,
}

impl AllocatedOutputs {
  /// The resolved output arguments, as handed to the step.
  pub fn arguments(&self) -> &Map<String, Value> {
    &self.arguments
  }

  /// Split into the step arguments and the entries for the output table.
  pub fn into_parts(self) -> (Map<String, Value>, Vec<(String, RecordedOutput)>) {
    (self.arguments, self.recorded)
  }
}

/// Resolve a step's declared outputs.
///
/// Each `{workflow.outputs.<key>}` becomes `<output_dir>/<key>.txt`; the
/// directory is created on first use. Within the step a key is allocated once,
/// so two arguments naming the same key share a file. Literal outputs are
/// passed through and still recorded.
pub async fn allocate_outputs(
  ctx: &RunContext,
  step: &StepSpec,
) -> Result<AllocatedOutputs, ArtifactError> {
  let mut allocated = AllocatedOutputs::default();
  let mut paths: HashMap<&str, PathBuf> = HashMap::new();

  for (argument, target) in &step.outputs {
    let recorded = match target {
      OutputTarget::Artifact(key) => {
        let path = match paths.get(key.as_str()).cloned() {
          Some(path) => path,
          None => {
            let path = allocate(ctx, key).await?;
            paths.insert(key.as_str(), path.clone());
            path
          }
        };
        RecordedOutput::Artifact(path)
      }
      OutputTarget::Literal(value) => RecordedOutput::Literal(value.clone()),
    };

    allocated
      .arguments
      .insert(argument.clone(), recorded.to_value());
    allocated.recorded.push((argument.clone(), recorded));
  }

  Ok(allocated)
}

async fn allocate(ctx: &RunContext, key: &str) -> Result<PathBuf, ArtifactError> {
  let dir = ctx.output_dir();
  tokio::fs::create_dir_all(dir)
    .await
    .map_err(|source| ArtifactError::CreateDir {
      path: dir.to_path_buf(),
      source,
    })?;

  let path = dir.join(format!("{}.txt", key));
  debug!(run_id = %ctx.run_id(), key = %key, path = %path.display(), "artifact allocated");
  Ok(path)
}

#[cfg(test)]
mod tests {
  use super::*;
  use safeops_config::StepDef;
  use serde_json::json;

  fn step(outputs: Value) -> StepSpec {
    let def: StepDef = serde_json::from_value(json!({
      "name": "scan",
      "module": "scan",
      "function": "scan_documentation",
      "inputs": {},
      "outputs": outputs,
    }))
    .unwrap();
    StepSpec::lock(def).unwrap()
  }

  #[tokio::test]
  async fn test_allocates_under_work_dir() {
    let root = tempfile::tempdir().unwrap();
    let ctx = RunContext::with_run_id("run-1", root.path(), None);

    let allocated = allocate_outputs(&ctx, &step(json!({ "output_file": "{workflow.outputs.docs}" })))
      .await
      .unwrap();

    let expected = ctx.work_dir().join("docs.txt");
    assert!(ctx.work_dir().is_dir());
    assert_eq!(
      allocated.arguments()["output_file"],
      json!(expected.to_string_lossy())
    );

    let (_, recorded) = allocated.into_parts();
    assert_eq!(
      recorded,
      vec![("output_file".to_string(), RecordedOutput::Artifact(expected))]
    );
  }

  #[tokio::test]
  async fn test_allocates_under_log_dir_when_enabled() {
    let root = tempfile::tempdir().unwrap();
    let logs = root.path().join("logs");
    let ctx = RunContext::with_run_id("run-1", root.path(), Some(logs.clone()));

    let allocated = allocate_outputs(&ctx, &step(json!({ "o": "{workflow.outputs.o}" })))
      .await
      .unwrap();

    assert_eq!(allocated.arguments()["o"], json!(logs.join("o.txt").to_string_lossy()));
    assert!(logs.is_dir());
    assert!(!ctx.work_dir().exists());
  }

  #[tokio::test]
  async fn test_same_key_shares_a_path() {
    let root = tempfile::tempdir().unwrap();
    let ctx = RunContext::with_run_id("run-1", root.path(), None);

    let allocated = allocate_outputs(
      &ctx,
      &step(json!({ "a": "{workflow.outputs.shared}", "b": "{workflow.outputs.shared}" })),
    )
    .await
    .unwrap();

    assert_eq!(allocated.arguments()["a"], allocated.arguments()["b"]);
  }

  #[tokio::test]
  async fn test_literals_pass_through_without_allocation() {
    let root = tempfile::tempdir().unwrap();
    let ctx = RunContext::with_run_id("run-1", root.path(), None);

    let allocated = allocate_outputs(&ctx, &step(json!({ "format": "markdown", "limit": 5 })))
      .await
      .unwrap();

    assert_eq!(allocated.arguments()["format"], "markdown");
    assert_eq!(allocated.arguments()["limit"], 5);
    assert!(!ctx.work_dir().exists());

    let (_, recorded) = allocated.into_parts();
    assert_eq!(recorded[1].1, RecordedOutput::Literal(json!(5)));
  }
}
